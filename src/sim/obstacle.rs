//! Obstacle spawning, traversal and dodge scoring
//!
//! Each spawn picks a lane uniformly at random, places the obstacle at the
//! far end of the track and asks the engine to move it past the player.
//! When that traversal finishes, an obstacle nobody touched earns the dodge
//! bonus; the body is removed either way.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Lane;
use crate::consts::{OBSTACLE_Y, PLAYER_Z, TRACK_END_Z, TRACK_START_Z};
use crate::engine::{AnimationId, BodyHandle, Easing, Engine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub lane: Lane,
    pub spawn_time: f64,
    pub body: BodyHandle,
    pub traversal: AnimationId,
    /// Set once by the collision resolver
    pub collided: bool,
    /// Set once the obstacle has affected the score, bonus or penalty
    pub scored: bool,
}

impl Obstacle {
    /// Whether finishing here counts as a dodge
    pub fn earns_bonus(&self, final_pos: Vec3) -> bool {
        !self.collided && !self.scored && final_pos.z > PLAYER_Z
    }
}

/// Result of an obstacle reaching the end of the track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOutcome {
    Dodged(ObstacleId),
    /// Already hit earlier, or never got past the player
    Expired(ObstacleId),
}

#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    travel_duration: f64,
    started: bool,
    rng: Pcg32,
    obstacles: BTreeMap<ObstacleId, Obstacle>,
    next_id: u32,
}

impl ObstacleSpawner {
    pub fn new(seed: u64, travel_duration: f64) -> Self {
        Self {
            travel_duration,
            started: false,
            rng: Pcg32::seed_from_u64(seed),
            obstacles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Returns true only the first time; later calls leave the timer alone
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(&id)
    }

    /// Live obstacles, ordered by id
    pub fn live(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    pub fn by_body(&self, body: BodyHandle) -> Option<ObstacleId> {
        self.obstacles
            .values()
            .find(|o| o.body == body)
            .map(|o| o.id)
    }

    pub fn by_traversal(&self, animation: AnimationId) -> Option<ObstacleId> {
        self.obstacles
            .values()
            .find(|o| o.traversal == animation)
            .map(|o| o.id)
    }

    fn pick_lane(&mut self) -> Lane {
        Lane::ALL[self.rng.random_range(0..Lane::ALL.len())]
    }

    /// Spawn one obstacle and start its traversal
    pub fn spawn<E: Engine>(&mut self, engine: &mut E, now: f64) -> &Obstacle {
        let lane = self.pick_lane();
        let x = lane.offset();
        let body = engine.spawn_obstacle(lane, Vec3::new(x, OBSTACLE_Y, TRACK_START_Z));
        let traversal = engine.animate_move(
            body,
            Vec3::new(x, OBSTACLE_Y, TRACK_END_Z),
            self.travel_duration,
            Easing::Linear,
        );

        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        log::debug!("Spawned obstacle {} in lane {} at t={:.2}", id.0, lane.index(), now);

        self.obstacles.entry(id).or_insert(Obstacle {
            id,
            lane,
            spawn_time: now,
            body,
            traversal,
            collided: false,
            scored: false,
        })
    }

    /// Handle a finished traversal. None if `animation` is not a traversal
    /// of a live obstacle. The obstacle is removed from the engine and from
    /// the live set in every other case.
    pub fn complete_traversal<E: Engine>(&mut self, engine: &mut E, animation: AnimationId) -> Option<TraversalOutcome> {
        let id = self.by_traversal(animation)?;
        let mut obstacle = self.obstacles.remove(&id)?;
        let final_pos = engine
            .position(obstacle.body)
            .unwrap_or(Vec3::new(obstacle.lane.offset(), OBSTACLE_Y, TRACK_END_Z));
        engine.remove_obstacle(obstacle.body);

        if obstacle.earns_bonus(final_pos) {
            obstacle.scored = true;
            Some(TraversalOutcome::Dodged(id))
        } else {
            Some(TraversalOutcome::Expired(id))
        }
    }

    /// Remove every live obstacle (session teardown)
    pub fn clear<E: Engine>(&mut self, engine: &mut E) {
        for obstacle in std::mem::take(&mut self.obstacles).into_values() {
            engine.remove_obstacle(obstacle.body);
        }
    }
}
