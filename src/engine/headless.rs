//! Deterministic in-memory engine
//!
//! Kinematic bodies, eased tweens and box-vs-sphere contact checks, stepped
//! on virtual time. Used by the demo binary and the integration tests in
//! place of a real scene graph.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;

use super::{AnimationId, BodyHandle, Easing, Engine, EngineEvent};
use crate::consts::*;
use crate::player_rest_position;
use crate::sim::Lane;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Player,
    Obstacle(Lane),
}

#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub pos: Vec3,
}

#[derive(Debug, Clone)]
struct Tween {
    body: BodyHandle,
    from: Vec3,
    to: Vec3,
    start: f64,
    duration: f64,
    easing: Easing,
}

impl Tween {
    fn end(&self) -> f64 {
        self.start + self.duration
    }

    fn sample(&self, now: f64) -> Vec3 {
        let t = if self.duration > 0.0 {
            ((now - self.start) / self.duration) as f32
        } else {
            1.0
        };
        self.from.lerp(self.to, self.easing.apply(t))
    }
}

#[derive(Debug, Clone)]
struct Flash {
    start: f64,
    cycles: u32,
    interval: f64,
}

impl Flash {
    fn end(&self) -> f64 {
        self.start + self.cycles as f64 * self.interval * 2.0
    }

    /// Hidden during the first half of every cycle
    fn hidden_at(&self, now: f64) -> bool {
        if now < self.start || now >= self.end() {
            return false;
        }
        let half_cycles = ((now - self.start) / self.interval).floor() as u64;
        half_cycles % 2 == 0
    }
}

#[derive(Debug)]
pub struct HeadlessEngine {
    now: f64,
    player: BodyHandle,
    bodies: BTreeMap<BodyHandle, Body>,
    tweens: BTreeMap<AnimationId, Tween>,
    touching: BTreeSet<BodyHandle>,
    flashes: BTreeMap<BodyHandle, Flash>,
    next_body: u32,
    next_animation: u64,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        let player = BodyHandle(1);
        let mut bodies = BTreeMap::new();
        bodies.insert(
            player,
            Body {
                kind: BodyKind::Player,
                pos: player_rest_position(0),
            },
        );
        Self {
            now: 0.0,
            player,
            bodies,
            tweens: BTreeMap::new(),
            touching: BTreeSet::new(),
            flashes: BTreeMap::new(),
            next_body: 2,
            next_animation: 1,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    /// Live obstacles, ordered by handle
    pub fn obstacles(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies
            .iter()
            .filter(|(_, b)| matches!(b.kind, BodyKind::Obstacle(_)))
            .map(|(h, b)| (*h, b))
    }

    pub fn pending_animations(&self) -> usize {
        self.tweens.len()
    }

    /// Whether a blink currently hides the body
    pub fn is_hidden(&self, body: BodyHandle) -> bool {
        self.flashes
            .get(&body)
            .is_some_and(|f| f.hidden_at(self.now))
    }

    fn start_tween(&mut self, body: BodyHandle, to: Vec3, duration: f64, easing: Easing) -> AnimationId {
        let id = AnimationId(self.next_animation);
        self.next_animation += 1;
        let from = self.bodies.get(&body).map(|b| b.pos).unwrap_or(to);
        self.tweens.insert(
            id,
            Tween {
                body,
                from,
                to,
                start: self.now,
                duration: duration.max(0.0),
                easing,
            },
        );
        id
    }

    /// Advance to `now`: apply tweens, report finished animations in
    /// completion order, then report contacts that began this step.
    pub fn step(&mut self, now: f64) -> Vec<EngineEvent> {
        self.now = now.max(self.now);
        let mut events = Vec::new();

        let mut finished: Vec<(f64, AnimationId)> = Vec::new();
        for (id, tween) in &self.tweens {
            if let Some(body) = self.bodies.get_mut(&tween.body) {
                body.pos = tween.sample(self.now);
            }
            if tween.end() <= self.now {
                finished.push((tween.end(), *id));
            }
        }
        finished.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, id) in finished {
            if let Some(tween) = self.tweens.remove(&id) {
                if let Some(body) = self.bodies.get_mut(&tween.body) {
                    body.pos = tween.to;
                }
            }
            events.push(EngineEvent::AnimationFinished(id));
        }

        self.flashes.retain(|_, f| f.end() > now);

        let Some(player_pos) = self.bodies.get(&self.player).map(|b| b.pos) else {
            return events;
        };
        let mut overlapping = BTreeSet::new();
        for (handle, body) in self.obstacles() {
            if sphere_overlaps_box(player_pos, PLAYER_RADIUS, body.pos) {
                overlapping.insert(handle);
            }
        }
        for handle in overlapping.difference(&self.touching) {
            events.push(EngineEvent::Contact(self.player, *handle));
        }
        self.touching = overlapping;

        events
    }
}

/// Sphere vs obstacle box (closest point test)
fn sphere_overlaps_box(center: Vec3, radius: f32, box_center: Vec3) -> bool {
    let half = Vec3::new(OBSTACLE_HALF_WIDTH, OBSTACLE_HALF_HEIGHT, OBSTACLE_HALF_LENGTH);
    let closest = center.clamp(box_center - half, box_center + half);
    closest.distance_squared(center) < radius * radius
}

impl Engine for HeadlessEngine {
    fn player(&self) -> BodyHandle {
        self.player
    }

    fn spawn_obstacle(&mut self, lane: Lane, start: Vec3) -> BodyHandle {
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            handle,
            Body {
                kind: BodyKind::Obstacle(lane),
                pos: start,
            },
        );
        handle
    }

    fn animate_move(&mut self, body: BodyHandle, target: Vec3, duration: f64, easing: Easing) -> AnimationId {
        self.start_tween(body, target, duration, easing)
    }

    fn animate_jump(&mut self, body: BodyHandle, height: f32, duration: f64, easing: Easing) -> AnimationId {
        let from = self.bodies.get(&body).map(|b| b.pos).unwrap_or(Vec3::ZERO);
        self.start_tween(body, from + Vec3::Y * height, duration, easing)
    }

    fn flash(&mut self, body: BodyHandle, cycles: u32, interval: f64, at: f64) {
        self.flashes.insert(
            body,
            Flash {
                start: at,
                cycles,
                interval,
            },
        );
    }

    fn remove_obstacle(&mut self, body: BodyHandle) {
        if body == self.player {
            return;
        }
        self.bodies.remove(&body);
        self.tweens.retain(|_, t| t.body != body);
        self.touching.remove(&body);
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.pos)
    }
}
