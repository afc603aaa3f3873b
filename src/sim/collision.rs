//! Player/obstacle contact resolution
//!
//! The physics backend may report the same touch several times and in
//! either body order. Only the first contact per obstacle costs points, and
//! marking the obstacle collided keeps its later traversal from earning the
//! dodge bonus.

use super::obstacle::{ObstacleId, ObstacleSpawner};
use crate::engine::BodyHandle;

/// What a contact event turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// First touch on this obstacle: apply the penalty
    Hit(ObstacleId),
    /// Obstacle was already marked collided
    Repeat(ObstacleId),
    /// Not a player/obstacle pair, or the obstacle is gone
    Ignored,
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    player: BodyHandle,
}

impl CollisionResolver {
    pub fn new(player: BodyHandle) -> Self {
        Self { player }
    }

    /// The non-player body of a pair that includes the player
    fn other_body(&self, a: BodyHandle, b: BodyHandle) -> Option<BodyHandle> {
        if a == self.player && b != self.player {
            Some(b)
        } else if b == self.player && a != self.player {
            Some(a)
        } else {
            None
        }
    }

    /// Classify a contact and mark the obstacle on its first hit
    pub fn resolve(&self, spawner: &mut ObstacleSpawner, a: BodyHandle, b: BodyHandle) -> ContactOutcome {
        let Some(other) = self.other_body(a, b) else {
            return ContactOutcome::Ignored;
        };
        let Some(id) = spawner.by_body(other) else {
            return ContactOutcome::Ignored;
        };
        let Some(obstacle) = spawner.get_mut(id) else {
            return ContactOutcome::Ignored;
        };
        if obstacle.collided {
            return ContactOutcome::Repeat(id);
        }
        obstacle.collided = true;
        obstacle.scored = true;
        ContactOutcome::Hit(id)
    }
}
