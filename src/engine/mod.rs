//! Render/physics collaborator boundary
//!
//! The game core never moves bodies itself. It asks an [`Engine`] to spawn
//! and animate them, and hears back through [`EngineEvent`]s (animation
//! finished, bodies touched) that the owner feeds into the session.

pub mod headless;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::Lane;

pub use headless::HeadlessEngine;

/// Opaque handle to an engine-side body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Identifies one requested animation so its completion can be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

/// Animation timing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInEaseOut,
}

impl Easing {
    /// Map normalized time [0, 1] to normalized progress [0, 1]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInEaseOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Notifications from the engine back to the game core
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    AnimationFinished(AnimationId),
    /// Two bodies started overlapping (reported in either order)
    Contact(BodyHandle, BodyHandle),
}

/// What the game core needs from a scene/physics backend
pub trait Engine {
    /// The player's body (exists for the engine's lifetime)
    fn player(&self) -> BodyHandle;

    /// Create an obstacle body at `start`
    fn spawn_obstacle(&mut self, lane: Lane, start: Vec3) -> BodyHandle;

    /// Move a body to `target` over `duration` seconds
    fn animate_move(&mut self, body: BodyHandle, target: Vec3, duration: f64, easing: Easing) -> AnimationId;

    /// Move a body vertically by `height` (negative to descend) over `duration`
    fn animate_jump(&mut self, body: BodyHandle, height: f32, duration: f64, easing: Easing) -> AnimationId;

    /// Blink a body `cycles` times, hidden then shown for `interval` each,
    /// starting at `at` even if the backend has not been stepped that far
    fn flash(&mut self, body: BodyHandle, cycles: u32, interval: f64, at: f64);

    /// Destroy an obstacle body; unknown handles are ignored
    fn remove_obstacle(&mut self, body: BodyHandle);

    /// Current world position, None for removed bodies
    fn position(&self, body: BodyHandle) -> Option<Vec3>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInEaseOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
    }

    #[test]
    fn test_easing_shapes() {
        assert!(Easing::EaseIn.apply(0.5) < 0.5);
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
        assert!((Easing::EaseInEaseOut.apply(0.5) - 0.5).abs() < 1e-6);
    }
}
