//! Tilt Runner - a three-lane obstacle dodger steered by head gestures
//!
//! Core modules:
//! - `sim`: Deterministic game core (gestures, action gate, lanes, obstacles, scoring)
//! - `engine`: Render/physics collaborator boundary plus a headless implementation
//! - `sensor`: Face observation ingestion and the synthetic autopilot head
//! - `runtime`: Command funnel that serializes cross-thread input onto the session
//! - `settings`: Data-driven tuning and difficulty presets
//! - `summary`: End-of-session report

pub mod engine;
pub mod runtime;
pub mod sensor;
pub mod settings;
pub mod sim;
pub mod summary;

pub use settings::{Difficulty, SettingsError, Tuning};
pub use summary::SessionSummary;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Head roll beyond this (degrees, either side) switches lanes
    pub const TURN_THRESHOLD: f32 = 24.0;
    /// Head pitch window (degrees, exclusive) that triggers a jump
    pub const JUMP_LOWER: f32 = 20.0;
    pub const JUMP_UPPER: f32 = 30.0;

    /// Minimum spacing between two admitted actions (seconds)
    pub const SWITCH_COOLDOWN: f64 = 0.1;
    /// Lane switch animation length (seconds)
    pub const LANE_SWITCH_DURATION: f64 = 0.2;
    /// Duration of each jump phase, rise and fall (seconds)
    pub const JUMP_PHASE_DURATION: f64 = 0.5;
    /// Jump apex above the resting height (world units)
    pub const JUMP_HEIGHT: f32 = 2.4;

    /// Lanes are indexed -1, 0, 1
    pub const MIN_LANE: i8 = -1;
    pub const MAX_LANE: i8 = 1;
    /// Horizontal distance between lane centers
    pub const LANE_SPACING: f32 = 2.0;

    /// Player resting position (the track runs along +z toward the camera)
    pub const PLAYER_REST_Y: f32 = 1.0;
    pub const PLAYER_Z: f32 = -6.0;
    pub const PLAYER_RADIUS: f32 = 0.5;

    /// Obstacle traversal: spawned far away, moved past the player
    pub const TRACK_START_Z: f32 = -50.0;
    pub const TRACK_END_Z: f32 = 50.0;
    pub const OBSTACLE_Y: f32 = 1.0;
    /// Obstacle box half extents (x, y, z)
    pub const OBSTACLE_HALF_WIDTH: f32 = 0.8;
    pub const OBSTACLE_HALF_HEIGHT: f32 = 0.4;
    pub const OBSTACLE_HALF_LENGTH: f32 = 0.4;

    /// Seconds between obstacle spawns
    pub const SPAWN_INTERVAL: f64 = 3.0;
    /// Seconds an obstacle takes to cross the track
    pub const OBSTACLE_TRAVEL_DURATION: f64 = 4.0;

    /// Score for an obstacle that passed without contact
    pub const DODGE_BONUS: u32 = 8;
    /// Score lost on contact (score floors at zero)
    pub const COLLISION_PENALTY: u32 = 4;

    /// Session length and clock resolution (seconds)
    pub const SESSION_DURATION: f64 = 60.0;
    pub const CLOCK_TICK: f64 = 1.0;

    /// Hit feedback: hide/show blink cycles and the half-cycle length
    pub const FLASH_CYCLES: u32 = 5;
    pub const FLASH_INTERVAL: f64 = 0.1;

    /// Face observations below this confidence count as "no face"
    pub const FACE_CONFIDENCE_THRESHOLD: f32 = 0.1;
}

/// World-space x offset of a lane center
#[inline]
pub fn lane_offset(lane: i8) -> f32 {
    lane as f32 * consts::LANE_SPACING
}

/// Resting player position for a lane
#[inline]
pub fn player_rest_position(lane: i8) -> Vec3 {
    Vec3::new(lane_offset(lane), consts::PLAYER_REST_Y, consts::PLAYER_Z)
}
