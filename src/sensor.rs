//! Orientation input
//!
//! [`FaceObservation`] is what a face tracker hands over per frame: angles
//! in radians, any of which may be missing, plus a detection confidence.
//! No usable face means a zero sample, which classifies as no intent.
//!
//! [`Autopilot`] is a synthetic head used by the demo and tests. It reads
//! the track the way a player would and emits the observations that a real
//! tracker would report for the matching head movement.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{FACE_CONFIDENCE_THRESHOLD, OBSTACLE_HALF_LENGTH, PLAYER_RADIUS, PLAYER_Z};
use crate::engine::Engine;
use crate::sim::{Lane, OrientationSample, Session};

/// One tracked face, angles in radians as reported by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceObservation {
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub confidence: f32,
}

impl FaceObservation {
    /// Observation for a head held at the given sensor-frame degrees
    pub fn from_degrees(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            roll: Some((roll as f64).to_radians()),
            pitch: Some((pitch as f64).to_radians()),
            yaw: Some((yaw as f64).to_radians()),
            confidence: 1.0,
        }
    }

    /// Head-local sample; missing angles read as zero
    pub fn to_sample(&self) -> OrientationSample {
        let degrees = |angle: Option<f64>| angle.unwrap_or(0.0).to_degrees() as f32;
        OrientationSample::from_sensor(degrees(self.roll), degrees(self.pitch), degrees(self.yaw))
    }
}

/// First confident face wins; none means the zero sample
pub fn sample_from_faces(faces: &[FaceObservation]) -> OrientationSample {
    faces
        .iter()
        .find(|f| f.confidence > FACE_CONFIDENCE_THRESHOLD)
        .map(FaceObservation::to_sample)
        .unwrap_or(OrientationSample::ZERO)
}

/// Degrees the autopilot tilts or nods to (sensor frame, so nodding up is
/// negative pitch)
const TILT_DEGREES: f32 = 32.0;
const NOD_DEGREES: f32 = -25.0;

/// Synthetic head that tries to dodge whatever is coming down its lane
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Chance per decision to react at all (1.0 = never misses)
    skill: f64,
    /// Seconds of warning needed before the obstacle reaches the player
    lookahead: f64,
    /// World units per second the obstacles travel
    obstacle_speed: f32,
    /// Frames the current gesture is still held for
    hold: u32,
    held: FaceObservation,
}

impl Autopilot {
    pub fn new(seed: u64, skill: f64, obstacle_speed: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            skill: skill.clamp(0.0, 1.0),
            lookahead: 0.9,
            obstacle_speed,
            hold: 0,
            held: FaceObservation::default(),
        }
    }

    /// Seconds until the nearest threat in `lane` reaches the player
    fn threat_in<E: Engine>(&self, session: &Session<E>, lane: Lane) -> Option<f64> {
        let reach = OBSTACLE_HALF_LENGTH + PLAYER_RADIUS;
        session
            .obstacles()
            .filter(|o| o.lane == lane && !o.collided)
            .filter_map(|o| session.engine().position(o.body))
            .filter(|pos| pos.z < PLAYER_Z + reach)
            .map(|pos| ((PLAYER_Z - reach - pos.z) / self.obstacle_speed).max(0.0) as f64)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn neutral(&mut self) -> FaceObservation {
        // Small idle sway well inside the gesture thresholds
        let roll = self.rng.random_range(-6.0f32..6.0);
        let pitch = self.rng.random_range(-5.0f32..5.0);
        let yaw = self.rng.random_range(-10.0f32..10.0);
        FaceObservation::from_degrees(roll, pitch, yaw)
    }

    /// Decide this frame's head pose
    pub fn observe<E: Engine>(&mut self, session: &Session<E>) -> FaceObservation {
        if self.hold > 0 {
            self.hold -= 1;
            return self.held;
        }
        // A lost face now and then, like a real camera
        if self.rng.random_bool(0.02) {
            return FaceObservation::default();
        }

        let lane = session.lane();
        let Some(eta) = self.threat_in(session, lane) else {
            return self.neutral();
        };
        if eta > self.lookahead || session.is_switching() || session.is_jumping() {
            return self.neutral();
        }
        if !self.rng.random_bool(self.skill) {
            return self.neutral();
        }

        let mut escapes: Vec<(i8, f64)> = [-1i8, 1]
            .into_iter()
            .filter_map(|dir| {
                let next = lane.shifted(dir)?;
                let clear_for = self.threat_in(session, next).unwrap_or(f64::INFINITY);
                Some((dir, clear_for))
            })
            .filter(|(_, clear_for)| *clear_for > 0.5)
            .collect();
        escapes.sort_by(|a, b| b.1.total_cmp(&a.1));

        let pose = match escapes.first() {
            Some((dir, _)) => FaceObservation::from_degrees(*dir as f32 * TILT_DEGREES, 0.0, 0.0),
            None => FaceObservation::from_degrees(0.0, NOD_DEGREES, 0.0),
        };
        self.held = pose;
        self.hold = 2;
        pose
    }
}
