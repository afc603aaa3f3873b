//! Head orientation to game intent
//!
//! Classification is a pure function of the current sample. Roll (head tilt)
//! is checked before pitch, so a sample that satisfies both is always a turn.

use serde::{Deserialize, Serialize};

use crate::Tuning;

/// Head orientation in degrees, head-local (positive pitch = head up)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationSample {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl OrientationSample {
    pub const ZERO: Self = Self {
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
    };

    pub fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Build from raw sensor degrees. The face tracker reports pitch with the
    /// opposite sign, so it is negated here.
    pub fn from_sensor(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            roll,
            pitch: -pitch,
            yaw,
        }
    }
}

/// Discrete action a gesture asks for, before admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Intent {
    #[default]
    None,
    SwitchLeft,
    SwitchRight,
    Jump,
}

impl Intent {
    /// Lane delta for switch intents
    pub fn direction(&self) -> Option<i8> {
        match self {
            Intent::SwitchLeft => Some(-1),
            Intent::SwitchRight => Some(1),
            Intent::None | Intent::Jump => None,
        }
    }

    pub fn is_switch(&self) -> bool {
        self.direction().is_some()
    }
}

/// Gesture thresholds, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    pub turn_threshold: f32,
    pub jump_lower: f32,
    pub jump_upper: f32,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

impl GestureClassifier {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            turn_threshold: tuning.turn_threshold,
            jump_lower: tuning.jump_lower,
            jump_upper: tuning.jump_upper,
        }
    }

    /// Map one sample to an intent. First match wins: turn, then jump.
    pub fn classify(&self, sample: &OrientationSample) -> Intent {
        if sample.roll.abs() > self.turn_threshold {
            if sample.roll < 0.0 {
                Intent::SwitchLeft
            } else {
                Intent::SwitchRight
            }
        } else if sample.pitch > self.jump_lower && sample.pitch < self.jump_upper {
            Intent::Jump
        } else {
            Intent::None
        }
    }
}

/// Classify with the default thresholds
pub fn classify(sample: &OrientationSample) -> Intent {
    GestureClassifier::default().classify(sample)
}
