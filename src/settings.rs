//! Game tuning and difficulty presets
//!
//! Loaded from a JSON file when one is given; every field falls back to the
//! defaults in [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading, saving or validating tuning
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Standard,
    Frantic,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Standard => "Standard",
            Difficulty::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "standard" | "normal" => Some(Difficulty::Standard),
            "frantic" | "hard" => Some(Difficulty::Frantic),
            _ => None,
        }
    }

    /// Seconds between spawns for this preset
    pub fn spawn_interval(&self) -> f64 {
        match self {
            Difficulty::Relaxed => 4.0,
            Difficulty::Standard => SPAWN_INTERVAL,
            Difficulty::Frantic => 1.5,
        }
    }

    /// Seconds an obstacle needs to cross the track
    pub fn travel_duration(&self) -> f64 {
        match self {
            Difficulty::Relaxed => 5.0,
            Difficulty::Standard => OBSTACLE_TRAVEL_DURATION,
            Difficulty::Frantic => 3.0,
        }
    }
}

/// All gameplay knobs in one place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,

    // === Gestures (degrees) ===
    pub turn_threshold: f32,
    pub jump_lower: f32,
    pub jump_upper: f32,

    // === Player motion (seconds / world units) ===
    pub switch_cooldown: f64,
    pub lane_switch_duration: f64,
    pub jump_phase_duration: f64,
    pub jump_height: f32,

    // === Obstacles ===
    pub spawn_interval: f64,
    pub obstacle_travel_duration: f64,

    // === Scoring ===
    pub dodge_bonus: u32,
    pub collision_penalty: u32,

    // === Session ===
    pub session_duration: f64,
    pub clock_tick: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Standard,

            turn_threshold: TURN_THRESHOLD,
            jump_lower: JUMP_LOWER,
            jump_upper: JUMP_UPPER,

            switch_cooldown: SWITCH_COOLDOWN,
            lane_switch_duration: LANE_SWITCH_DURATION,
            jump_phase_duration: JUMP_PHASE_DURATION,
            jump_height: JUMP_HEIGHT,

            spawn_interval: SPAWN_INTERVAL,
            obstacle_travel_duration: OBSTACLE_TRAVEL_DURATION,

            dodge_bonus: DODGE_BONUS,
            collision_penalty: COLLISION_PENALTY,

            session_duration: SESSION_DURATION,
            clock_tick: CLOCK_TICK,
        }
    }
}

impl Tuning {
    /// Create tuning from a difficulty preset (applies preset timings)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_difficulty(difficulty);
        tuning
    }

    /// Apply a difficulty preset (updates spawn timing only)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.spawn_interval = difficulty.spawn_interval();
        self.obstacle_travel_duration = difficulty.travel_duration();
    }

    /// Reject tunings the state machines cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.turn_threshold <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "turn_threshold must be positive, got {}",
                self.turn_threshold
            )));
        }
        if self.jump_lower >= self.jump_upper {
            return Err(SettingsError::Invalid(format!(
                "jump window is empty: {} >= {}",
                self.jump_lower, self.jump_upper
            )));
        }
        let durations = [
            ("lane_switch_duration", self.lane_switch_duration),
            ("jump_phase_duration", self.jump_phase_duration),
            ("spawn_interval", self.spawn_interval),
            ("obstacle_travel_duration", self.obstacle_travel_duration),
            ("session_duration", self.session_duration),
            ("clock_tick", self.clock_tick),
        ];
        for (name, value) in durations {
            if !(value > 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.switch_cooldown < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "switch_cooldown must not be negative, got {}",
                self.switch_cooldown
            )));
        }
        Ok(())
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let tuning: Tuning = serde_json::from_str(&json)?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Write tuning as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Tuning saved to {}", path.display());
        Ok(())
    }
}
