//! The session's single score counter

use serde::{Deserialize, Serialize};

/// Score with a floor of zero. Bonuses are uncapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    score: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Add points; returns the signed change actually applied
    pub fn award(&mut self, points: u32) -> i64 {
        let before = self.score;
        self.score = self.score.saturating_add(points);
        self.score as i64 - before as i64
    }

    /// Subtract points without going below zero; returns the signed change
    pub fn penalize(&mut self, points: u32) -> i64 {
        let before = self.score;
        self.score = self.score.saturating_sub(points);
        self.score as i64 - before as i64
    }
}
