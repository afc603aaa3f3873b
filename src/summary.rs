//! End-of-session report
//!
//! Handed to the summary view when the clock runs out. Scores are not kept
//! between sessions.

use serde::{Deserialize, Serialize};

/// Running counters kept by the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spawned: u32,
    pub dodged: u32,
    pub hits: u32,
    pub lane_switches: u32,
    pub jumps: u32,
}

/// Final score plus how the session went
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_score: u32,
    /// Seconds played
    pub elapsed: f64,
    pub stats: SessionStats,
}

impl SessionSummary {
    pub fn new(final_score: u32, stats: SessionStats, elapsed: f64) -> Self {
        Self {
            final_score,
            elapsed,
            stats,
        }
    }

    pub fn headline(&self) -> &'static str {
        if self.final_score > 0 {
            "Smashing!"
        } else {
            "Better luck next time!"
        }
    }

    /// Share of spawned obstacles that were dodged (0 when none spawned)
    pub fn dodge_rate(&self) -> f32 {
        if self.stats.spawned == 0 {
            0.0
        } else {
            self.stats.dodged as f32 / self.stats.spawned as f32
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
