//! Fixed-length session countdown

use serde::{Deserialize, Serialize};

/// Clock lifecycle. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClockPhase {
    NotStarted,
    Running { started_at: f64 },
    Ended { started_at: f64, ended_at: f64 },
}

/// Slack for comparing accumulated float time against the duration
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct GameClock {
    duration: f64,
    phase: ClockPhase,
}

impl GameClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            phase: ClockPhase::NotStarted,
        }
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, ClockPhase::Running { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, ClockPhase::Ended { .. })
    }

    /// Returns false unless this call moved the clock out of `NotStarted`
    pub fn start(&mut self, now: f64) -> bool {
        if self.phase != ClockPhase::NotStarted {
            return false;
        }
        self.phase = ClockPhase::Running { started_at: now };
        true
    }

    /// Seconds since start (frozen once ended)
    pub fn elapsed(&self, now: f64) -> f64 {
        match self.phase {
            ClockPhase::NotStarted => 0.0,
            ClockPhase::Running { started_at } => (now - started_at).max(0.0),
            ClockPhase::Ended {
                started_at,
                ended_at,
            } => ended_at - started_at,
        }
    }

    pub fn remaining(&self, now: f64) -> f64 {
        match self.phase {
            ClockPhase::NotStarted => self.duration,
            _ => (self.duration - self.elapsed(now)).max(0.0),
        }
    }

    /// Periodic check. Returns true exactly once, on the tick that ends the
    /// session; ticks before start or after the end are no-ops.
    pub fn tick(&mut self, now: f64) -> bool {
        let ClockPhase::Running { started_at } = self.phase else {
            return false;
        };
        if now - started_at + TIME_EPSILON >= self.duration {
            self.phase = ClockPhase::Ended {
                started_at,
                ended_at: now,
            };
            true
        } else {
            false
        }
    }

    /// End early. Returns true only on the transition.
    pub fn stop(&mut self, now: f64) -> bool {
        match self.phase {
            ClockPhase::Running { started_at } => {
                self.phase = ClockPhase::Ended {
                    started_at,
                    ended_at: now,
                };
                true
            }
            ClockPhase::NotStarted => {
                self.phase = ClockPhase::Ended {
                    started_at: now,
                    ended_at: now,
                };
                true
            }
            ClockPhase::Ended { .. } => false,
        }
    }
}
