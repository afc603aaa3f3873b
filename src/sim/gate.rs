//! Action admission: cooldown, debounce and mutual exclusion
//!
//! A classified intent only becomes an action if no guard rejects it.
//! Rejections are silent; the next sample may try again.

use serde::{Deserialize, Serialize};

use super::gesture::Intent;
use super::state::Lane;

/// An intent that passed every guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Switch { from: Lane, to: Lane },
    Jump,
}

/// Why an intent was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoIntent,
    /// Too soon after the previous admitted action
    Cooldown,
    /// A lane switch is still animating
    SwitchInFlight,
    /// A jump is still in the air
    JumpInFlight,
    /// Already in the outermost lane on that side
    LaneBoundary,
}

/// Snapshot of the player the guards look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStatus {
    pub lane: Lane,
    pub switching: bool,
    pub jumping: bool,
}

#[derive(Debug, Clone)]
pub struct ActionGate {
    cooldown: f64,
    last_action: Option<f64>,
}

impl ActionGate {
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            last_action: None,
        }
    }

    /// Time of the most recently admitted action
    pub fn last_action(&self) -> Option<f64> {
        self.last_action
    }

    fn cooling_down(&self, now: f64) -> bool {
        self.last_action
            .is_some_and(|last| now - last < self.cooldown)
    }

    /// Decide whether `intent` may fire at `now`. Switches and jumps exclude
    /// each other in both directions.
    pub fn admit(&mut self, intent: Intent, now: f64, player: PlayerStatus) -> Result<Action, Rejection> {
        if intent == Intent::None {
            return Err(Rejection::NoIntent);
        }
        if self.cooling_down(now) {
            return Err(Rejection::Cooldown);
        }

        let action = match intent.direction() {
            Some(direction) => {
                if player.switching {
                    return Err(Rejection::SwitchInFlight);
                }
                if player.jumping {
                    return Err(Rejection::JumpInFlight);
                }
                let to = player.lane.shifted(direction).ok_or(Rejection::LaneBoundary)?;
                Action::Switch {
                    from: player.lane,
                    to,
                }
            }
            None => {
                if player.jumping {
                    return Err(Rejection::JumpInFlight);
                }
                if player.switching {
                    return Err(Rejection::SwitchInFlight);
                }
                Action::Jump
            }
        };

        self.last_action = Some(now);
        Ok(action)
    }

    /// Forget the cooldown (new session)
    pub fn reset(&mut self) {
        self.last_action = None;
    }
}
