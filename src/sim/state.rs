//! Player lane and jump state
//!
//! Both are driven by admitted actions and cleared by animation completions
//! reported back from the engine.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LANE, MIN_LANE};
use crate::engine::AnimationId;

/// One of the three lanes, always within -1..=1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Lane(i8);

impl Lane {
    pub const LEFT: Self = Self(MIN_LANE);
    pub const CENTER: Self = Self(0);
    pub const RIGHT: Self = Self(MAX_LANE);

    pub const ALL: [Lane; 3] = [Lane::LEFT, Lane::CENTER, Lane::RIGHT];

    /// Returns None outside the track
    pub fn new(index: i8) -> Option<Self> {
        (MIN_LANE..=MAX_LANE).contains(&index).then_some(Self(index))
    }

    pub fn index(&self) -> i8 {
        self.0
    }

    /// Neighbouring lane in `direction`, None at the edge
    pub fn shifted(&self, direction: i8) -> Option<Self> {
        Self::new(self.0.checked_add(direction)?)
    }

    pub fn offset(&self) -> f32 {
        crate::lane_offset(self.0)
    }
}

/// Lane in effect plus the switch currently animating, if any
#[derive(Debug, Clone, Default)]
pub struct LaneState {
    lane: Lane,
    pending: Option<AnimationId>,
}

impl LaneState {
    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn is_switching(&self) -> bool {
        self.pending.is_some()
    }

    /// Commit a switch. The lane index moves immediately; the animation
    /// only catches the body up.
    pub fn begin_switch(&mut self, target: Lane, animation: AnimationId) {
        self.lane = target;
        self.pending = Some(animation);
    }

    /// Returns true if `animation` was the pending switch
    pub fn complete(&mut self, animation: AnimationId) -> bool {
        if self.pending == Some(animation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Drop any in-flight switch (session teardown)
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Jump phases: up with ease-out, down with ease-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    #[default]
    Grounded,
    Rising(AnimationId),
    Falling(AnimationId),
}

/// What finishing a jump animation means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpStep {
    /// Apex reached, start the fall
    StartFall,
    /// Back on the ground
    Landed,
}

#[derive(Debug, Clone, Default)]
pub struct JumpState {
    phase: JumpPhase,
}

impl JumpState {
    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    pub fn is_jumping(&self) -> bool {
        self.phase != JumpPhase::Grounded
    }

    pub fn begin(&mut self, rise: AnimationId) {
        self.phase = JumpPhase::Rising(rise);
    }

    pub fn begin_fall(&mut self, fall: AnimationId) {
        self.phase = JumpPhase::Falling(fall);
    }

    /// Advance on an animation completion; None if it is not ours
    pub fn complete(&mut self, animation: AnimationId) -> Option<JumpStep> {
        match self.phase {
            JumpPhase::Rising(id) if id == animation => Some(JumpStep::StartFall),
            JumpPhase::Falling(id) if id == animation => {
                self.phase = JumpPhase::Grounded;
                Some(JumpStep::Landed)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.phase = JumpPhase::Grounded;
    }
}
