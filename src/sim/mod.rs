//! Deterministic game core
//!
//! All gameplay rules live here. This module must stay deterministic:
//! - Virtual time only (callers pass `now`, timers never read a clock)
//! - Seeded RNG only
//! - Stable iteration order (by obstacle ID)
//! - No rendering or camera dependencies beyond the `Engine` trait

pub mod clock;
pub mod collision;
pub mod gate;
pub mod gesture;
pub mod obstacle;
pub mod score;
pub mod session;
pub mod state;
pub mod timer;

pub use clock::{ClockPhase, GameClock};
pub use collision::{CollisionResolver, ContactOutcome};
pub use gate::{Action, ActionGate, PlayerStatus, Rejection};
pub use gesture::{GestureClassifier, Intent, OrientationSample, classify};
pub use obstacle::{Obstacle, ObstacleId, ObstacleSpawner, TraversalOutcome};
pub use score::ScoreBoard;
pub use session::{Session, SessionEvent, SessionPhase};
pub use state::{JumpPhase, JumpState, JumpStep, Lane, LaneState};
pub use timer::{Scheduler, TimerKind};
