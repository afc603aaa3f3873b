//! Game session: the single owner of all mutable game state
//!
//! Sensor samples, animation completions, contacts and timer expiries all
//! enter through `&mut self` methods, so they are applied one at a time in
//! the order the owner delivers them. Every input first fires the timers
//! due at or before its timestamp, which keeps late samples from acting on
//! a session that has already run out of time.

use serde::{Deserialize, Serialize};

use super::clock::{ClockPhase, GameClock};
use super::collision::{CollisionResolver, ContactOutcome};
use super::gate::{Action, ActionGate, PlayerStatus, Rejection};
use super::gesture::{GestureClassifier, OrientationSample};
use super::obstacle::{Obstacle, ObstacleId, ObstacleSpawner, TraversalOutcome};
use super::score::ScoreBoard;
use super::state::{JumpPhase, JumpState, JumpStep, Lane, LaneState};
use super::timer::{Scheduler, TimerKind};
use crate::consts::{FLASH_CYCLES, FLASH_INTERVAL};
use crate::engine::{AnimationId, BodyHandle, Easing, Engine, EngineEvent};
use crate::summary::{SessionStats, SessionSummary};
use crate::{SettingsError, Tuning, player_rest_position};

/// Coarse lifecycle, derived from the game clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    NotStarted,
    Running,
    Ended,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Started { at: f64 },
    ActionAdmitted { action: Action, at: f64 },
    LaneChanged { lane: Lane },
    JumpLanded { at: f64 },
    ObstacleSpawned { id: ObstacleId, lane: Lane },
    ObstacleDodged { id: ObstacleId },
    ObstacleHit { id: ObstacleId },
    ScoreChanged { score: u32, delta: i64 },
    Ended { final_score: u32, at: f64 },
}

pub struct Session<E: Engine> {
    tuning: Tuning,
    engine: E,
    classifier: GestureClassifier,
    gate: ActionGate,
    lane: LaneState,
    jump: JumpState,
    spawner: ObstacleSpawner,
    resolver: CollisionResolver,
    score: ScoreBoard,
    clock: GameClock,
    scheduler: Scheduler,
    stats: SessionStats,
    events: Vec<SessionEvent>,
    last_sample: OrientationSample,
    now: f64,
}

impl<E: Engine> Session<E> {
    /// Fails on tuning that `Tuning::validate` rejects; a non-positive tick
    /// period would keep `advance_to` from ever catching up.
    pub fn new(tuning: Tuning, engine: E, seed: u64) -> Result<Self, SettingsError> {
        tuning.validate()?;
        let resolver = CollisionResolver::new(engine.player());
        Ok(Self {
            classifier: GestureClassifier::from_tuning(&tuning),
            gate: ActionGate::new(tuning.switch_cooldown),
            lane: LaneState::default(),
            jump: JumpState::default(),
            spawner: ObstacleSpawner::new(seed, tuning.obstacle_travel_duration),
            resolver,
            score: ScoreBoard::new(),
            clock: GameClock::new(tuning.session_duration),
            scheduler: Scheduler::new(),
            stats: SessionStats::default(),
            events: Vec::new(),
            last_sample: OrientationSample::ZERO,
            now: 0.0,
            tuning,
            engine,
        })
    }

    // === Read-only views ===

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable engine access, for stepping a backend the session owns
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn phase(&self) -> SessionPhase {
        match self.clock.phase() {
            ClockPhase::NotStarted => SessionPhase::NotStarted,
            ClockPhase::Running { .. } => SessionPhase::Running,
            ClockPhase::Ended { .. } => SessionPhase::Ended,
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn lane(&self) -> Lane {
        self.lane.lane()
    }

    pub fn is_switching(&self) -> bool {
        self.lane.is_switching()
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    pub fn jump_phase(&self) -> JumpPhase {
        self.jump.phase()
    }

    pub fn last_sample(&self) -> OrientationSample {
        self.last_sample
    }

    pub fn remaining(&self) -> f64 {
        self.clock.remaining(self.now)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.spawner.live()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(self.score(), self.stats.clone(), self.clock.elapsed(self.now))
    }

    fn player_status(&self) -> PlayerStatus {
        PlayerStatus {
            lane: self.lane.lane(),
            switching: self.lane.is_switching(),
            jumping: self.jump.is_jumping(),
        }
    }

    // === Lifecycle ===

    /// Begin the countdown and the spawn timer. Calling again is a no-op.
    pub fn start_session(&mut self, now: f64) -> bool {
        self.now = self.now.max(now);
        if !self.clock.start(self.now) {
            return false;
        }
        self.scheduler
            .schedule_repeating(TimerKind::Clock, self.now, self.tuning.clock_tick);
        if self.spawner.start() {
            self.scheduler
                .schedule_repeating(TimerKind::Spawn, self.now, self.tuning.spawn_interval);
        }
        self.gate.reset();
        log::info!(
            "Session started ({}s, spawn every {}s)",
            self.tuning.session_duration,
            self.tuning.spawn_interval
        );
        self.events.push(SessionEvent::Started { at: self.now });
        true
    }

    /// Stop early (e.g. the player left the game view). Returns the final
    /// score; repeated calls return the same value.
    pub fn end_session(&mut self, now: f64) -> u32 {
        self.advance_to(now);
        if self.clock.stop(self.now) {
            self.finish(self.now);
        }
        self.score()
    }

    /// Cancel timers and drop everything still in flight. Completions that
    /// arrive afterwards no longer match anything and are ignored.
    fn finish(&mut self, at: f64) {
        self.scheduler.cancel_all();
        self.spawner.clear(&mut self.engine);
        self.lane.cancel();
        self.jump.cancel();
        let final_score = self.score();
        log::info!(
            "Session ended at t={:.2}: score {} ({} dodged, {} hit)",
            at,
            final_score,
            self.stats.dodged,
            self.stats.hits
        );
        self.events.push(SessionEvent::Ended { final_score, at });
    }

    /// Fire every timer due at or before `now`, in time order
    pub fn advance_to(&mut self, now: f64) {
        self.now = self.now.max(now);
        while let Some((kind, due)) = self.scheduler.pop_due(self.now) {
            match kind {
                TimerKind::Clock => {
                    if self.clock.tick(due) {
                        self.finish(due);
                    }
                }
                TimerKind::Spawn => {
                    if self.clock.is_running() {
                        self.spawn_obstacle(due);
                    }
                }
            }
        }
    }

    fn spawn_obstacle(&mut self, at: f64) {
        let obstacle = self.spawner.spawn(&mut self.engine, at);
        let (id, lane) = (obstacle.id, obstacle.lane);
        self.stats.spawned += 1;
        self.events.push(SessionEvent::ObstacleSpawned { id, lane });
    }

    // === Sensor input ===

    /// Raw sensor degrees (pitch is flipped to head-local here)
    pub fn on_orientation(&mut self, roll: f32, pitch: f32, yaw: f32, now: f64) -> Option<Action> {
        self.on_sample(OrientationSample::from_sensor(roll, pitch, yaw), now)
    }

    /// Classify and, if admitted, execute a head-local sample
    pub fn on_sample(&mut self, sample: OrientationSample, now: f64) -> Option<Action> {
        self.advance_to(now);
        self.last_sample = sample;
        if !self.clock.is_running() {
            return None;
        }

        let intent = self.classifier.classify(&sample);
        match self.gate.admit(intent, self.now, self.player_status()) {
            Ok(action) => {
                self.execute(action);
                Some(action)
            }
            Err(Rejection::NoIntent) => None,
            Err(reason) => {
                log::trace!("Dropped {:?}: {:?}", intent, reason);
                None
            }
        }
    }

    fn execute(&mut self, action: Action) {
        let player = self.engine.player();
        match action {
            Action::Switch { from, to } => {
                let animation = self.engine.animate_move(
                    player,
                    player_rest_position(to.index()),
                    self.tuning.lane_switch_duration,
                    Easing::EaseInEaseOut,
                );
                self.lane.begin_switch(to, animation);
                self.stats.lane_switches += 1;
                log::debug!("Lane {} -> {} at t={:.2}", from.index(), to.index(), self.now);
                self.events.push(SessionEvent::ActionAdmitted { action, at: self.now });
                self.events.push(SessionEvent::LaneChanged { lane: to });
            }
            Action::Jump => {
                let animation = self.engine.animate_jump(
                    player,
                    self.tuning.jump_height,
                    self.tuning.jump_phase_duration,
                    Easing::EaseOut,
                );
                self.jump.begin(animation);
                self.stats.jumps += 1;
                log::debug!("Jump at t={:.2}", self.now);
                self.events.push(SessionEvent::ActionAdmitted { action, at: self.now });
            }
        }
    }

    // === Engine callbacks ===

    /// Route one engine notification
    pub fn on_engine_event(&mut self, event: EngineEvent, now: f64) {
        match event {
            EngineEvent::AnimationFinished(id) => self.on_animation_finished(id, now),
            EngineEvent::Contact(a, b) => self.on_contact(a, b, now),
        }
    }

    pub fn on_animation_finished(&mut self, animation: AnimationId, now: f64) {
        self.advance_to(now);
        if !self.clock.is_running() {
            return;
        }
        if self.lane.complete(animation) {
            return;
        }
        match self.jump.complete(animation) {
            Some(JumpStep::StartFall) => {
                let player = self.engine.player();
                let fall = self.engine.animate_jump(
                    player,
                    -self.tuning.jump_height,
                    self.tuning.jump_phase_duration,
                    Easing::EaseIn,
                );
                self.jump.begin_fall(fall);
                return;
            }
            Some(JumpStep::Landed) => {
                self.events.push(SessionEvent::JumpLanded { at: self.now });
                return;
            }
            None => {}
        }

        match self.spawner.complete_traversal(&mut self.engine, animation) {
            Some(TraversalOutcome::Dodged(id)) => {
                let delta = self.score.award(self.tuning.dodge_bonus);
                self.stats.dodged += 1;
                log::debug!("Obstacle {} dodged, score {}", id.0, self.score());
                self.events.push(SessionEvent::ObstacleDodged { id });
                self.push_score(delta);
            }
            Some(TraversalOutcome::Expired(id)) => {
                log::trace!("Obstacle {} left the track", id.0);
            }
            None => log::debug!("Ignoring completion of unknown animation {:?}", animation),
        }
    }

    pub fn on_contact(&mut self, a: BodyHandle, b: BodyHandle, now: f64) {
        self.advance_to(now);
        if !self.clock.is_running() {
            return;
        }
        match self.resolver.resolve(&mut self.spawner, a, b) {
            ContactOutcome::Hit(id) => {
                let player = self.engine.player();
                self.engine.flash(player, FLASH_CYCLES, FLASH_INTERVAL, self.now);
                let delta = self.score.penalize(self.tuning.collision_penalty);
                self.stats.hits += 1;
                log::debug!("Hit obstacle {}, score {}", id.0, self.score());
                self.events.push(SessionEvent::ObstacleHit { id });
                self.push_score(delta);
            }
            ContactOutcome::Repeat(_) => {}
            ContactOutcome::Ignored => log::debug!("Ignoring contact {:?} / {:?}", a, b),
        }
    }

    fn push_score(&mut self, delta: i64) {
        self.events.push(SessionEvent::ScoreChanged {
            score: self.score(),
            delta,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;

    fn running_session() -> Session<HeadlessEngine> {
        let mut session = Session::new(Tuning::default(), HeadlessEngine::new(), 11).unwrap();
        assert!(session.start_session(0.0));
        session
    }

    /// Step the engine and feed its events back, like the runtime loop does
    fn pump(session: &mut Session<HeadlessEngine>, now: f64) {
        let events = session.engine_mut().step(now);
        for event in events {
            session.on_engine_event(event, now);
        }
        session.advance_to(now);
    }

    #[test]
    fn test_tilt_left_moves_to_left_lane() {
        let mut session = running_session();
        let action = session.on_sample(OrientationSample::new(-30.0, 0.0, 0.0), 0.5);
        assert_eq!(
            action,
            Some(Action::Switch {
                from: Lane::CENTER,
                to: Lane::LEFT
            })
        );
        assert_eq!(session.lane(), Lane::LEFT);
        assert!(session.is_switching());

        pump(&mut session, 0.7);
        assert!(!session.is_switching());
        assert_eq!(session.engine().position(session.engine().player()).unwrap().x, -2.0);
    }

    #[test]
    fn test_left_boundary_rejected() {
        let mut session = running_session();
        session.on_sample(OrientationSample::new(-30.0, 0.0, 0.0), 0.5);
        pump(&mut session, 0.8);
        assert_eq!(session.on_sample(OrientationSample::new(-30.0, 0.0, 0.0), 1.0), None);
        assert_eq!(session.lane(), Lane::LEFT);
    }

    #[test]
    fn test_second_intent_inside_cooldown_dropped() {
        let mut session = running_session();
        assert!(session.on_sample(OrientationSample::new(0.0, 25.0, 0.0), 1.0).is_some());
        assert!(session.on_sample(OrientationSample::new(40.0, 0.0, 0.0), 1.05).is_none());
        assert_eq!(session.lane(), Lane::CENTER);
    }

    #[test]
    fn test_jump_lasts_both_phases() {
        let mut session = running_session();
        assert_eq!(session.on_sample(OrientationSample::new(0.0, 25.0, 0.0), 1.0), Some(Action::Jump));
        assert!(session.is_jumping());

        pump(&mut session, 1.5);
        assert!(matches!(session.jump_phase(), JumpPhase::Falling(_)));
        assert!(session.is_jumping());
        // No double jump mid-air
        assert!(session.on_sample(OrientationSample::new(0.0, 25.0, 0.0), 1.7).is_none());

        pump(&mut session, 2.0);
        assert!(!session.is_jumping());
        let y = session.engine().position(session.engine().player()).unwrap().y;
        assert!((y - crate::consts::PLAYER_REST_Y).abs() < 1e-4);
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::JumpLanded { .. })));
    }

    // Jumps and switches exclude each other both ways
    #[test]
    fn test_jump_blocked_during_lane_switch() {
        let mut session = running_session();
        session.on_sample(OrientationSample::new(30.0, 0.0, 0.0), 1.0);
        assert!(session.on_sample(OrientationSample::new(0.0, 25.0, 0.0), 1.15).is_none());
        assert!(!session.is_jumping());
    }

    #[test]
    fn test_switch_blocked_during_jump() {
        let mut session = running_session();
        session.on_sample(OrientationSample::new(0.0, 25.0, 0.0), 1.0);
        assert!(session.on_sample(OrientationSample::new(30.0, 0.0, 0.0), 1.2).is_none());
        assert_eq!(session.lane(), Lane::CENTER);
    }

    #[test]
    fn test_samples_before_start_ignored() {
        let mut session = Session::new(Tuning::default(), HeadlessEngine::new(), 1).unwrap();
        assert!(session.on_sample(OrientationSample::new(-30.0, 0.0, 0.0), 0.0).is_none());
        assert_eq!(session.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_spawns_every_interval() {
        let mut session = running_session();
        session.advance_to(2.9);
        assert_eq!(session.obstacles().count(), 0);
        session.advance_to(3.0);
        assert_eq!(session.obstacles().count(), 1);
        session.advance_to(6.0);
        assert_eq!(session.stats().spawned, 2);
    }

    #[test]
    fn test_start_twice_does_not_double_spawn() {
        let mut session = running_session();
        assert!(!session.start_session(1.0));
        session.advance_to(3.0);
        assert_eq!(session.stats().spawned, 1);
    }

    #[test]
    fn test_dodge_awards_bonus_once() {
        let mut session = running_session();
        pump(&mut session, 3.0);
        let obstacle = session.obstacles().next().unwrap().clone();
        // Move out of the obstacle's lane so it cannot touch us
        let roll = if obstacle.lane == Lane::LEFT { 30.0 } else { -30.0 };
        session.on_sample(OrientationSample::new(roll, 0.0, 0.0), 3.1);
        for frame in 1..=40 {
            pump(&mut session, 3.1 + frame as f64 * 0.1);
        }
        assert_eq!(session.score(), 8);
        assert_eq!(session.stats().dodged, 1);

        // A duplicate completion changes nothing
        session.on_animation_finished(obstacle.traversal, 7.5);
        assert_eq!(session.score(), 8);
    }

    #[test]
    fn test_contact_penalizes_once_and_blocks_bonus() {
        let mut session = running_session();
        for _ in 0..3 {
            session.score.award(8);
        }
        pump(&mut session, 3.0);
        let obstacle = session.obstacles().next().unwrap().clone();
        let player = session.engine().player();

        session.on_contact(player, obstacle.body, 5.0);
        assert_eq!(session.score(), 20);
        session.on_contact(obstacle.body, player, 5.1);
        assert_eq!(session.score(), 20);

        session.engine_mut().step(7.0);
        session.on_animation_finished(obstacle.traversal, 7.0);
        assert_eq!(session.score(), 20);
        assert_eq!(session.stats().hits, 1);
        assert_eq!(session.stats().dodged, 0);
    }

    #[test]
    fn test_hit_flashes_player_once() {
        let mut session = running_session();
        pump(&mut session, 3.0);
        let body = session.obstacles().next().unwrap().body;
        let player = session.engine().player();

        session.on_contact(player, body, 3.0);
        session.engine_mut().step(3.05);
        assert!(session.engine().is_hidden(player));
        session.engine_mut().step(3.15);
        assert!(!session.engine().is_hidden(player));

        // A repeat contact leaves the running blink alone
        session.on_contact(body, player, 3.15);
        assert!(!session.engine().is_hidden(player));
        session.engine_mut().step(3.25);
        assert!(session.engine().is_hidden(player));
    }

    #[test]
    fn test_flash_starts_at_contact_time() {
        let mut session = running_session();
        session.advance_to(3.0);
        let body = session.obstacles().next().unwrap().body;
        let player = session.engine().player();

        // Engine still at t=0 when the contact arrives
        session.on_contact(player, body, 3.5);
        session.engine_mut().step(3.55);
        assert!(session.engine().is_hidden(player));
    }

    #[test]
    fn test_penalty_never_below_zero() {
        let mut session = running_session();
        session.advance_to(3.0);
        let body = session.obstacles().next().unwrap().body;
        let player = session.engine().player();
        session.on_contact(player, body, 3.5);
        assert_eq!(session.score(), 0);
        assert!(session.drain_events().contains(&SessionEvent::ScoreChanged { score: 0, delta: 0 }));
    }

    #[test]
    fn test_session_ends_once_after_duration() {
        let mut session = running_session();
        session.advance_to(59.5);
        assert_eq!(session.phase(), SessionPhase::Running);
        session.advance_to(60.0);
        assert_eq!(session.phase(), SessionPhase::Ended);
        session.advance_to(90.0);

        let ended: Vec<_> = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Ended { .. }))
            .collect();
        assert_eq!(ended, vec![SessionEvent::Ended { final_score: 0, at: 60.0 }]);
        assert_eq!(session.obstacles().count(), 0);
    }

    #[test]
    fn test_no_score_writes_after_end() {
        let mut session = running_session();
        session.advance_to(57.0);
        let obstacle = session.obstacles().last().unwrap().clone();
        assert_eq!(session.end_session(58.0), 0);

        let player = session.engine().player();
        session.on_contact(player, obstacle.body, 58.5);
        session.on_animation_finished(obstacle.traversal, 61.0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.end_session(62.0), 0);
        assert!(session.on_sample(OrientationSample::new(0.0, 25.0, 0.0), 62.0).is_none());
    }

    #[test]
    fn test_end_session_reports_current_score() {
        let mut session = running_session();
        session.score.award(16);
        assert_eq!(session.end_session(10.0), 16);
        assert_eq!(session.summary().final_score, 16);
        assert_eq!(session.summary().elapsed, 10.0);
    }

    #[test]
    fn test_sensor_pitch_flipped() {
        let mut session = running_session();
        assert_eq!(session.on_orientation(0.0, -25.0, 0.0, 1.0), Some(Action::Jump));
    }
}
