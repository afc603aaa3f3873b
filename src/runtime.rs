//! Command funnel onto the session's thread
//!
//! Camera and physics callbacks may run on their own threads. They never
//! touch the [`Session`]; they send a [`Command`] instead, and the thread
//! that owns the session applies queued commands in arrival order.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::engine::{Engine, EngineEvent};
use crate::sensor::{FaceObservation, sample_from_faces};
use crate::sim::{OrientationSample, Session};

/// Everything that can change game state, stamped with its time
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start { at: f64 },
    /// Head-local sample, pitch already positive up
    Orientation { sample: OrientationSample, at: f64 },
    /// Raw sensor degrees; pitch is flipped on the session side
    Sensor { roll: f32, pitch: f32, yaw: f32, at: f64 },
    /// Tracker output for one frame; the first confident face is used
    Faces { faces: Vec<FaceObservation>, at: f64 },
    Engine { event: EngineEvent, at: f64 },
    /// Let timers catch up without any other input
    Advance { to: f64 },
    End { at: f64 },
}

/// Cloneable sending side, one per producer thread
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Returns false once the session side has gone away
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn orientation(&self, sample: OrientationSample, at: f64) -> bool {
        self.send(Command::Orientation { sample, at })
    }

    pub fn faces(&self, faces: Vec<FaceObservation>, at: f64) -> bool {
        self.send(Command::Faces { faces, at })
    }

    pub fn engine_event(&self, event: EngineEvent, at: f64) -> bool {
        self.send(Command::Engine { event, at })
    }
}

/// Receiving side, owned by the session's thread
#[derive(Debug)]
pub struct CommandQueue {
    rx: Receiver<Command>,
}

/// Create a connected sender/queue pair
pub fn command_channel() -> (CommandSender, CommandQueue) {
    let (tx, rx) = mpsc::channel();
    (CommandSender { tx }, CommandQueue { rx })
}

impl CommandQueue {
    /// Apply every command queued so far; returns how many were applied
    pub fn drain_into<E: Engine>(&self, session: &mut Session<E>) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.rx.try_recv() {
            session.apply(command);
            applied += 1;
        }
        applied
    }

    /// Block until every sender is dropped, applying commands as they come
    pub fn run_until_closed<E: Engine>(&self, session: &mut Session<E>) -> usize {
        let mut applied = 0;
        for command in self.rx.iter() {
            session.apply(command);
            applied += 1;
        }
        applied
    }
}

impl<E: Engine> Session<E> {
    /// Apply one funnelled command
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start { at } => {
                self.start_session(at);
            }
            Command::Orientation { sample, at } => {
                self.on_sample(sample, at);
            }
            Command::Sensor { roll, pitch, yaw, at } => {
                self.on_orientation(roll, pitch, yaw, at);
            }
            Command::Faces { faces, at } => {
                self.on_sample(sample_from_faces(&faces), at);
            }
            Command::Engine { event, at } => self.on_engine_event(event, at),
            Command::Advance { to } => self.advance_to(to),
            Command::End { at } => {
                self.end_session(at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::engine::HeadlessEngine;
    use crate::sim::{Lane, SessionPhase};
    use std::thread;

    #[test]
    fn test_commands_from_other_threads_apply_in_order() {
        let (sender, queue) = command_channel();
        let mut session = Session::new(Tuning::default(), HeadlessEngine::new(), 9).unwrap();

        let camera = sender.clone();
        let handle = thread::spawn(move || {
            camera.send(Command::Start { at: 0.0 });
            camera.orientation(OrientationSample::new(-30.0, 0.0, 0.0), 0.5);
            // Inside the cooldown, dropped
            camera.orientation(OrientationSample::new(30.0, 0.0, 0.0), 0.55);
        });
        handle.join().unwrap();

        assert_eq!(queue.drain_into(&mut session), 3);
        assert_eq!(session.lane(), Lane::LEFT);
    }

    #[test]
    fn test_run_until_closed() {
        let (sender, queue) = command_channel();
        let mut session = Session::new(Tuning::default(), HeadlessEngine::new(), 9).unwrap();
        let handle = thread::spawn(move || {
            sender.send(Command::Start { at: 0.0 });
            sender.send(Command::Advance { to: 61.0 });
        });
        assert_eq!(queue.run_until_closed(&mut session), 2);
        handle.join().unwrap();
        assert_eq!(session.phase(), SessionPhase::Ended);
    }

    #[test]
    fn test_raw_camera_input_flipped_on_session_side() {
        let (sender, queue) = command_channel();
        let mut session = Session::new(Tuning::default(), HeadlessEngine::new(), 9).unwrap();

        let camera = sender.clone();
        let handle = thread::spawn(move || {
            camera.send(Command::Start { at: 0.0 });
            // Sensor pitch of -25 is a nod up
            camera.send(Command::Sensor {
                roll: 0.0,
                pitch: -25.0,
                yaw: 0.0,
                at: 0.5,
            });
        });
        handle.join().unwrap();
        queue.drain_into(&mut session);
        assert!(session.is_jumping());
    }

    #[test]
    fn test_faces_pick_first_confident() {
        let (sender, queue) = command_channel();
        let mut session = Session::new(Tuning::default(), HeadlessEngine::new(), 9).unwrap();
        sender.send(Command::Start { at: 0.0 });

        let faint = FaceObservation {
            confidence: 0.05,
            ..FaceObservation::from_degrees(40.0, 0.0, 0.0)
        };
        let clear = FaceObservation::from_degrees(-40.0, 0.0, 0.0);
        assert!(sender.faces(vec![faint, clear], 0.5));
        queue.drain_into(&mut session);
        assert_eq!(session.lane(), Lane::LEFT);

        // No face at all is the zero sample
        sender.faces(Vec::new(), 1.0);
        queue.drain_into(&mut session);
        assert_eq!(session.last_sample(), OrientationSample::ZERO);
    }

    #[test]
    fn test_send_fails_after_queue_dropped() {
        let (sender, queue) = command_channel();
        drop(queue);
        assert!(!sender.send(Command::Advance { to: 1.0 }));
    }
}
