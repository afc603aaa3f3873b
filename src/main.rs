//! Tilt Runner entry point
//!
//! Plays one headless session: the autopilot head stands in for the camera
//! and the in-memory engine stands in for the scene, both feeding the
//! session through the command funnel at a fixed frame rate.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tilt_runner::consts::{TRACK_END_Z, TRACK_START_Z};
use tilt_runner::engine::HeadlessEngine;
use tilt_runner::runtime::{Command, command_channel};
use tilt_runner::sensor::Autopilot;
use tilt_runner::sim::{Session, SessionEvent, SessionPhase};
use tilt_runner::{Difficulty, SessionSummary, SettingsError, Tuning};

#[derive(Debug, Parser)]
#[command(name = "tilt-runner", about = "Play a headless head-gesture dodging session")]
struct Cli {
    /// Tuning JSON file (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective tuning to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// relaxed, standard or frantic (overrides the file's spawn timing)
    #[arg(long)]
    difficulty: Option<String>,

    /// Seed for obstacle lanes and the autopilot
    #[arg(long, default_value_t = 2024)]
    seed: u64,

    /// Simulated camera frame rate
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Autopilot reaction probability, 0..=1
    #[arg(long, default_value_t = 0.85)]
    skill: f64,

    /// Print the summary as JSON
    #[arg(long)]
    summary_json: bool,
}

fn load_tuning(cli: &Cli) -> Result<Tuning, SettingsError> {
    let mut tuning = match &cli.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    if let Some(name) = &cli.difficulty {
        let difficulty = Difficulty::from_str(name)
            .ok_or_else(|| SettingsError::Invalid(format!("unknown difficulty '{name}'")))?;
        tuning.apply_difficulty(difficulty);
    }
    if !(cli.fps > 0.0) {
        return Err(SettingsError::Invalid(format!("fps must be positive, got {}", cli.fps)));
    }
    tuning.validate()?;
    Ok(tuning)
}

fn play(tuning: Tuning, cli: &Cli) -> Result<SessionSummary, SettingsError> {
    let (sender, queue) = command_channel();
    let speed = (TRACK_END_Z - TRACK_START_Z) / tuning.obstacle_travel_duration as f32;
    let mut pilot = Autopilot::new(cli.seed.wrapping_add(1), cli.skill, speed);
    let deadline = tuning.session_duration + 1.0;
    let mut session = Session::new(tuning, HeadlessEngine::new(), cli.seed)?;

    sender.send(Command::Start { at: 0.0 });
    queue.drain_into(&mut session);

    let dt = 1.0 / cli.fps;
    let mut frame: u64 = 0;
    while session.phase() != SessionPhase::Ended {
        frame += 1;
        let now = frame as f64 * dt;

        for event in session.engine_mut().step(now) {
            sender.engine_event(event, now);
        }
        let face = pilot.observe(&session);
        sender.faces(vec![face], now);
        sender.send(Command::Advance { to: now });
        queue.drain_into(&mut session);

        for event in session.drain_events() {
            match event {
                SessionEvent::ScoreChanged { score, delta } => {
                    log::info!("t={now:5.2} score {score} ({delta:+})");
                }
                SessionEvent::Ended { final_score, at } => {
                    log::info!("Time's up at t={at:.1}, final score {final_score}");
                }
                other => log::trace!("{other:?}"),
            }
        }

        if now > deadline {
            log::warn!("Session did not end on time, stopping at t={now:.2}");
            sender.send(Command::End { at: now });
            queue.drain_into(&mut session);
        }
    }

    Ok(session.summary())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tuning = match load_tuning(&cli) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &cli.save_config {
        return match tuning.save(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    log::info!(
        "Tilt Runner starting ({} difficulty, seed {})",
        tuning.difficulty.as_str(),
        cli.seed
    );
    let summary = match play(tuning, &cli) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.summary_json {
        match summary.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to encode summary: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", summary.headline());
        println!("Total Score: {}", summary.final_score);
        println!(
            "Dodged {}/{} obstacles, hit {}, {} lane switches, {} jumps",
            summary.stats.dodged,
            summary.stats.spawned,
            summary.stats.hits,
            summary.stats.lane_switches,
            summary.stats.jumps
        );
    }
    ExitCode::SUCCESS
}
