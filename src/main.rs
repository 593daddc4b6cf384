//! Maze Chase headless runner
//!
//! Loads settings, lets a seeded autopilot play for a fixed number of ticks
//! and prints a JSON summary of the run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use maze_chase::consts::TICKS_PER_SECOND;
use maze_chase::sim::{Autopilot, GameEvent, GamePhase, GameState, GhostState, GhostView, tick};
use maze_chase::{ConfigError, Settings};

#[derive(Debug, Parser)]
#[command(name = "maze-chase", about = "Run the maze-chase simulation headless")]
struct Cli {
    /// Settings file (JSON); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the simulation seed
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Write the effective settings to this file and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    seconds: f64,
    phase: Option<GamePhase>,
    score: u32,
    pellets_eaten: u32,
    power_pellets_eaten: u32,
    ghosts_captured: u32,
    state_changes: u32,
    pellets_remaining: usize,
    /// Fright window still running when the run stopped
    fright_active: bool,
    frightened_ghosts: usize,
    ghosts: Vec<GhostView>,
}

impl RunSummary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PelletEaten { points, .. } => {
                self.pellets_eaten += 1;
                self.score += points;
            }
            GameEvent::PowerPelletEaten { points, .. } => {
                self.power_pellets_eaten += 1;
                self.score += points;
            }
            GameEvent::GhostCaptured { points, .. } => {
                self.ghosts_captured += 1;
                self.score += points;
            }
            GameEvent::GhostStateChanged { .. } => self.state_changes += 1,
            GameEvent::FrightEnded { .. }
            | GameEvent::PlayerCaught { .. }
            | GameEvent::BoardCleared => {}
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = match &cli.config {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            Settings::load(path)?
        }
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    Ok(settings)
}

fn run(cli: &Cli) -> Result<(), ConfigError> {
    let settings = load_settings(cli)?;

    if cli.dump_config {
        settings.validate()?;
        println!("{}", settings.to_json()?);
        return Ok(());
    }

    if let Some(path) = &cli.write_config {
        settings.validate()?;
        settings.save(path)?;
        return Ok(());
    }

    let seed = settings.seed;
    let mut state = GameState::new(settings)?;
    // Separate stream so the player's wandering never perturbs ghost choices
    let mut pilot = Autopilot::new(seed.wrapping_add(1));
    let mut summary = RunSummary {
        seed,
        ..Default::default()
    };

    log::info!("Maze Chase starting: {} ticks, seed {}", cli.ticks, seed);

    while state.time_ticks < cli.ticks && state.phase == GamePhase::Playing {
        let input = pilot.steer(&state);
        for event in tick(&mut state, &input) {
            log::debug!("tick {}: {:?}", state.time_ticks, event);
            summary.record(&event);
        }
    }

    summary.ticks = state.time_ticks;
    summary.seconds = state.time_ticks as f64 / f64::from(TICKS_PER_SECOND);
    summary.phase = Some(state.phase);
    summary.pellets_remaining = state.pellets_remaining();
    summary.fright_active = state.fright.is_active();
    summary.frightened_ghosts = state.ghosts_in(GhostState::Frightened);
    summary.ghosts = state.ghost_views();

    let json = serde_json::to_string_pretty(&summary)?;
    println!("{json}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
