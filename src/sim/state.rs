//! Game state and core simulation types
//!
//! Every timer and every piece of mutable state lives in `GameState`, which
//! is handed to `tick`. There are no globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::direction::{Direction, DirectionPolicy};
use super::ghost::{Ghost, GhostContext, GhostState, GhostView};
use super::grid::{CellKind, Grid, tile_center};
use crate::consts::*;
use crate::settings::{ConfigError, Settings, TilePos};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Player touched an active ghost
    GameOver,
    /// Every pellet has been eaten
    Cleared,
}

/// The player's box and facing
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub aabb: Aabb,
    /// Render-only
    pub facing: Direction,
    pub speed: f32,
}

impl Player {
    /// Player box sits inset inside its start tile
    pub fn new(start: TilePos, speed: f32) -> Self {
        Self {
            aabb: Aabb::square(start.origin() + Vec2::splat(PLAYER_INSET), PLAYER_SIZE),
            facing: Direction::Right,
            speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PelletKind {
    Normal,
    Power,
}

/// A collectible, centred on its tile
#[derive(Debug, Clone, PartialEq)]
pub struct Pellet {
    pub tile: TilePos,
    pub kind: PelletKind,
    pub aabb: Aabb,
}

impl Pellet {
    pub fn new(tile: TilePos, kind: PelletKind) -> Self {
        let edge = match kind {
            PelletKind::Normal => PELLET_SIZE,
            PelletKind::Power => POWER_PELLET_SIZE,
        };
        Self {
            tile,
            kind,
            aabb: Aabb::centered(tile_center(tile.col, tile.row), edge),
        }
    }

    pub fn points(&self) -> u32 {
        match self.kind {
            PelletKind::Normal => PELLET_POINTS,
            PelletKind::Power => POWER_PELLET_POINTS,
        }
    }
}

/// Shared countdown during which ghosts are vulnerable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrightWindow {
    remaining: u32,
}

impl FrightWindow {
    /// Start (or restart) the window
    pub fn trigger(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Count down one tick. Returns true on the tick the window closes.
    pub fn advance(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

/// Complete simulation state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub grid: Grid,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub player: Player,
    /// Pellets still on the board
    pub pellets: Vec<Pellet>,
    /// Sorted by id
    pub ghosts: Vec<Ghost>,
    pub fright: FrightWindow,
    /// Heading tie-break randomness
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Validate the settings and lay out a fresh game
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let grid = settings.validate()?;

        let pellets: Vec<Pellet> = grid
            .cells()
            .filter_map(|(col, row, kind)| {
                let kind = match kind {
                    CellKind::Pellet => PelletKind::Normal,
                    CellKind::PowerPellet => PelletKind::Power,
                    _ => return None,
                };
                Some(Pellet::new(TilePos::new(col, row), kind))
            })
            .collect();

        let ghosts: Vec<Ghost> = settings
            .ghosts
            .iter()
            .enumerate()
            .map(|(i, spawn)| Ghost::new(i as u32, spawn, settings.tuning.ghost_speed))
            .collect();

        log::info!(
            "New game: {}x{} grid, {} pellets, {} ghosts, seed {}",
            grid.cols(),
            grid.rows(),
            pellets.len(),
            ghosts.len(),
            settings.seed
        );

        Ok(Self {
            player: Player::new(settings.player_start, settings.tuning.player_speed),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            grid,
            time_ticks: 0,
            phase: GamePhase::Playing,
            pellets,
            ghosts,
            fright: FrightWindow::default(),
        })
    }

    /// Per-tick ghost inputs, built from disjoint fields so callers can keep
    /// mutable borrows of the ghosts and the RNG alive alongside it.
    pub(crate) fn ghost_context<'a>(
        grid: &'a Grid,
        settings: &Settings,
        time_ticks: u64,
    ) -> GhostContext<'a> {
        let tuning = &settings.tuning;
        GhostContext {
            time_ticks,
            grid,
            policy: DirectionPolicy::new(tuning.straight_bias),
            exit: settings.exit_tile.origin(),
            pen: settings.pen_tile.origin(),
            frightened_speed_factor: tuning.frightened_speed_factor,
            respawn_delay_ticks: tuning.respawn_delay_ticks,
            direction_change_interval: tuning.direction_change_interval,
        }
    }

    /// Where a ghost is dropped the instant it is eaten
    pub fn capture_reset(&self) -> Vec2 {
        self.settings.capture_reset_tile.origin()
    }

    pub fn ghosts_in(&self, state: GhostState) -> usize {
        self.ghosts.iter().filter(|g| g.state == state).count()
    }

    pub fn ghost_views(&self) -> Vec<GhostView> {
        self.ghosts.iter().map(Ghost::view).collect()
    }

    pub fn pellets_remaining(&self) -> usize {
        self.pellets.len()
    }
}
