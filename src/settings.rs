//! Maze layout, ghost roster and tuning
//!
//! Loaded from JSON (or taken from the built-in defaults) and validated once
//! before a game starts. A settings value that passes `validate` can never
//! stall a ghost at runtime.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::collision::{Aabb, WallOracle};
use crate::sim::grid::{Grid, LayoutError, tile_origin};

/// Built-in 20x15 maze. Rows 4 and 10 are open at both edges for the tunnels;
/// the pen is the open pocket in rows 6-7.
pub const DEFAULT_LAYOUT: [&str; 15] = [
    "wwwwwwwwwwwwwwwwwwww",
    "wP.......ww.......Pw",
    "w.ww.www.ww.www.ww.w",
    "w..................w",
    "....ww.w.ww.w.ww....",
    "w.w....w....w....w.w",
    "w.w.ww.ww  ww.ww.w.w",
    "w...w..w    w..w...w",
    "w.w.w..wwwwww..w.w.w",
    "w.w..............w.w",
    "....ww.ww.ww.ww.....",
    "w.ww.w........w.ww.w",
    "w.ww.w.wwwwww.w.ww.w",
    "wP.......ww.......Pw",
    "wwwwwwwwwwwwwwwwwwww",
];

/// Grid cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePos {
    pub col: usize,
    pub row: usize,
}

impl TilePos {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// World position of the tile's top-left corner
    pub fn origin(&self) -> Vec2 {
        tile_origin(self.col, self.row)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const CYAN: Rgb = Rgb(0, 255, 255);
    pub const PINK: Rgb = Rgb(255, 184, 255);
    pub const ORANGE: Rgb = Rgb(255, 184, 82);
    /// Every ghost while frightened
    pub const FRIGHTENED: Rgb = Rgb(0, 0, 255);
    /// Every ghost while eaten
    pub const EATEN: Rgb = Rgb(100, 100, 100);
}

/// One ghost in the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostSpawn {
    pub name: String,
    pub color: Rgb,
    /// Start tile inside the pen
    pub tile: TilePos,
    /// Ticks after game start before the ghost may leave the pen
    pub spawn_delay: u32,
}

impl GhostSpawn {
    pub fn new(name: &str, color: Rgb, tile: TilePos, spawn_delay: u32) -> Self {
        Self {
            name: name.to_string(),
            color,
            tile,
            spawn_delay,
        }
    }
}

/// Speeds, timers and heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ghost units per tick
    pub ghost_speed: f32,
    pub frightened_speed_factor: f32,
    /// Player units per tick
    pub player_speed: f32,
    pub fright_ticks: u32,
    pub respawn_delay_ticks: u32,
    pub direction_change_interval: u32,
    pub straight_bias: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ghost_speed: GHOST_SPEED,
            frightened_speed_factor: FRIGHTENED_SPEED_FACTOR,
            player_speed: PLAYER_SPEED,
            fright_ticks: FRIGHT_TICKS,
            respawn_delay_ticks: RESPAWN_DELAY_TICKS,
            direction_change_interval: DIRECTION_CHANGE_INTERVAL,
            straight_bias: STRAIGHT_BIAS,
        }
    }
}

impl Tuning {
    pub fn frightened_speed(&self) -> f32 {
        self.ghost_speed * self.frightened_speed_factor
    }
}

/// Settings problems found before a game starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("no ghosts configured")]
    NoGhosts,
    #[error("{what} tile {tile} is outside the grid")]
    OutOfBounds { what: String, tile: TilePos },
    #[error("{what} tile {tile} is inside a wall")]
    InsideWall { what: String, tile: TilePos },
    #[error("{what} {value} must be positive and evenly divide the tile size")]
    InvalidStep { what: &'static str, value: f32 },
    #[error("player speed {0} must be positive and at most one tile")]
    InvalidPlayerSpeed(f32),
    #[error("straight bias {0} is outside [0, 1]")]
    InvalidBias(f64),
    #[error("fright window must last at least one tick")]
    EmptyFrightWindow,
    #[error("{what} cannot travel from {from} to {to} without crossing a wall")]
    UnreachableWaypoint {
        what: String,
        from: TilePos,
        to: TilePos,
    },
}

/// Complete configuration for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for heading tie-breaks
    pub seed: u64,
    pub layout: Vec<String>,
    /// Rows that wrap horizontally
    pub tunnel_rows: Vec<usize>,
    pub player_start: TilePos,
    pub ghosts: Vec<GhostSpawn>,
    /// Where ghosts become active after leaving the pen
    pub exit_tile: TilePos,
    /// Where eaten ghosts wait before respawning
    pub pen_tile: TilePos,
    /// Where a ghost is dropped the instant it is eaten
    pub capture_reset_tile: TilePos,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            layout: DEFAULT_LAYOUT.iter().map(|row| row.to_string()).collect(),
            tunnel_rows: vec![4, 10],
            player_start: TilePos::new(9, 9),
            ghosts: vec![
                GhostSpawn::new("Blinky", Rgb::RED, TilePos::new(8, 7), 0),
                GhostSpawn::new(
                    "Inky",
                    Rgb::CYAN,
                    TilePos::new(9, 7),
                    3 * TICKS_PER_SECOND,
                ),
                GhostSpawn::new(
                    "Pinky",
                    Rgb::PINK,
                    TilePos::new(10, 7),
                    6 * TICKS_PER_SECOND,
                ),
                GhostSpawn::new(
                    "Clyde",
                    Rgb::ORANGE,
                    TilePos::new(11, 7),
                    9 * TICKS_PER_SECOND,
                ),
            ],
            exit_tile: TilePos::new(9, 5),
            pen_tile: TilePos::new(9, 7),
            capture_reset_tile: TilePos::new(9, 5),
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields take default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check everything that could make the simulation misbehave and
    /// return the parsed grid.
    pub fn validate(&self) -> Result<Grid, ConfigError> {
        let grid = Grid::parse(self.layout.as_slice())?.with_tunnels(&self.tunnel_rows)?;

        if self.ghosts.is_empty() {
            return Err(ConfigError::NoGhosts);
        }

        let tuning = &self.tuning;
        check_step("ghost speed", tuning.ghost_speed)?;
        check_step("frightened ghost speed", tuning.frightened_speed())?;
        if !(tuning.player_speed > 0.0 && tuning.player_speed <= TILE_SIZE) {
            return Err(ConfigError::InvalidPlayerSpeed(tuning.player_speed));
        }
        if !(0.0..=1.0).contains(&tuning.straight_bias) {
            return Err(ConfigError::InvalidBias(tuning.straight_bias));
        }
        if tuning.fright_ticks == 0 {
            return Err(ConfigError::EmptyFrightWindow);
        }

        check_open_tile(&grid, "player start", self.player_start)?;
        check_open_tile(&grid, "exit", self.exit_tile)?;
        check_open_tile(&grid, "pen", self.pen_tile)?;
        check_open_tile(&grid, "capture reset", self.capture_reset_tile)?;

        for ghost in &self.ghosts {
            check_open_tile(&grid, &ghost.name, ghost.tile)?;
            check_route(&grid, &ghost.name, ghost.tile, self.exit_tile)?;
        }
        check_route(&grid, "eaten ghost", self.capture_reset_tile, self.pen_tile)?;

        Ok(grid)
    }
}

fn check_step(what: &'static str, value: f32) -> Result<(), ConfigError> {
    let divides = value > 0.0
        && value <= TILE_SIZE
        && crate::snap(value) == value
        && (TILE_SIZE / value).fract() == 0.0;
    if divides {
        Ok(())
    } else {
        Err(ConfigError::InvalidStep { what, value })
    }
}

fn check_open_tile(grid: &Grid, what: &str, tile: TilePos) -> Result<(), ConfigError> {
    match grid.cell(tile.col, tile.row) {
        None => Err(ConfigError::OutOfBounds {
            what: what.to_string(),
            tile,
        }),
        Some(kind) if kind.is_wall() => Err(ConfigError::InsideWall {
            what: what.to_string(),
            tile,
        }),
        Some(_) => Ok(()),
    }
}

/// Waypoint travel goes horizontal first, then vertical, ignoring walls.
/// Both legs must therefore be wall-free for a ghost-sized box.
fn check_route(grid: &Grid, what: &str, from: TilePos, to: TilePos) -> Result<(), ConfigError> {
    let start = from.origin();
    let end = to.origin();
    let corner = Vec2::new(end.x, start.y);

    let clear = !grid.collides(&sweep(start, corner)) && !grid.collides(&sweep(corner, end));
    if clear {
        Ok(())
    } else {
        Err(ConfigError::UnreachableWaypoint {
            what: what.to_string(),
            from,
            to,
        })
    }
}

/// Box covering a ghost moving in a straight line from `a` to `b`
fn sweep(a: Vec2, b: Vec2) -> Aabb {
    let min = a.min(b);
    let max = a.max(b);
    Aabb::new(min, max - min + Vec2::splat(GHOST_SIZE))
}
