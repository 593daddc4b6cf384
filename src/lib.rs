//! Maze Chase - ghost pursuit/evasion core for a maze-chase arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid collision, movement, ghost state machine)
//! - `settings`: Data-driven layout, roster and tuning

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, GhostSpawn, Rgb, Settings, TilePos, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (one tick per rendered frame)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Edge length of one grid tile in world units
    pub const TILE_SIZE: f32 = 40.0;

    /// Smallest representable movement increment. Powers of two keep f32 sums exact.
    pub const MOVE_QUANTUM: f32 = 1.0 / 16.0;

    /// Ghost box fills a whole tile
    pub const GHOST_SIZE: f32 = TILE_SIZE;
    pub const GHOST_SPEED: f32 = 1.0;
    /// Frightened ghosts move at half speed
    pub const FRIGHTENED_SPEED_FACTOR: f32 = 0.5;

    /// Player box is smaller than a tile for collision forgiveness
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_INSET: f32 = (TILE_SIZE - PLAYER_SIZE) / 2.0;
    pub const PLAYER_SPEED: f32 = 2.0;

    pub const PELLET_SIZE: f32 = 10.0;
    pub const POWER_PELLET_SIZE: f32 = 20.0;

    /// Fright window after a power pellet (6 seconds)
    pub const FRIGHT_TICKS: u32 = 6 * TICKS_PER_SECOND;
    /// Delay in the pen before an eaten ghost waits again (3 seconds)
    pub const RESPAWN_DELAY_TICKS: u32 = 3 * TICKS_PER_SECOND;
    /// Periodic heading reconsideration (once per second)
    pub const DIRECTION_CHANGE_INTERVAL: u32 = TICKS_PER_SECOND;
    /// Chance of continuing straight when that is possible
    pub const STRAIGHT_BIAS: f64 = 0.8;

    /// Points carried on outbound events
    pub const PELLET_POINTS: u32 = 10;
    pub const POWER_PELLET_POINTS: u32 = 50;
    pub const GHOST_CAPTURE_POINTS: u32 = 200;
}

/// True if `value` is an exact multiple of `unit`
#[inline]
pub fn is_multiple_of(value: f32, unit: f32) -> bool {
    value.rem_euclid(unit) == 0.0
}

/// Round a coordinate to the movement quantum
#[inline]
pub fn snap(value: f32) -> f32 {
    (value / consts::MOVE_QUANTUM).round() * consts::MOVE_QUANTUM
}
