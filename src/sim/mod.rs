//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by ghost ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod direction;
pub mod ghost;
pub mod grid;
pub mod mover;
pub mod state;
pub mod tick;

pub use collision::{Aabb, WallOracle};
pub use direction::{Direction, DirectionPolicy, heading_delta, is_grid_aligned};
pub use ghost::{Ghost, GhostContext, GhostState, GhostView};
pub use grid::{CellKind, Grid, LayoutError};
pub use mover::{slide, step, wrap_tunnel};
pub use state::{FrightWindow, GamePhase, GameState, Pellet, PelletKind, Player};
pub use tick::{Autopilot, GameEvent, TickInput, tick};
