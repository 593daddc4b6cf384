//! Box translation against the wall oracle
//!
//! Two movement rules share the same collision primitive:
//! - `slide`: per-axis movement that stops flush against walls (player)
//! - `step`: all-or-nothing movement that rejects a colliding step (ghosts)
//!
//! `wrap_tunnel` runs after either of them every tick.

use glam::Vec2;

use super::collision::{Aabb, WallOracle};
use super::grid::Grid;
use crate::consts::TILE_SIZE;
use crate::snap;

/// Move each axis independently, clamping to the wall boundary on the side
/// of motion. Produces sliding along corridors.
pub fn slide<O: WallOracle + ?Sized>(aabb: Aabb, delta: Vec2, oracle: &O) -> Aabb {
    let mut moved = aabb;

    if delta.x != 0.0 {
        moved.pos.x = snap(moved.pos.x + delta.x);
        if oracle.collides(&moved) {
            moved.pos.x = if delta.x > 0.0 {
                let leading_col = (moved.right() / TILE_SIZE).ceil() - 1.0;
                leading_col * TILE_SIZE - moved.size.x
            } else {
                let leading_col = (moved.pos.x / TILE_SIZE).floor();
                (leading_col + 1.0) * TILE_SIZE
            };
        }
    }

    if delta.y != 0.0 {
        moved.pos.y = snap(moved.pos.y + delta.y);
        if oracle.collides(&moved) {
            moved.pos.y = if delta.y > 0.0 {
                let leading_row = (moved.bottom() / TILE_SIZE).ceil() - 1.0;
                leading_row * TILE_SIZE - moved.size.y
            } else {
                let leading_row = (moved.pos.y / TILE_SIZE).floor();
                (leading_row + 1.0) * TILE_SIZE
            };
        }
    }

    moved
}

/// Apply the whole step, or nothing if the result would overlap a wall
pub fn step<O: WallOracle + ?Sized>(aabb: Aabb, delta: Vec2, oracle: &O) -> Option<Aabb> {
    let moved = Aabb {
        pos: Vec2::new(snap(aabb.pos.x + delta.x), snap(aabb.pos.y + delta.y)),
        size: aabb.size,
    };
    (!oracle.collides(&moved)).then_some(moved)
}

/// Horizontal edge wrapping inside the tunnel bands.
///
/// A box whose centre lies strictly inside a band and past the left edge
/// reappears centred on the right edge, and vice versa. Vertical position
/// is untouched.
pub fn wrap_tunnel(aabb: Aabb, grid: &Grid) -> Aabb {
    let center = aabb.center();
    let in_band = grid
        .tunnel_bands()
        .any(|(top, bottom)| center.y > top && center.y < bottom);
    if !in_band {
        return aabb;
    }

    let width = grid.world_width();
    let new_center_x = if center.x < 0.0 {
        width
    } else if center.x > width {
        0.0
    } else {
        return aabb;
    };

    Aabb {
        pos: Vec2::new(snap(new_center_x - aabb.size.x / 2.0), aabb.pos.y),
        size: aabb.size,
    }
}
