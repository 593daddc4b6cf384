//! Collision detection against the wall grid
//!
//! Every mover asks one question: does this axis-aligned box overlap a wall
//! cell? The answer is recomputed per candidate move because boxes travel in
//! sub-tile increments.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use crate::consts::TILE_SIZE;

/// Axis-aligned box: top-left position plus a fixed, positive extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        debug_assert!(size.x > 0.0 && size.y > 0.0, "box extent must be positive");
        Self { pos, size }
    }

    pub fn square(pos: Vec2, edge: f32) -> Self {
        Self::new(pos, Vec2::splat(edge))
    }

    /// Box of the given edge centred on `center`
    pub fn centered(center: Vec2, edge: f32) -> Self {
        Self::square(center - Vec2::splat(edge / 2.0), edge)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Copy moved by `delta`
    #[inline]
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            pos: self.pos + delta,
            size: self.size,
        }
    }

    /// Strict overlap test. Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }

    /// Inclusive range of tile columns the box overlaps
    fn col_span(&self) -> (i32, i32) {
        tile_span(self.pos.x, self.right())
    }

    /// Inclusive range of tile rows the box overlaps
    fn row_span(&self) -> (i32, i32) {
        tile_span(self.pos.y, self.bottom())
    }
}

fn tile_span(start: f32, end: f32) -> (i32, i32) {
    let first = (start / TILE_SIZE).floor() as i32;
    let last = (end / TILE_SIZE).ceil() as i32 - 1;
    (first, last)
}

/// Read-only wall query used by every mover.
///
/// Callers depend only on this trait so the lookup strategy can change
/// without touching movement code.
pub trait WallOracle {
    /// True iff `aabb` overlaps any wall cell
    fn collides(&self, aabb: &Aabb) -> bool;
}

impl WallOracle for Grid {
    /// Only the cells under the box are visited, so cost scales with box
    /// size rather than grid size.
    fn collides(&self, aabb: &Aabb) -> bool {
        let (col_first, col_last) = aabb.col_span();
        let (row_first, row_last) = aabb.row_span();
        for row in row_first..=row_last {
            for col in col_first..=col_last {
                if self.is_wall(col, row) {
                    return true;
                }
            }
        }
        false
    }
}
