//! Ghost heading selection
//!
//! Ghosts do not chase the player's position. They wander the maze
//! semi-randomly: keep going straight most of the time, turn at random
//! junctions, and only reverse at dead ends.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, WallOracle};
use crate::consts::{STRAIGHT_BIAS, TILE_SIZE};
use crate::is_multiple_of;

/// Cardinal direction in screen space (+y is down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    /// Fixed scan order for every heading search
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Right => IVec2::X,
            Direction::Left => IVec2::NEG_X,
            Direction::Down => IVec2::Y,
            Direction::Up => IVec2::NEG_Y,
        }
    }

    #[inline]
    pub fn vector(self) -> Vec2 {
        self.delta().as_vec2()
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }
}

/// (dx, dy) for an optional heading; zero when idle
pub fn heading_delta(heading: Option<Direction>) -> IVec2 {
    heading.map(Direction::delta).unwrap_or(IVec2::ZERO)
}

/// Position lies exactly on the tile lattice on both axes
pub fn is_grid_aligned(pos: Vec2) -> bool {
    is_multiple_of(pos.x, TILE_SIZE) && is_multiple_of(pos.y, TILE_SIZE)
}

/// Tunable part of the heading heuristic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionPolicy {
    /// Probability of keeping the current heading when it is open
    pub straight_bias: f64,
}

impl Default for DirectionPolicy {
    fn default() -> Self {
        Self {
            straight_bias: STRAIGHT_BIAS,
        }
    }
}

impl DirectionPolicy {
    pub fn new(straight_bias: f64) -> Self {
        Self {
            straight_bias: straight_bias.clamp(0.0, 1.0),
        }
    }

    /// Pick the next heading for a ghost box.
    ///
    /// Off the tile lattice no real choice is made: the current heading is
    /// kept while one more `step_len` stays clear, otherwise the first clear
    /// direction in scan order is taken.
    pub fn choose<O, R>(
        &self,
        aabb: &Aabb,
        heading: Option<Direction>,
        step_len: f32,
        oracle: &O,
        rng: &mut R,
    ) -> Option<Direction>
    where
        O: WallOracle + ?Sized,
        R: Rng + ?Sized,
    {
        if is_grid_aligned(aabb.pos) {
            self.choose_at_junction(aabb, heading, oracle, rng)
        } else {
            choose_off_lattice(aabb, heading, step_len, oracle)
        }
    }

    fn choose_at_junction<O, R>(
        &self,
        aabb: &Aabb,
        heading: Option<Direction>,
        oracle: &O,
        rng: &mut R,
    ) -> Option<Direction>
    where
        O: WallOracle + ?Sized,
        R: Rng + ?Sized,
    {
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|dir| !oracle.collides(&aabb.translated(dir.vector() * TILE_SIZE)))
            .collect();

        // Boxed in: reverse unconditionally
        if open.is_empty() {
            return heading.map(Direction::reverse);
        }

        let reverse = heading.map(Direction::reverse);
        let forward: Vec<Direction> = open
            .iter()
            .copied()
            .filter(|&dir| Some(dir) != reverse)
            .collect();

        if let Some(current) = heading {
            if forward.contains(&current) && rng.random_bool(self.straight_bias) {
                return Some(current);
            }
        }

        if !forward.is_empty() {
            return Some(forward[rng.random_range(0..forward.len())]);
        }

        // Dead end: the reversal is the only open direction
        Some(open[rng.random_range(0..open.len())])
    }
}

fn choose_off_lattice<O>(
    aabb: &Aabb,
    heading: Option<Direction>,
    step_len: f32,
    oracle: &O,
) -> Option<Direction>
where
    O: WallOracle + ?Sized,
{
    let clear = |dir: Direction| !oracle.collides(&aabb.translated(dir.vector() * step_len));

    if let Some(current) = heading.filter(|&dir| clear(dir)) {
        return Some(current);
    }

    Direction::ALL
        .into_iter()
        .find(|&dir| clear(dir))
        .or_else(|| heading.map(Direction::reverse))
}
