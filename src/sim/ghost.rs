//! Ghost lifecycle state machine
//!
//! `Waiting -> ExitingHouse -> Active <-> Frightened -> Eaten -> Waiting`
//!
//! Each state has its own update function; `Ghost::update` is the single
//! driver that dispatches on the current state. A ghost only reads the
//! static grid and its own fields, so ghosts can be updated in any order.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::direction::{Direction, DirectionPolicy, heading_delta};
use super::grid::Grid;
use super::mover;
use crate::consts::{GHOST_SIZE, TILE_SIZE};
use crate::settings::{GhostSpawn, Rgb};
use crate::snap;

/// Lifecycle state of a ghost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostState {
    /// Inert in the pen until the spawn delay has passed
    Waiting,
    /// Travelling to the exit waypoint
    ExitingHouse,
    /// Roaming the maze; deadly to the player
    Active,
    /// Roaming at reduced speed; can be eaten
    Frightened,
    /// Returning to the pen after capture
    Eaten,
}

impl GhostState {
    /// States that move under the heading policy
    pub fn is_roaming(self) -> bool {
        matches!(self, GhostState::Active | GhostState::Frightened)
    }
}

/// Read-only inputs shared by every ghost during one tick
#[derive(Debug, Clone, Copy)]
pub struct GhostContext<'a> {
    /// Global tick counter
    pub time_ticks: u64,
    pub grid: &'a Grid,
    pub policy: DirectionPolicy,
    /// Top-left of the box once a ghost has left the pen
    pub exit: Vec2,
    /// Top-left of the box where eaten ghosts recover
    pub pen: Vec2,
    pub frightened_speed_factor: f32,
    pub respawn_delay_ticks: u32,
    pub direction_change_interval: u32,
}

/// A ghost entity
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub id: u32,
    pub name: String,
    /// Identity colour, shown whenever the ghost is neither frightened nor eaten
    pub color: Rgb,
    pub aabb: Aabb,
    /// `None` only while waiting or boxed in. An eaten ghost keeps its last
    /// travel heading through pen recovery.
    pub heading: Option<Direction>,
    /// Units per tick at full speed
    pub speed: f32,
    pub spawn_delay: u32,
    pub state: GhostState,
    /// Ticks since the last periodic heading reconsideration
    pub direction_timer: u32,
    /// Ticks spent in the pen after an eaten ghost arrives
    pub recovery_ticks: u32,
}

/// Snapshot handed to the renderer/arena each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostView {
    pub id: u32,
    pub name: String,
    pub pos: Vec2,
    pub heading: IVec2,
    pub state: GhostState,
    pub color: Rgb,
}

impl Ghost {
    pub fn new(id: u32, spawn: &GhostSpawn, speed: f32) -> Self {
        Self {
            id,
            name: spawn.name.clone(),
            color: spawn.color,
            aabb: Aabb::square(spawn.tile.origin(), GHOST_SIZE),
            heading: None,
            speed,
            spawn_delay: spawn.spawn_delay,
            state: GhostState::Waiting,
            direction_timer: 0,
            recovery_ticks: 0,
        }
    }

    /// Advance one tick. Returns the previous state if it changed.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        ctx: &GhostContext<'_>,
        rng: &mut R,
    ) -> Option<GhostState> {
        let before = self.state;
        match self.state {
            GhostState::Waiting => self.update_waiting(ctx),
            GhostState::ExitingHouse => self.update_exiting(ctx, rng),
            GhostState::Active => self.update_roaming(ctx, self.speed, rng),
            GhostState::Frightened => {
                let speed = self.speed * ctx.frightened_speed_factor;
                self.update_roaming(ctx, speed, rng)
            }
            GhostState::Eaten => self.update_eaten(ctx),
        }

        if self.state == before {
            return None;
        }
        log::debug!(
            "{} {:?} -> {:?} at tick {}",
            self.name,
            before,
            self.state,
            ctx.time_ticks
        );
        Some(before)
    }

    fn update_waiting(&mut self, ctx: &GhostContext<'_>) {
        self.heading = None;
        if ctx.time_ticks >= u64::from(self.spawn_delay) {
            self.state = GhostState::ExitingHouse;
        }
    }

    fn update_exiting<R: Rng + ?Sized>(&mut self, ctx: &GhostContext<'_>, rng: &mut R) {
        if self.travel_toward(ctx.exit) {
            self.state = GhostState::Active;
            self.direction_timer = 0;
            self.heading = ctx
                .policy
                .choose(&self.aabb, self.heading, self.speed, ctx.grid, rng);
        }
    }

    /// Shared by Active and Frightened; only the speed differs
    fn update_roaming<R: Rng + ?Sized>(&mut self, ctx: &GhostContext<'_>, speed: f32, rng: &mut R) {
        self.direction_timer += 1;

        let step_len = stride(self.aabb.pos, self.heading, speed);
        let delta = heading_delta(self.heading).as_vec2() * step_len;
        match mover::step(self.aabb, delta, ctx.grid) {
            Some(moved) => self.aabb = mover::wrap_tunnel(moved, ctx.grid),
            None => {
                self.heading = ctx
                    .policy
                    .choose(&self.aabb, self.heading, speed, ctx.grid, rng);
            }
        }

        if self.direction_timer >= ctx.direction_change_interval {
            self.direction_timer = 0;
            self.heading = ctx
                .policy
                .choose(&self.aabb, self.heading, speed, ctx.grid, rng);
        }
    }

    fn update_eaten(&mut self, ctx: &GhostContext<'_>) {
        if self.aabb.pos != ctx.pen {
            self.travel_toward(ctx.pen);
            return;
        }

        self.recovery_ticks += 1;
        if self.recovery_ticks >= ctx.respawn_delay_ticks {
            self.recovery_ticks = 0;
            self.state = GhostState::Waiting;
        }
    }

    /// Straight-line waypoint travel: align horizontally first, then
    /// vertically. Returns true once the box sits exactly on `target`.
    fn travel_toward(&mut self, target: Vec2) -> bool {
        let pos = self.aabb.pos;
        if pos.x != target.x {
            let dx = (target.x - pos.x).clamp(-self.speed, self.speed);
            self.aabb.pos.x = snap(pos.x + dx);
            self.heading = Some(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            });
        } else if pos.y != target.y {
            let dy = (target.y - pos.y).clamp(-self.speed, self.speed);
            self.aabb.pos.y = snap(pos.y + dy);
            self.heading = Some(if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            });
        }
        self.aabb.pos == target
    }

    /// Power pellet response. Only Active ghosts are affected.
    pub fn frighten(&mut self) -> bool {
        if self.state == GhostState::Active {
            self.state = GhostState::Frightened;
            true
        } else {
            false
        }
    }

    /// Fright window expiry. Only Frightened ghosts are affected.
    pub fn calm(&mut self) -> bool {
        if self.state == GhostState::Frightened {
            self.state = GhostState::Active;
            true
        } else {
            false
        }
    }

    /// Caught by the player while frightened: jump straight to `reset`
    pub fn capture(&mut self, reset: Vec2) {
        self.state = GhostState::Eaten;
        self.aabb.pos = reset;
        self.direction_timer = 0;
        self.recovery_ticks = 0;
    }

    /// Colour the renderer should draw
    pub fn display_color(&self) -> Rgb {
        match self.state {
            GhostState::Frightened => Rgb::FRIGHTENED,
            GhostState::Eaten => Rgb::EATEN,
            _ => self.color,
        }
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            id: self.id,
            name: self.name.clone(),
            pos: self.aabb.pos,
            heading: heading_delta(self.heading),
            state: self.state,
            color: self.display_color(),
        }
    }
}

/// Step length for this tick, shortened so the box never skips past the next
/// tile boundary along its heading
fn stride(pos: Vec2, heading: Option<Direction>, speed: f32) -> f32 {
    let (coord, forward) = match heading {
        Some(Direction::Right) => (pos.x, true),
        Some(Direction::Left) => (pos.x, false),
        Some(Direction::Down) => (pos.y, true),
        Some(Direction::Up) => (pos.y, false),
        None => return speed,
    };
    let offset = coord.rem_euclid(TILE_SIZE);
    let to_boundary = match (offset == 0.0, forward) {
        (true, _) => TILE_SIZE,
        (false, true) => TILE_SIZE - offset,
        (false, false) => offset,
    };
    speed.min(to_boundary)
}
