//! Fixed timestep simulation tick
//!
//! One call advances the whole arena by one frame. Order within a tick:
//! fright window, player, pellets, clock, ghosts (in id order), contact.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::ghost::GhostState;
use super::mover;
use super::state::{GamePhase, GameState, Pellet, PelletKind};
use crate::consts::GHOST_CAPTURE_POINTS;
use crate::settings::TilePos;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction key, if any
    pub direction: Option<Direction>,
}

/// Outbound signals for the scoring and rendering layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PelletEaten {
        tile: TilePos,
        points: u32,
    },
    PowerPelletEaten {
        tile: TilePos,
        points: u32,
        /// Ghosts that turned Frightened
        frightened: usize,
    },
    FrightEnded {
        /// Ghosts that turned Active again
        calmed: usize,
    },
    GhostStateChanged {
        ghost: u32,
        from: GhostState,
        to: GhostState,
    },
    GhostCaptured {
        ghost: u32,
        points: u32,
    },
    /// Player touched an Active ghost
    PlayerCaught {
        ghost: u32,
    },
    BoardCleared,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Nothing moves once the run has ended
    if state.phase != GamePhase::Playing {
        return events;
    }

    if state.fright.advance() {
        let mut calmed = 0;
        for ghost in &mut state.ghosts {
            if ghost.calm() {
                calmed += 1;
                events.push(GameEvent::GhostStateChanged {
                    ghost: ghost.id,
                    from: GhostState::Frightened,
                    to: GhostState::Active,
                });
            }
        }
        log::info!("Fright window closed: {} ghosts active again", calmed);
        events.push(GameEvent::FrightEnded { calmed });
    }

    move_player(state, input);
    eat_pellets(state, &mut events);

    state.time_ticks += 1;

    let ctx = GameState::ghost_context(&state.grid, &state.settings, state.time_ticks);
    for ghost in &mut state.ghosts {
        if let Some(from) = ghost.update(&ctx, &mut state.rng) {
            events.push(GameEvent::GhostStateChanged {
                ghost: ghost.id,
                from,
                to: ghost.state,
            });
        }
    }

    resolve_contacts(state, &mut events);

    if state.phase == GamePhase::Playing && state.pellets.is_empty() {
        log::info!("Board cleared at tick {}", state.time_ticks);
        state.phase = GamePhase::Cleared;
        events.push(GameEvent::BoardCleared);
    }

    events
}

fn move_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;
    if let Some(dir) = input.direction {
        player.facing = dir;
        player.aabb = mover::slide(player.aabb, dir.vector() * player.speed, &state.grid);
    }
    player.aabb = mover::wrap_tunnel(player.aabb, &state.grid);
}

fn eat_pellets(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player = state.player.aabb;
    let (eaten, remaining): (Vec<Pellet>, Vec<Pellet>) = std::mem::take(&mut state.pellets)
        .into_iter()
        .partition(|pellet| pellet.aabb.intersects(&player));
    state.pellets = remaining;

    for pellet in eaten {
        match pellet.kind {
            PelletKind::Normal => events.push(GameEvent::PelletEaten {
                tile: pellet.tile,
                points: pellet.points(),
            }),
            PelletKind::Power => {
                state.fright.trigger(state.settings.tuning.fright_ticks);
                let mut frightened = 0;
                for ghost in &mut state.ghosts {
                    if ghost.frighten() {
                        frightened += 1;
                        events.push(GameEvent::GhostStateChanged {
                            ghost: ghost.id,
                            from: GhostState::Active,
                            to: GhostState::Frightened,
                        });
                    }
                }
                log::info!(
                    "Power pellet at {}: {} ghosts frightened for {} ticks",
                    pellet.tile,
                    frightened,
                    state.fright.remaining()
                );
                events.push(GameEvent::PowerPelletEaten {
                    tile: pellet.tile,
                    points: pellet.points(),
                    frightened,
                });
            }
        }
    }
}

fn resolve_contacts(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let reset = state.capture_reset();
    let player = state.player.aabb;

    for ghost in &mut state.ghosts {
        if !ghost.aabb.intersects(&player) {
            continue;
        }
        match ghost.state {
            GhostState::Frightened => {
                ghost.capture(reset);
                log::info!("{} captured at tick {}", ghost.name, state.time_ticks);
                events.push(GameEvent::GhostStateChanged {
                    ghost: ghost.id,
                    from: GhostState::Frightened,
                    to: GhostState::Eaten,
                });
                events.push(GameEvent::GhostCaptured {
                    ghost: ghost.id,
                    points: GHOST_CAPTURE_POINTS,
                });
            }
            GhostState::Active => {
                log::info!("Caught by {} at tick {}", ghost.name, state.time_ticks);
                state.phase = GamePhase::GameOver;
                events.push(GameEvent::PlayerCaught { ghost: ghost.id });
            }
            _ => {}
        }
    }
}

/// Seeded wandering player for the headless runner (demo mode)
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    current: Option<Direction>,
    /// Ticks left before a voluntary turn
    hold_ticks: u32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: None,
            hold_ticks: 0,
        }
    }

    /// Keep walking the current way until blocked or bored, then pick an
    /// open direction at random
    pub fn steer(&mut self, state: &GameState) -> TickInput {
        let player = &state.player;
        let moves = |dir: Direction| {
            mover::slide(player.aabb, dir.vector() * player.speed, &state.grid) != player.aabb
        };

        let blocked = self.current.map_or(true, |dir| !moves(dir));
        if blocked || self.hold_ticks == 0 {
            let open: Vec<Direction> = Direction::ALL.into_iter().filter(|&d| moves(d)).collect();
            self.current = if open.is_empty() {
                None
            } else {
                Some(open[self.rng.random_range(0..open.len())])
            };
            self.hold_ticks = self.rng.random_range(20..90);
        } else {
            self.hold_ticks -= 1;
        }

        TickInput {
            direction: self.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_INSET;
    use crate::settings::Settings;
    use crate::sim::direction::is_grid_aligned;
    use crate::sim::ghost::Ghost;
    use glam::Vec2;
    use proptest::prelude::*;

    fn new_state() -> GameState {
        GameState::new(Settings::default()).unwrap()
    }

    fn place_player(state: &mut GameState, tile: TilePos) {
        state.player.aabb.pos = tile.origin() + Vec2::splat(PLAYER_INSET);
    }

    fn place_ghost(
        state: &mut GameState,
        index: usize,
        tile: TilePos,
        ghost_state: GhostState,
    ) -> &mut Ghost {
        let ghost = &mut state.ghosts[index];
        ghost.aabb.pos = tile.origin();
        ghost.state = ghost_state;
        ghost
    }

    /// Two Active ghosts in the top corridor, one Eaten, player on a power pellet
    fn fright_scenario() -> GameState {
        let mut state = new_state();
        let blinky = place_ghost(&mut state, 0, TilePos::new(2, 3), GhostState::Active);
        blinky.heading = Some(Direction::Right);
        let inky = place_ghost(&mut state, 1, TilePos::new(16, 3), GhostState::Active);
        inky.heading = Some(Direction::Left);
        let reset = state.capture_reset();
        state.ghosts[2].capture(reset);
        place_player(&mut state, TilePos::new(1, 13));
        state
    }

    #[test]
    fn test_power_pellet_frightens_only_active_ghosts() {
        let mut state = fright_scenario();
        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.ghosts[0].state, GhostState::Frightened);
        assert_eq!(state.ghosts[1].state, GhostState::Frightened);
        assert_eq!(state.ghosts[2].state, GhostState::Eaten);
        assert_eq!(state.ghosts[3].state, GhostState::Waiting);
        assert_eq!(state.fright.remaining(), 360);
        assert!(events.contains(&GameEvent::PowerPelletEaten {
            tile: TilePos::new(1, 13),
            points: 50,
            frightened: 2,
        }));
    }

    #[test]
    fn test_fright_window_expires_after_exactly_its_length() {
        let mut state = fright_scenario();
        tick(&mut state, &TickInput::default());

        for _ in 0..359 {
            let events = tick(&mut state, &TickInput::default());
            assert!(!events.iter().any(|e| matches!(e, GameEvent::FrightEnded { .. })));
        }
        assert_eq!(state.fright.remaining(), 1);
        assert_eq!(state.ghosts_in(GhostState::Frightened), 2);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.fright.remaining(), 0);
        assert_eq!(state.ghosts[0].state, GhostState::Active);
        assert_eq!(state.ghosts[1].state, GhostState::Active);
        assert_eq!(state.ghosts_in(GhostState::Frightened), 0);
        assert!(events.contains(&GameEvent::FrightEnded { calmed: 2 }));
    }

    #[test]
    fn test_second_power_pellet_restarts_window() {
        let mut state = fright_scenario();
        tick(&mut state, &TickInput::default());
        for _ in 0..100 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.fright.remaining(), 260);

        place_player(&mut state, TilePos::new(18, 13));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.fright.remaining(), 360);
        assert_eq!(state.ghosts_in(GhostState::Frightened), 2);
    }

    #[test]
    fn test_player_eats_frightened_ghost() {
        let mut state = new_state();
        place_ghost(&mut state, 0, TilePos::new(9, 9), GhostState::Frightened);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ghosts[0].state, GhostState::Eaten);
        assert_eq!(state.ghosts[0].aabb.pos, state.capture_reset());
        assert!(events.contains(&GameEvent::GhostCaptured {
            ghost: 0,
            points: 200
        }));
    }

    #[test]
    fn test_active_ghost_ends_the_game() {
        let mut state = new_state();
        place_ghost(&mut state, 0, TilePos::new(9, 9), GhostState::Active);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::PlayerCaught { ghost: 0 }));

        let ticks = state.time_ticks;
        assert!(tick(&mut state, &TickInput::default()).is_empty());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_player_eats_pellet_under_start() {
        let mut state = new_state();
        let before = state.pellets_remaining();
        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.pellets_remaining(), before - 1);
        assert!(events.contains(&GameEvent::PelletEaten {
            tile: TilePos::new(9, 9),
            points: 10
        }));
    }

    #[test]
    fn test_player_slides_and_faces_input() {
        let mut state = new_state();
        let start = state.player.aabb.pos;
        let input = TickInput {
            direction: Some(Direction::Left),
        };
        tick(&mut state, &input);
        assert_eq!(state.player.facing, Direction::Left);
        assert_eq!(state.player.aabb.pos, start - Vec2::new(2.0, 0.0));

        // Row 8 is solid above (9, 9): moving up stops flush at the tile top
        let input = TickInput {
            direction: Some(Direction::Up),
        };
        for _ in 0..5 {
            tick(&mut state, &input);
        }
        assert_eq!(state.player.aabb.pos.y, 360.0);
    }

    #[test]
    fn test_player_wraps_through_tunnel() {
        let mut state = new_state();
        // Row 4 is a tunnel row, open at both edges
        place_player(&mut state, TilePos::new(0, 4));
        let input = TickInput {
            direction: Some(Direction::Left),
        };

        let mut wrapped_at = None;
        for i in 1..=20 {
            tick(&mut state, &input);
            assert_eq!(state.player.aabb.pos.y, 165.0);
            if state.player.aabb.pos.x > 700.0 {
                wrapped_at = Some(i);
                break;
            }
        }
        // Centre crosses x < 0 on the eleventh step and reappears at the right edge
        assert_eq!(wrapped_at, Some(11));
        assert_eq!(state.player.aabb.center().x, state.grid.world_width());
    }

    #[test]
    fn test_ghost_wraps_through_tunnel_and_realigns() {
        let mut state = new_state();
        let blinky = place_ghost(&mut state, 0, TilePos::new(0, 4), GhostState::Active);
        blinky.heading = Some(Direction::Left);

        for _ in 0..21 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.ghosts[0].aabb.pos, Vec2::new(780.0, 160.0));

        for _ in 0..20 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.ghosts[0].aabb.pos, TilePos::new(19, 4).origin());
        assert!(is_grid_aligned(state.ghosts[0].aabb.pos));
        assert_eq!(state.ghosts[0].heading, Some(Direction::Left));
    }

    #[test]
    fn test_last_pellet_clears_the_board() {
        let mut state = new_state();
        let start = TilePos::new(9, 9);
        state.pellets.retain(|pellet| pellet.tile == start);
        assert_eq!(state.pellets_remaining(), 1);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Cleared);
        assert_eq!(state.pellets_remaining(), 0);
        assert_eq!(
            events,
            vec![
                GameEvent::PelletEaten {
                    tile: start,
                    points: 10
                },
                GameEvent::GhostStateChanged {
                    ghost: 0,
                    from: GhostState::Waiting,
                    to: GhostState::ExitingHouse,
                },
                GameEvent::BoardCleared,
            ]
        );

        let ticks = state.time_ticks;
        assert!(tick(&mut state, &TickInput::default()).is_empty());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_ghosts_leave_on_schedule() {
        let mut state = new_state();
        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.ghosts[0].state, GhostState::ExitingHouse);
        assert!(events.contains(&GameEvent::GhostStateChanged {
            ghost: 0,
            from: GhostState::Waiting,
            to: GhostState::ExitingHouse,
        }));

        while state.time_ticks < 179 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.ghosts[1].state, GhostState::Waiting);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ghosts[1].state, GhostState::ExitingHouse);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut settings = Settings::default();
        settings.seed = 99999;
        let mut state1 = GameState::new(settings.clone()).unwrap();
        let mut state2 = GameState::new(settings).unwrap();
        let mut pilot1 = Autopilot::new(7);
        let mut pilot2 = Autopilot::new(7);

        for _ in 0..2000 {
            let input1 = pilot1.steer(&state1);
            let input2 = pilot2.steer(&state2);
            assert_eq!(tick(&mut state1, &input1), tick(&mut state2, &input2));
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.ghost_views(), state2.ghost_views());
        assert_eq!(state1.player, state2.player);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_roaming_ghosts_turn_only_on_the_lattice(
            seed in any::<u64>(),
            pilot_seed in any::<u64>()
        ) {
            let mut settings = Settings::default();
            settings.seed = seed;
            let mut state = GameState::new(settings).unwrap();
            let mut pilot = Autopilot::new(pilot_seed);

            for _ in 0..2400 {
                let before: Vec<_> = state.ghosts.iter().map(|g| (g.state, g.heading)).collect();
                let input = pilot.steer(&state);
                tick(&mut state, &input);
                if state.phase != GamePhase::Playing {
                    break;
                }

                for (ghost, (prev_state, prev_heading)) in state.ghosts.iter().zip(before) {
                    if !ghost.state.is_roaming() {
                        continue;
                    }
                    // Roaming ghosts always have an axis-aligned heading
                    let delta = crate::sim::direction::heading_delta(ghost.heading);
                    prop_assert_eq!(delta.x.abs() + delta.y.abs(), 1);

                    if ghost.state == prev_state && ghost.heading != prev_heading {
                        prop_assert!(
                            is_grid_aligned(ghost.aabb.pos),
                            "{} turned off the lattice at {:?}",
                            ghost.name,
                            ghost.aabb.pos
                        );
                    }
                }
            }
        }
    }
}
