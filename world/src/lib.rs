#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Chase.

mod actors;

use std::time::Duration;

use maze_chase_core::{
    Actor, Command, ConfigError, Event, GameStatus, GhostId, GhostMode, MazeData, WELCOME_BANNER,
};
use maze_chase_system_mode_timer::{ModeClock, ModeSchedule};
use maze_chase_system_movement::{
    advance, decision_tolerance, is_near_center, next_cell, snap_to_center,
};
use serde::{Deserialize, Serialize};

use actors::{Ghost, Player};

/// Tunable rules of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Durations and speeds scaled by level.
    pub schedule: ModeSchedule,
    /// Lives granted at the start of a game.
    pub initial_lives: u32,
    /// Delay before an eaten ghost reappears on its spawn, in milliseconds.
    pub respawn_delay_ms: u64,
    /// Pause after losing a life before actors move again, in milliseconds.
    pub respite_ms: u64,
    /// Player speed in tiles per second.
    pub player_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule: ModeSchedule::default(),
            initial_lives: 3,
            respawn_delay_ms: 3_000,
            respite_ms: 1_500,
            player_speed: 8.0,
        }
    }
}

/// Represents the authoritative Maze Chase world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    maze: MazeData,
    level: u32,
    score: u32,
    lives: u32,
    status: GameStatus,
    player: Player,
    ghosts: Vec<Ghost>,
    clock: ModeClock,
    respite: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world at the start of level one on the provided maze.
    pub fn new(maze: MazeData, config: Config) -> Result<Self, ConfigError> {
        if config.initial_lives == 0 {
            return Err(ConfigError::ZeroLives);
        }

        let clock = ModeClock::new(config.schedule.clone());
        let player = Player::spawn(&maze);
        let ghosts = Ghost::roster(&maze, clock.phase().mode());
        Ok(Self {
            banner: WELCOME_BANNER,
            lives: config.initial_lives,
            config,
            maze,
            level: 1,
            score: 0,
            status: GameStatus::Playing,
            player,
            ghosts,
            clock,
            respite: Duration::ZERO,
            tick_index: 0,
        })
    }

    fn ghost_mut(&mut self, ghost: GhostId) -> Option<&mut Ghost> {
        self.ghosts.iter_mut().find(|candidate| candidate.id == ghost)
    }

    fn speed_for(&self, mode: GhostMode) -> f32 {
        let schedule = &self.config.schedule;
        match mode {
            GhostMode::Scatter | GhostMode::Chase => schedule.ghost_speed(self.level),
            GhostMode::Frightened => schedule.frightened_speed(self.level),
            GhostMode::Eaten => schedule.eaten_speed,
        }
    }

    fn is_frozen(&self) -> bool {
        self.status != GameStatus::Playing || !self.respite.is_zero()
    }

    /// Puts every actor back on its spawn and restarts the mode clock.
    fn reset_round(&mut self, out_events: &mut Vec<Event>) {
        if self.clock.power_active() {
            out_events.push(Event::PowerModeEnded);
        }
        self.clock.reset(self.level);
        self.player = Player::spawn(&self.maze);
        self.ghosts = Ghost::roster(&self.maze, self.clock.phase().mode());
    }

    fn set_ghost_mode(ghost: &mut Ghost, mode: GhostMode, out_events: &mut Vec<Event>) {
        if ghost.mode == mode {
            return;
        }
        out_events.push(Event::GhostModeChanged {
            ghost: ghost.id,
            from: ghost.mode,
            to: mode,
        });
        ghost.mode = mode;
    }

    fn advance_timers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let tick = self.clock.advance(dt);

        if let Some(phase) = tick.phase_changed {
            tracing::debug!(?phase, level = self.level, "schedule phase changed");
            out_events.push(Event::PhaseChanged { phase });
            for ghost in &mut self.ghosts {
                if ghost.mode.follows_schedule() {
                    Self::set_ghost_mode(ghost, phase.mode(), out_events);
                }
            }
        }

        if tick.power_expired {
            for ghost in &mut self.ghosts {
                if ghost.mode == GhostMode::Frightened {
                    Self::set_ghost_mode(ghost, GhostMode::Chase, out_events);
                }
            }
            out_events.push(Event::PowerModeEnded);
        }

        for ghost in &mut self.ghosts {
            let Some(remaining) = ghost.respawn_in else {
                continue;
            };
            let remaining = remaining.saturating_sub(dt);
            if !remaining.is_zero() {
                ghost.respawn_in = Some(remaining);
                continue;
            }
            ghost.respawn(&self.maze, GhostMode::Eaten);
            Self::set_ghost_mode(ghost, GhostMode::Scatter, out_events);
            out_events.push(Event::GhostRespawned { ghost: ghost.id });
        }
    }

    fn advance_player(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let maze = &self.maze;
        let player = &mut self.player;
        let speed = self.config.player_speed;
        let cell = player.cell(maze);
        player.previous_cell = cell;

        if let Some(queued) = player.queued {
            let heading = player.kinematics.direction;
            let near_center =
                is_near_center(maze, player.kinematics.position, decision_tolerance(speed, dt));
            let open = next_cell(maze, cell, queued).is_some();
            if queued.is_horizontal() == heading.is_horizontal() {
                if open || !near_center {
                    player.kinematics.direction = queued;
                    player.queued = None;
                    player.moving = true;
                }
            } else if open && near_center {
                snap_to_center(maze, &mut player.kinematics);
                player.kinematics.direction = queued;
                player.queued = None;
                player.moving = true;
            }
        }

        if !player.moving {
            return;
        }

        let heading = player.kinematics.direction;
        let outcome = advance(maze, &mut player.kinematics, heading, speed, dt);
        if outcome.blocked {
            player.moving = false;
        }
        if outcome.tunneled {
            out_events.push(Event::Tunneled {
                actor: Actor::Player,
                from: outcome.from,
                to: outcome.to,
            });
        }
        if outcome.from != outcome.to {
            out_events.push(Event::PlayerMoved {
                from: outcome.from,
                to: outcome.to,
            });
        }
    }

    fn advance_ghosts(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let speeds: Vec<f32> = self
            .ghosts
            .iter()
            .map(|ghost| self.speed_for(ghost.mode))
            .collect();

        for (ghost, speed) in self.ghosts.iter_mut().zip(speeds) {
            ghost.previous_cell = ghost.cell(&self.maze);
            let heading = ghost.kinematics.direction;
            let outcome = advance(&self.maze, &mut ghost.kinematics, heading, speed, dt);
            if outcome.tunneled {
                out_events.push(Event::Tunneled {
                    actor: Actor::Ghost(ghost.id),
                    from: outcome.from,
                    to: outcome.to,
                });
            }
        }
    }

    fn check_cleared(&self, out_events: &mut Vec<Event>) {
        if self.maze.pickups_remaining() == 0 {
            tracing::debug!(level = self.level, score = self.score, "level cleared");
            out_events.push(Event::LevelCleared { level: self.level });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.status == GameStatus::GameOver && !matches!(command, Command::Restart { .. }) {
        return;
    }

    match command {
        Command::Tick { dt } => {
            if world.status != GameStatus::Playing {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            if !world.respite.is_zero() {
                world.respite = world.respite.saturating_sub(dt);
                return;
            }
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_timers(dt, out_events);
        }
        Command::SetNextDirection { direction } => {
            world.player.queued = direction;
        }
        Command::SteerGhost { ghost, direction } => {
            if world.is_frozen() {
                return;
            }
            let maze = &world.maze;
            let Some(state) = world.ghosts.iter_mut().find(|state| state.id == ghost) else {
                return;
            };
            snap_to_center(maze, &mut state.kinematics);
            let cell = state.cell(maze);
            state.kinematics.direction = direction;
            state.last_decision_tile = Some(cell);
            out_events.push(Event::GhostSteered {
                ghost,
                cell,
                direction,
            });
        }
        Command::AdvanceActors { dt } => {
            if world.is_frozen() {
                return;
            }
            world.advance_player(dt, out_events);
            world.advance_ghosts(dt, out_events);
        }
        Command::ConsumeDot { cell, points } => {
            if world.status != GameStatus::Playing || !world.maze.take_dot(cell) {
                return;
            }
            world.score = world.score.saturating_add(points);
            out_events.push(Event::DotConsumed {
                cell,
                score: world.score,
            });
            world.check_cleared(out_events);
        }
        Command::ConsumePowerPellet { cell, points } => {
            if world.status != GameStatus::Playing || !world.maze.take_power_pellet(cell) {
                return;
            }
            world.score = world.score.saturating_add(points);
            out_events.push(Event::PowerPelletConsumed {
                cell,
                score: world.score,
            });

            let duration = world.clock.activate_power();
            out_events.push(Event::PowerModeStarted { duration });
            for ghost in &mut world.ghosts {
                if ghost.mode != GhostMode::Eaten {
                    World::set_ghost_mode(ghost, GhostMode::Frightened, out_events);
                }
            }
            world.check_cleared(out_events);
        }
        Command::EatGhost { ghost, points } => {
            if world.is_frozen() {
                return;
            }
            let respawn_delay = Duration::from_millis(world.config.respawn_delay_ms);
            let Some(state) = world.ghost_mut(ghost) else {
                return;
            };
            if state.mode != GhostMode::Frightened {
                return;
            }
            World::set_ghost_mode(state, GhostMode::Eaten, out_events);
            state.respawn_in = Some(respawn_delay);
            state.last_decision_tile = None;
            world.score = world.score.saturating_add(points);
            out_events.push(Event::GhostEaten {
                ghost,
                points,
                score: world.score,
            });
        }
        Command::CatchPlayer { ghost } => {
            if world.is_frozen() {
                return;
            }
            let hunting = world
                .ghosts
                .iter()
                .any(|state| state.id == ghost && state.mode.follows_schedule());
            if !hunting {
                return;
            }

            world.lives = world.lives.saturating_sub(1);
            out_events.push(Event::LifeLost { lives: world.lives });
            if world.lives == 0 {
                tracing::debug!(score = world.score, level = world.level, "game over");
                world.status = GameStatus::GameOver;
                out_events.push(Event::GameOver { score: world.score });
                return;
            }

            tracing::debug!(lives = world.lives, ?ghost, "player caught");
            world.reset_round(out_events);
            world.respite = Duration::from_millis(world.config.respite_ms);
        }
        Command::Pause => {
            if world.status == GameStatus::Playing {
                world.status = GameStatus::Paused;
                out_events.push(Event::Paused);
            }
        }
        Command::Resume => {
            if world.status == GameStatus::Paused {
                world.status = GameStatus::Playing;
                out_events.push(Event::Resumed);
            }
        }
        Command::LoadLevel { level, maze } => {
            world.maze = *maze;
            world.level = level.max(1);
            world.respite = Duration::ZERO;
            world.reset_round(out_events);
            tracing::debug!(level = world.level, "level started");
            out_events.push(Event::LevelStarted { level: world.level });
        }
        Command::Restart { maze } => {
            world.maze = *maze;
            world.level = 1;
            world.score = 0;
            world.lives = world.config.initial_lives;
            world.status = GameStatus::Playing;
            world.respite = Duration::ZERO;
            world.clock.clear_power();
            world.reset_round(out_events);
            out_events.push(Event::Restarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Config, World};
    use maze_chase_core::{
        GameState, GameStatus, GhostView, MazeData, PlayerSnapshot, SchedulePhase,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures the game-wide counters.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        GameState {
            score: world.score,
            lives: world.lives,
            level: world.level,
            power_mode: world.clock.power_active(),
            power_mode_remaining: world.clock.power_remaining(),
            status: world.status,
        }
    }

    /// Provides read-only access to the current maze.
    #[must_use]
    pub fn maze(world: &World) -> &MazeData {
        &world.maze
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot(&world.maze)
    }

    /// Captures a read-only view of the ghosts roaming the maze.
    #[must_use]
    pub fn ghost_view(world: &World) -> GhostView {
        GhostView::from_snapshots(
            world
                .ghosts
                .iter()
                .map(|ghost| ghost.snapshot(&world.maze, world.speed_for(ghost.mode)))
                .collect(),
        )
    }

    /// Level currently being played.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Lifecycle status of the game.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Active scatter/chase phase.
    #[must_use]
    pub fn phase(world: &World) -> SchedulePhase {
        world.clock.phase()
    }

    /// Time left before actors move again after a lost life.
    #[must_use]
    pub fn respite_remaining(world: &World) -> Duration {
        world.respite
    }

    /// Number of ticks processed while playing.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }
}

/// Direct state manipulation for tests that need hand-placed actors.
#[cfg(any(test, feature = "scaffolding"))]
pub mod scaffolding {
    use maze_chase_core::{Direction, GhostId, GhostMode, TilePos};
    use maze_chase_system_movement::Kinematics;

    use super::World;

    /// Places the player at the center of `cell`, travelling along `direction`.
    pub fn place_player(world: &mut World, cell: TilePos, direction: Direction, moving: bool) {
        world.player.kinematics = Kinematics::at_center(&world.maze, cell, direction);
        world.player.previous_cell = cell;
        world.player.moving = moving;
        world.player.queued = None;
    }

    /// Places a ghost at the center of `cell`, heading along `direction`.
    pub fn place_ghost(world: &mut World, ghost: GhostId, cell: TilePos, direction: Direction) {
        let maze = &world.maze;
        if let Some(state) = world.ghosts.iter_mut().find(|state| state.id == ghost) {
            state.kinematics = Kinematics::at_center(maze, cell, direction);
            state.previous_cell = cell;
            state.last_decision_tile = None;
        }
    }

    /// Forces a ghost into `mode` without emitting events.
    pub fn set_ghost_mode(world: &mut World, ghost: GhostId, mode: GhostMode) {
        if let Some(state) = world.ghost_mut(ghost) {
            state.mode = mode;
        }
    }

    /// Removes every dot and pellet except the ones at `keep`.
    pub fn clear_pickups_except(world: &mut World, keep: &[TilePos]) {
        let cells: Vec<TilePos> = world.maze.open_cells().collect();
        for cell in cells {
            if keep.contains(&cell) {
                continue;
            }
            let _ = world.maze.take_dot(cell);
            let _ = world.maze.take_power_pellet(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{Direction, SchedulePhase, TilePos};

    const ROWS: [&str; 9] = [
        "#########",
        "#o.....o#",
        "#.##.##.#",
        "#.......#",
        "....G....",
        "#.#####.#",
        "#...P...#",
        "#o.....o#",
        "#########",
    ];

    fn world() -> World {
        let maze = MazeData::from_ascii(&ROWS).expect("valid maze");
        World::new(maze, Config::default()).expect("valid config")
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn new_world_starts_on_spawns() {
        let world = world();
        let state = query::game_state(&world);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.status, GameStatus::Playing);
        assert!(!state.power_mode);

        let player = query::player(&world);
        assert_eq!(player.cell, TilePos::new(4, 6));
        assert!(!player.moving);

        let ghosts = query::ghost_view(&world);
        assert_eq!(ghosts.len(), 4);
        assert!(ghosts
            .iter()
            .all(|ghost| ghost.cell == TilePos::new(4, 4) && ghost.mode == GhostMode::Scatter));
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn zero_lives_is_rejected() {
        let maze = MazeData::from_ascii(&ROWS).expect("valid maze");
        let config = Config {
            initial_lives: 0,
            ..Config::default()
        };
        assert_eq!(World::new(maze, config).err(), Some(ConfigError::ZeroLives));
    }

    #[test]
    fn queued_turn_waits_for_open_cell() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::SetNextDirection {
                direction: Some(Direction::Up),
            },
        );
        let _ = run(
            &mut world,
            Command::AdvanceActors {
                dt: Duration::from_millis(16),
            },
        );
        let player = query::player(&world);
        assert_eq!(player.queued, Some(Direction::Up));
        assert!(!player.moving);

        let _ = run(
            &mut world,
            Command::SetNextDirection {
                direction: Some(Direction::Right),
            },
        );
        let events = run(
            &mut world,
            Command::AdvanceActors {
                dt: Duration::from_millis(100),
            },
        );
        let player = query::player(&world);
        assert!(player.moving);
        assert_eq!(player.direction, Direction::Right);
        assert_eq!(player.cell, TilePos::new(5, 6));
        assert!(events.contains(&Event::PlayerMoved {
            from: TilePos::new(4, 6),
            to: TilePos::new(5, 6),
        }));
    }

    #[test]
    fn player_stops_at_wall() {
        let mut world = world();
        let _ = run(
            &mut world,
            Command::SetNextDirection {
                direction: Some(Direction::Left),
            },
        );
        for _ in 0..20 {
            let _ = run(
                &mut world,
                Command::AdvanceActors {
                    dt: Duration::from_millis(50),
                },
            );
        }
        let player = query::player(&world);
        assert_eq!(player.cell, TilePos::new(1, 6));
        assert_eq!(player.position, glam::Vec2::new(1.5, 6.5));
        assert!(!player.moving);
    }

    #[test]
    fn steering_snaps_and_records_decision() {
        let mut world = world();
        let ghost = GhostId::new(0);
        let events = run(
            &mut world,
            Command::SteerGhost {
                ghost,
                direction: Direction::Up,
            },
        );
        assert_eq!(
            events,
            vec![Event::GhostSteered {
                ghost,
                cell: TilePos::new(4, 4),
                direction: Direction::Up,
            }]
        );
        let snapshot = *query::ghost_view(&world).get(ghost).expect("ghost");
        assert_eq!(snapshot.direction, Direction::Up);
        assert_eq!(snapshot.last_decision_tile, Some(TilePos::new(4, 4)));
    }

    #[test]
    fn phase_flip_moves_scheduled_ghosts() {
        let mut world = world();
        let scatter = query::config(&world).schedule.scatter_duration(1);
        let events = run(&mut world, Command::Tick { dt: scatter });
        assert!(events.contains(&Event::PhaseChanged {
            phase: SchedulePhase::Chase
        }));
        assert_eq!(query::phase(&world), SchedulePhase::Chase);
        assert!(query::ghost_view(&world)
            .iter()
            .all(|ghost| ghost.mode == GhostMode::Chase));
    }

    #[test]
    fn power_pellet_frightens_until_expiry() {
        let mut world = world();
        let cell = TilePos::new(1, 1);
        let events = run(&mut world, Command::ConsumePowerPellet { cell, points: 50 });
        let duration = Duration::from_secs(8);
        assert!(events.contains(&Event::PowerModeStarted { duration }));
        assert_eq!(query::game_state(&world).score, 50);
        assert!(query::ghost_view(&world)
            .iter()
            .all(|ghost| ghost.mode == GhostMode::Frightened));

        let events = run(&mut world, Command::Tick { dt: duration });
        assert!(events.contains(&Event::PowerModeEnded));
        let state = query::game_state(&world);
        assert!(!state.power_mode);
        assert_eq!(state.power_mode_remaining, Duration::ZERO);
        assert!(query::ghost_view(&world)
            .iter()
            .all(|ghost| ghost.mode == GhostMode::Chase));
    }

    #[test]
    fn consuming_missing_pickup_changes_nothing() {
        let mut world = world();
        let events = run(
            &mut world,
            Command::ConsumeDot {
                cell: TilePos::new(4, 6),
                points: 10,
            },
        );
        assert!(events.is_empty());
        assert_eq!(query::game_state(&world).score, 0);
    }

    #[test]
    fn eaten_ghost_respawns_in_scatter() {
        let mut world = world();
        let ghost = GhostId::new(1);
        let _ = run(
            &mut world,
            Command::ConsumePowerPellet {
                cell: TilePos::new(7, 7),
                points: 50,
            },
        );
        scaffolding::place_ghost(&mut world, ghost, TilePos::new(6, 6), Direction::Left);
        let events = run(&mut world, Command::EatGhost { ghost, points: 200 });
        assert!(events.contains(&Event::GhostEaten {
            ghost,
            points: 200,
            score: 250,
        }));
        let snapshot = *query::ghost_view(&world).get(ghost).expect("ghost");
        assert_eq!(snapshot.mode, GhostMode::Eaten);
        assert_eq!(snapshot.respawn_in, Some(Duration::from_secs(3)));

        let events = run(&mut world, Command::Tick { dt: Duration::from_secs(3) });
        assert!(events.contains(&Event::GhostRespawned { ghost }));
        let snapshot = *query::ghost_view(&world).get(ghost).expect("ghost");
        assert_eq!(snapshot.mode, GhostMode::Scatter);
        assert_eq!(snapshot.cell, TilePos::new(4, 4));
        assert_eq!(snapshot.respawn_in, None);
    }

    #[test]
    fn catch_costs_a_life_and_freezes_actors() {
        let mut world = world();
        let events = run(&mut world, Command::CatchPlayer { ghost: GhostId::new(0) });
        assert_eq!(events, vec![Event::LifeLost { lives: 2 }]);
        assert_eq!(query::respite_remaining(&world), Duration::from_millis(1_500));

        let events = run(&mut world, Command::Tick { dt: Duration::from_millis(1_000) });
        assert!(events.is_empty());
        let _ = run(
            &mut world,
            Command::SetNextDirection {
                direction: Some(Direction::Right),
            },
        );
        let _ = run(
            &mut world,
            Command::AdvanceActors {
                dt: Duration::from_millis(100),
            },
        );
        assert!(!query::player(&world).moving);

        let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(500) });
        let events = run(&mut world, Command::Tick { dt: Duration::from_millis(16) });
        assert!(events.contains(&Event::TimeAdvanced {
            dt: Duration::from_millis(16)
        }));
    }

    #[test]
    fn contacts_are_ignored_during_the_respite() {
        let mut world = world();
        let _ = run(&mut world, Command::CatchPlayer { ghost: GhostId::new(0) });
        assert!(run(&mut world, Command::CatchPlayer { ghost: GhostId::new(1) }).is_empty());
        assert_eq!(query::game_state(&world).lives, 2);

        let ghost = GhostId::new(2);
        scaffolding::set_ghost_mode(&mut world, ghost, GhostMode::Frightened);
        assert!(run(&mut world, Command::EatGhost { ghost, points: 200 }).is_empty());
        assert_eq!(query::game_state(&world).score, 0);

        let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(1_500) });
        assert_eq!(
            run(&mut world, Command::CatchPlayer { ghost: GhostId::new(1) }),
            vec![Event::LifeLost { lives: 1 }]
        );
    }

    #[test]
    fn frightened_and_eaten_ghosts_cannot_catch() {
        let mut world = world();
        let ghost = GhostId::new(2);
        scaffolding::set_ghost_mode(&mut world, ghost, GhostMode::Frightened);
        assert!(run(&mut world, Command::CatchPlayer { ghost }).is_empty());
        scaffolding::set_ghost_mode(&mut world, ghost, GhostMode::Eaten);
        assert!(run(&mut world, Command::CatchPlayer { ghost }).is_empty());
        assert_eq!(query::game_state(&world).lives, 3);
    }

    #[test]
    fn game_over_ignores_gameplay_until_restart() {
        let mut world = world();
        for _ in 0..3 {
            let _ = run(&mut world, Command::CatchPlayer { ghost: GhostId::new(0) });
            let _ = run(&mut world, Command::Tick { dt: Duration::from_millis(1_500) });
        }
        let state = query::game_state(&world);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.lives, 0);

        assert!(run(&mut world, Command::CatchPlayer { ghost: GhostId::new(0) }).is_empty());
        assert!(run(&mut world, Command::Tick { dt: Duration::from_secs(1) }).is_empty());
        assert!(run(
            &mut world,
            Command::ConsumeDot {
                cell: TilePos::new(2, 1),
                points: 10
            }
        )
        .is_empty());
        assert!(run(&mut world, Command::Resume).is_empty());

        let maze = MazeData::from_ascii(&ROWS).expect("valid maze");
        let events = run(&mut world, Command::Restart { maze: Box::new(maze) });
        assert_eq!(events, vec![Event::Restarted]);
        let state = query::game_state(&world);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn pause_freezes_ticks() {
        let mut world = world();
        assert_eq!(run(&mut world, Command::Pause), vec![Event::Paused]);
        assert!(run(&mut world, Command::Pause).is_empty());
        assert!(run(&mut world, Command::Tick { dt: Duration::from_secs(1) }).is_empty());
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(run(&mut world, Command::Resume), vec![Event::Resumed]);
        assert!(!run(&mut world, Command::Tick { dt: Duration::from_secs(1) }).is_empty());
    }

    #[test]
    fn clearing_last_pickup_reports_level_cleared() {
        let mut world = world();
        let last = TilePos::new(2, 1);
        scaffolding::clear_pickups_except(&mut world, &[last]);
        let events = run(&mut world, Command::ConsumeDot { cell: last, points: 10 });
        assert!(events.contains(&Event::LevelCleared { level: 1 }));

        let maze = MazeData::from_ascii(&ROWS).expect("valid maze");
        let events = run(
            &mut world,
            Command::LoadLevel {
                level: 2,
                maze: Box::new(maze),
            },
        );
        assert_eq!(events, vec![Event::LevelStarted { level: 2 }]);
        assert_eq!(query::level(&world), 2);
        assert_eq!(query::game_state(&world).score, 10);
    }
}
