#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session facade that drives the world and its systems.
//!
//! A session owns the authoritative world, the maze generator and the pure
//! systems. Each tick runs a fixed pipeline: timers, ghost decisions, actor
//! movement, pickups, contacts and finally the level transition. Adapters
//! observe coarse lifecycle changes through [`SessionEvent`] listeners and
//! read state through snapshot accessors.

use std::fmt;
use std::time::Duration;

use maze_chase_core::{
    Command, ConfigError, Direction, Event, GameState, GameStatus, GhostView, MazeData,
    PlayerSnapshot,
};
use maze_chase_system_collision::Collision;
use maze_chase_system_ghost_ai::{DecisionContext, GhostAi};
use maze_chase_system_maze_generation::{
    check_playable, GeneratorConfig, MazeGenerator, ValidationError,
};
use maze_chase_world::{self as world, query, Config, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest slice of simulated time processed in one pipeline pass.
pub const MAX_FRAME: Duration = Duration::from_millis(20);

const MAZE_STREAM: u64 = 0;
const GHOST_STREAM: u64 = 1;

/// Everything needed to start a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed of every random stream in the session.
    pub seed: u64,
    /// Maze dimensions and retry budget.
    pub generator: GeneratorConfig,
    /// Game rules.
    pub world: Config,
}

/// Reasons a session refuses to start.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Generator or game rules are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A supplied maze cannot be played to completion.
    #[error("maze is not playable: {0}")]
    UnplayableMaze(#[from] ValidationError),
}

/// Lifecycle notifications delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The last life was lost.
    GameOver {
        /// Final score.
        score: u32,
    },
    /// A cleared level was replaced by a freshly generated one.
    LevelAdvanced {
        /// Level now being played.
        level: u32,
    },
    /// The game was paused.
    Paused,
    /// The game was resumed.
    Resumed,
    /// A new game was started.
    Restarted,
}

impl SessionEvent {
    fn from_world(event: &Event) -> Option<Self> {
        match event {
            Event::GameOver { score } => Some(Self::GameOver { score: *score }),
            Event::LevelStarted { level } => Some(Self::LevelAdvanced { level: *level }),
            Event::Paused => Some(Self::Paused),
            Event::Resumed => Some(Self::Resumed),
            Event::Restarted => Some(Self::Restarted),
            _ => None,
        }
    }
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

/// A running game.
pub struct Session {
    world: World,
    generator: MazeGenerator,
    ghost_ai: GhostAi,
    collision: Collision,
    maze_rng: ChaCha8Rng,
    ghost_rng: ChaCha8Rng,
    seed: u64,
    elapsed: Duration,
    backlog: Vec<Event>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("seed", &self.seed)
            .field("elapsed", &self.elapsed)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Starts a session on a generated level-one maze.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let generator = MazeGenerator::new(config.generator)?;
        let mut maze_rng = stream(config.seed, MAZE_STREAM);
        let maze = generator.generate(1, &mut maze_rng);
        Self::assemble(maze, generator, maze_rng, config.seed, config.world)
    }

    /// Starts a session whose first level is played on `maze`.
    ///
    /// Later levels and restarts use generated mazes. The maze must be fully
    /// connected and hold at least one pickup.
    pub fn with_maze(maze: MazeData, config: SessionConfig) -> Result<Self, SessionError> {
        check_playable(&maze)?;
        let generator = MazeGenerator::new(config.generator)?;
        let maze_rng = stream(config.seed, MAZE_STREAM);
        Self::assemble(maze, generator, maze_rng, config.seed, config.world)
    }

    fn assemble(
        maze: MazeData,
        generator: MazeGenerator,
        maze_rng: ChaCha8Rng,
        seed: u64,
        rules: Config,
    ) -> Result<Self, SessionError> {
        let world = World::new(maze, rules)?;
        tracing::debug!(seed, "session started");
        Ok(Self {
            world,
            generator,
            ghost_ai: GhostAi::default(),
            collision: Collision::default(),
            maze_rng,
            ghost_rng: stream(seed, GHOST_STREAM),
            seed,
            elapsed: Duration::ZERO,
            backlog: Vec::new(),
            listeners: Vec::new(),
        })
    }

    /// Registers a listener for lifecycle notifications.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Advances the game by `dt` and returns every world event it produced.
    ///
    /// `time_elapsed` is the caller's clock and is only recorded. Long frames
    /// are split into passes of at most [`MAX_FRAME`]. Nothing happens unless
    /// the game is playing.
    pub fn tick(&mut self, time_elapsed: Duration, dt: Duration) -> Vec<Event> {
        self.elapsed = time_elapsed;
        let mut events = Vec::new();
        let mut remaining = dt;
        while !remaining.is_zero() && query::status(&self.world) == GameStatus::Playing {
            let frame = remaining.min(MAX_FRAME);
            remaining -= frame;
            self.step(frame, &mut events);
        }
        self.notify(&events);
        events
    }

    fn step(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut commands = Vec::new();
        let mut unobserved = std::mem::take(&mut self.backlog);

        let frame_start = out.len();
        world::apply(&mut self.world, Command::Tick { dt }, out);
        {
            let player = query::player(&self.world);
            let ghosts = query::ghost_view(&self.world);
            let context = DecisionContext {
                maze: query::maze(&self.world),
                player: &player,
                ghosts: &ghosts,
            };
            self.ghost_ai
                .handle(&out[frame_start..], &context, &mut self.ghost_rng, &mut commands);
        }
        commands.push(Command::AdvanceActors { dt });
        self.apply_all(&mut commands, out);
        unobserved.extend_from_slice(&out[frame_start..]);

        let player = query::player(&self.world);
        self.collision.handle_pickups(
            &unobserved,
            query::maze(&self.world),
            &player,
            &mut commands,
        );
        let pickups_start = out.len();
        self.apply_all(&mut commands, out);

        let player = query::player(&self.world);
        let ghosts = query::ghost_view(&self.world);
        self.collision
            .handle_contacts(&out[pickups_start..], &player, &ghosts, &mut commands);
        let contacts_start = out.len();
        self.apply_all(&mut commands, out);

        let cleared = out[pickups_start..contacts_start]
            .iter()
            .any(|event| matches!(event, Event::LevelCleared { .. }));
        if cleared {
            self.advance_level(out);
        }
        self.backlog.extend_from_slice(&out[contacts_start..]);
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, out: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, out);
        }
    }

    fn advance_level(&mut self, out: &mut Vec<Event>) {
        let level = query::level(&self.world).saturating_add(1);
        let maze = self.generator.generate(level, &mut self.maze_rng);
        tracing::debug!(level, score = query::game_state(&self.world).score, "advancing level");
        world::apply(
            &mut self.world,
            Command::LoadLevel {
                level,
                maze: Box::new(maze),
            },
            out,
        );
    }

    /// Applies a command outside the tick pipeline and notifies listeners.
    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.backlog.extend_from_slice(&events);
        self.notify(&events);
    }

    fn notify(&mut self, events: &[Event]) {
        for event in events.iter().filter_map(SessionEvent::from_world) {
            for listener in &mut self.listeners {
                listener(&event);
            }
        }
    }

    /// Queues the player's next heading; `None` clears the request.
    pub fn set_next_direction(&mut self, direction: Option<Direction>) {
        self.submit(Command::SetNextDirection { direction });
    }

    /// Freezes the game until [`Session::resume_game`].
    pub fn pause_game(&mut self) {
        self.submit(Command::Pause);
    }

    /// Continues a paused game where it stopped.
    pub fn resume_game(&mut self) {
        self.submit(Command::Resume);
    }

    /// Starts a new game at level one on a freshly generated maze.
    pub fn restart_game(&mut self) {
        let maze = self.generator.generate(1, &mut self.maze_rng);
        tracing::debug!(seed = self.seed, "restarting game");
        self.submit(Command::Restart {
            maze: Box::new(maze),
        });
    }

    /// Score, lives, level and power mode.
    #[must_use]
    pub fn game_state(&self) -> GameState {
        query::game_state(&self.world)
    }

    /// Maze of the level being played.
    #[must_use]
    pub fn current_maze(&self) -> &MazeData {
        query::maze(&self.world)
    }

    /// Snapshot of every ghost.
    #[must_use]
    pub fn ghosts(&self) -> GhostView {
        query::ghost_view(&self.world)
    }

    /// Snapshot of the player.
    #[must_use]
    pub fn player(&self) -> PlayerSnapshot {
        query::player(&self.world)
    }

    /// Seed the session was started with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Caller clock reported by the latest tick.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Read-only access to the underlying world for richer queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}

fn stream(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{GhostId, GhostMode, TilePos};
    use maze_chase_system_maze_generation::is_connected;
    use maze_chase_world::scaffolding;

    const FRAME: Duration = Duration::from_millis(16);

    fn session() -> Session {
        Session::new(SessionConfig::default()).expect("default config is valid")
    }

    fn run_for(session: &mut Session, total: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        let mut elapsed = session.elapsed();
        let mut remaining = total;
        while !remaining.is_zero() {
            let dt = remaining.min(FRAME);
            remaining -= dt;
            elapsed += dt;
            events.extend(session.tick(elapsed, dt));
        }
        events
    }

    #[test]
    fn first_level_uses_default_spawns() {
        let session = session();
        assert_eq!(session.player().cell, TilePos::new(14, 29));
        assert_eq!(session.current_maze().ghost_spawn(), TilePos::new(14, 13));
        assert!(is_connected(session.current_maze()));
    }

    #[test]
    fn eating_dots_then_clearing_advances_level() {
        let mut session = session();
        let levels = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&levels);
        session.subscribe(move |event| sink.borrow_mut().push(*event));

        let spawn = session.player().cell;
        let (heading, first) = Direction::ALL
            .into_iter()
            .map(|direction| (direction, spawn.step(direction)))
            .find(|(_, cell)| session.current_maze().has_dot(*cell))
            .expect("player spawn borders a dot");

        session.set_next_direction(Some(heading));
        let events = run_for(&mut session, Duration::from_millis(125));
        assert!(events.contains(&Event::DotConsumed {
            cell: first,
            score: 10
        }));
        assert_eq!(session.game_state().score, 10);

        let maze = session.current_maze();
        let (approach, last) = maze
            .open_cells()
            .filter(|cell| maze.has_dot(*cell))
            .find_map(|cell| {
                Direction::ALL
                    .into_iter()
                    .find(|direction| !maze.is_wall(cell.step(direction.reverse())))
                    .map(|direction| (direction, cell))
            })
            .expect("a dot with an open neighbour");
        let start = last.step(approach.reverse());
        scaffolding::clear_pickups_except(&mut session.world, &[last]);
        scaffolding::place_player(&mut session.world, start, approach, true);
        let events = run_for(&mut session, Duration::from_millis(250));
        assert!(events.contains(&Event::LevelCleared { level: 1 }));
        assert_eq!(*levels.borrow(), vec![SessionEvent::LevelAdvanced { level: 2 }]);

        let state = session.game_state();
        assert_eq!(state.level, 2);
        assert_eq!(state.score, 20);
        assert!(is_connected(session.current_maze()));
        assert!(session.current_maze().dots_remaining() > 0);
        assert_eq!(session.player().cell, session.current_maze().player_spawn());
    }

    #[test]
    fn frightened_ghost_on_player_tile_is_eaten_and_respawns() {
        let mut session = session();
        let ghost = GhostId::new(0);
        let pellet = *session
            .current_maze()
            .power_pellets()
            .first()
            .expect("generated mazes carry pellets");
        let cell = session.player().cell;

        scaffolding::place_player(&mut session.world, cell, Direction::Left, false);
        scaffolding::place_ghost(&mut session.world, ghost, cell, Direction::Left);
        let mut pickup = Vec::new();
        world::apply(
            &mut session.world,
            Command::ConsumePowerPellet { cell: pellet, points: 50 },
            &mut pickup,
        );
        session.backlog.extend(pickup);

        let events = session.tick(FRAME, FRAME);
        assert!(events.contains(&Event::GhostEaten {
            ghost,
            points: 200,
            score: 250
        }));
        let eaten = *session.ghosts().get(ghost).expect("ghost");
        assert_eq!(eaten.mode, GhostMode::Eaten);

        let _ = run_for(&mut session, Duration::from_millis(3_000));
        let respawned = *session.ghosts().get(ghost).expect("ghost");
        assert_eq!(respawned.mode, GhostMode::Scatter);
        assert_eq!(respawned.respawn_in, None);
        assert_eq!(session.game_state().lives, 3);
    }

    #[test]
    fn catch_notifies_game_over_once_lives_run_out() {
        let config = SessionConfig {
            world: Config {
                initial_lives: 1,
                ..Config::default()
            },
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).expect("valid config");
        let scores = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&scores);
        session.subscribe(move |event| {
            if let SessionEvent::GameOver { score } = event {
                sink.borrow_mut().push(*score);
            }
        });

        let cell = session.player().cell;
        scaffolding::place_ghost(&mut session.world, GhostId::new(3), cell, Direction::Right);
        let _ = session.tick(FRAME, FRAME);
        assert_eq!(*scores.borrow(), vec![0]);
        assert_eq!(session.game_state().status, GameStatus::GameOver);

        assert!(session.tick(FRAME * 2, FRAME).is_empty());
    }
}
