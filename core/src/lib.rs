#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase engine.
//!
//! This crate defines the message surface that connects the session facade,
//! the authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod maze;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use maze::{MazeData, MazeError, MazeLayout, TunnelPair, MIN_MAZE_DIMENSION};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Chase.";

/// Points awarded for eating an ordinary dot.
pub const DOT_POINTS: u32 = 10;

/// Points awarded for eating a power pellet.
pub const POWER_PELLET_POINTS: u32 = 50;

/// Points awarded for the first ghost eaten within a power window.
pub const GHOST_BASE_POINTS: u32 = 200;

/// Number of ghosts roaming every maze.
pub const GHOST_COUNT: usize = 4;

/// Invalid configuration rejected by constructors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Requested maze dimensions are below the 7x7 minimum.
    #[error("maze {width}x{height} is smaller than the 7x7 minimum")]
    MazeTooSmall {
        /// Requested column count.
        width: i32,
        /// Requested row count.
        height: i32,
    },
    /// The generator was allowed no attempts.
    #[error("maze generation needs at least one attempt")]
    ZeroAttempts,
    /// The game was configured without lives.
    #[error("a game needs at least one life")]
    ZeroLives,
    /// A built-in maze failed structural validation.
    #[error("invalid maze: {0}")]
    Maze(#[from] MazeError),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the world timers by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Queues the direction the player wants to travel next.
    SetNextDirection {
        /// Requested heading, or `None` to clear the queued request.
        direction: Option<Direction>,
    },
    /// Turns a ghost at its current tile center.
    SteerGhost {
        /// Identifier of the ghost being steered.
        ghost: GhostId,
        /// Heading the ghost should adopt.
        direction: Direction,
    },
    /// Moves the player and every ghost along their headings.
    AdvanceActors {
        /// Duration of simulated time covered by the movement.
        dt: Duration,
    },
    /// Removes the dot under the player and awards points.
    ConsumeDot {
        /// Cell holding the dot.
        cell: TilePos,
        /// Points awarded for the dot.
        points: u32,
    },
    /// Removes the power pellet under the player and starts power mode.
    ConsumePowerPellet {
        /// Cell holding the pellet.
        cell: TilePos,
        /// Points awarded for the pellet.
        points: u32,
    },
    /// Marks a frightened ghost as eaten by the player.
    EatGhost {
        /// Identifier of the eaten ghost.
        ghost: GhostId,
        /// Points awarded for the ghost.
        points: u32,
    },
    /// Reports that a hunting ghost caught the player.
    CatchPlayer {
        /// Identifier of the ghost that caught the player.
        ghost: GhostId,
    },
    /// Freezes the simulation.
    Pause,
    /// Resumes a paused simulation.
    Resume,
    /// Replaces the maze with a freshly generated one for the provided level.
    LoadLevel {
        /// Level number the maze belongs to.
        level: u32,
        /// Maze to play on.
        maze: Box<MazeData>,
    },
    /// Starts a brand-new game on the provided maze.
    Restart {
        /// Maze to play on.
        maze: Box<MazeData>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the shared scatter/chase phase flipped.
    PhaseChanged {
        /// Phase that became active.
        phase: SchedulePhase,
    },
    /// Reports a ghost mode transition.
    GhostModeChanged {
        /// Identifier of the ghost.
        ghost: GhostId,
        /// Mode the ghost left.
        from: GhostMode,
        /// Mode the ghost entered.
        to: GhostMode,
    },
    /// Confirms that a ghost adopted a new heading at a tile center.
    GhostSteered {
        /// Identifier of the ghost.
        ghost: GhostId,
        /// Tile where the decision was taken.
        cell: TilePos,
        /// Heading adopted by the ghost.
        direction: Direction,
    },
    /// Confirms that the player entered a new tile.
    PlayerMoved {
        /// Tile the player left.
        from: TilePos,
        /// Tile the player entered.
        to: TilePos,
    },
    /// Reports that an actor travelled through a tunnel.
    Tunneled {
        /// Actor that travelled.
        actor: Actor,
        /// Tunnel entrance the actor left through.
        from: TilePos,
        /// Tunnel exit the actor arrived at.
        to: TilePos,
    },
    /// Confirms that a dot was eaten.
    DotConsumed {
        /// Cell that held the dot.
        cell: TilePos,
        /// Score after awarding the dot.
        score: u32,
    },
    /// Confirms that a power pellet was eaten.
    PowerPelletConsumed {
        /// Cell that held the pellet.
        cell: TilePos,
        /// Score after awarding the pellet.
        score: u32,
    },
    /// Announces that power mode started or restarted.
    PowerModeStarted {
        /// Length of the power window.
        duration: Duration,
    },
    /// Announces that power mode ended.
    PowerModeEnded,
    /// Confirms that a frightened ghost was eaten.
    GhostEaten {
        /// Identifier of the eaten ghost.
        ghost: GhostId,
        /// Points awarded for the ghost.
        points: u32,
        /// Score after awarding the ghost.
        score: u32,
    },
    /// Announces that an eaten ghost returned to its spawn.
    GhostRespawned {
        /// Identifier of the respawned ghost.
        ghost: GhostId,
    },
    /// Reports that the player lost a life.
    LifeLost {
        /// Lives remaining after the loss.
        lives: u32,
    },
    /// Announces the end of the game.
    GameOver {
        /// Final score.
        score: u32,
    },
    /// Reports that every dot and pellet of the level was eaten.
    LevelCleared {
        /// Level that was cleared.
        level: u32,
    },
    /// Announces that a new level maze was loaded.
    LevelStarted {
        /// Level that started.
        level: u32,
    },
    /// Confirms that the simulation paused.
    Paused,
    /// Confirms that the simulation resumed.
    Resumed,
    /// Confirms that a new game started.
    Restarted,
}

/// Actor that can move through the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Actor {
    /// The player-controlled character.
    Player,
    /// One of the ghosts.
    Ghost(GhostId),
}

/// Cardinal movement directions, declared in decision priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in tie-break priority order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Column and row offset of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Unit vector in tile space.
    #[must_use]
    pub fn unit(self) -> Vec2 {
        let (column, row) = self.offset();
        Vec2::new(column as f32, row as f32)
    }

    /// Reports whether the direction runs along the row axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
///
/// Coordinates are signed so that targeting offsets may point outside the
/// grid; use [`MazeData::contains`] to check validity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    column: i32,
    row: i32,
}

impl TilePos {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Tile reached after `tiles` steps in `direction`.
    #[must_use]
    pub const fn offset(self, direction: Direction, tiles: i32) -> Self {
        let (column, row) = direction.offset();
        Self {
            column: self.column + column * tiles,
            row: self.row + row * tiles,
        }
    }

    /// Adjacent tile in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.offset(direction, 1)
    }

    /// Squared straight-line distance, exact in integer arithmetic.
    #[must_use]
    pub fn distance_squared(self, other: TilePos) -> i64 {
        let dx = i64::from(self.column) - i64::from(other.column);
        let dy = i64::from(self.row) - i64::from(other.row);
        dx * dx + dy * dy
    }

    /// Straight-line distance measured in tiles.
    #[must_use]
    pub fn euclidean_distance(self, other: TilePos) -> f32 {
        (self.distance_squared(other) as f32).sqrt()
    }

    /// Computes the Manhattan distance between two tiles.
    #[must_use]
    pub fn manhattan_distance(self, other: TilePos) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Unique identifier assigned to a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GhostId(u8);

impl GhostId {
    /// Creates a new ghost identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Targeting personality assigned to a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Hunts the player's current tile.
    Red,
    /// Ambushes four tiles ahead of the player.
    Pink,
    /// Flanks by mirroring the red ghost through a point ahead of the player.
    Cyan,
    /// Hunts from afar and retreats to its corner up close.
    Orange,
}

impl Personality {
    /// Personalities in ghost identifier order.
    pub const ALL: [Personality; GHOST_COUNT] = [
        Personality::Red,
        Personality::Pink,
        Personality::Cyan,
        Personality::Orange,
    ];
}

/// Behavioural mode of a single ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostMode {
    /// Heads for the ghost's home corner.
    Scatter,
    /// Hunts the player using the ghost's personality.
    Chase,
    /// Wanders randomly and can be eaten.
    Frightened,
    /// Returns to the spawn while awaiting respawn.
    Eaten,
}

impl GhostMode {
    /// Reports whether the ghost follows the shared scatter/chase schedule.
    #[must_use]
    pub const fn follows_schedule(self) -> bool {
        matches!(self, Self::Scatter | Self::Chase)
    }
}

/// Phase of the shared scatter/chase schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulePhase {
    /// Ghosts retreat to their corners.
    Scatter,
    /// Ghosts hunt the player.
    Chase,
}

impl SchedulePhase {
    /// Ghost mode matching the phase.
    #[must_use]
    pub const fn mode(self) -> GhostMode {
        match self {
            Self::Scatter => GhostMode::Scatter,
            Self::Chase => GhostMode::Chase,
        }
    }

    /// The phase that follows this one.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Scatter => Self::Chase,
            Self::Chase => Self::Scatter,
        }
    }
}

/// Lifecycle status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The simulation advances on every tick.
    Playing,
    /// Ticks are ignored until the game resumes.
    Paused,
    /// The player ran out of lives.
    GameOver,
}

/// Read-only snapshot of the game-wide counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Points accumulated so far.
    pub score: u32,
    /// Lives remaining.
    pub lives: u32,
    /// Current level, starting at one.
    pub level: u32,
    /// Whether ghosts are currently vulnerable.
    pub power_mode: bool,
    /// Time left in the power window; zero outside power mode.
    pub power_mode_remaining: Duration,
    /// Lifecycle status of the game.
    pub status: GameStatus,
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Tile currently occupied by the player.
    pub cell: TilePos,
    /// Tile the player occupied before its latest movement step.
    pub previous_cell: TilePos,
    /// Continuous position in tile units.
    pub position: Vec2,
    /// Current heading.
    pub direction: Direction,
    /// Whether the player is travelling or resting against a wall.
    pub moving: bool,
    /// Heading requested by input and not yet applied.
    pub queued: Option<Direction>,
}

/// Immutable representation of a single ghost's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostSnapshot {
    /// Unique identifier assigned to the ghost.
    pub id: GhostId,
    /// Targeting personality of the ghost.
    pub personality: Personality,
    /// Tile currently occupied by the ghost.
    pub cell: TilePos,
    /// Tile the ghost occupied before its latest movement step.
    pub previous_cell: TilePos,
    /// Continuous position in tile units.
    pub position: Vec2,
    /// Current heading.
    pub direction: Direction,
    /// Current behavioural mode.
    pub mode: GhostMode,
    /// Travel speed in tiles per second for the current mode.
    pub speed: f32,
    /// Speed of the latest movement step; zero after a stop or a respawn.
    pub travel_speed: f32,
    /// Tile where the ghost last took a direction decision.
    pub last_decision_tile: Option<TilePos>,
    /// Time left until an eaten ghost respawns.
    pub respawn_in: Option<Duration>,
}

/// Read-only snapshot describing all ghosts within the maze.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GhostView {
    snapshots: Vec<GhostSnapshot>,
}

impl GhostView {
    /// Creates a new ghost view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GhostSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured ghost snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &GhostSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the ghost with the provided identifier, if present.
    #[must_use]
    pub fn get(&self, ghost: GhostId) -> Option<&GhostSnapshot> {
        self.snapshots
            .binary_search_by_key(&ghost, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Snapshot of the first ghost with the provided personality.
    #[must_use]
    pub fn with_personality(&self, personality: Personality) -> Option<&GhostSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.personality == personality)
    }

    /// Number of ghosts captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no ghosts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GhostSnapshot> {
        self.snapshots
    }
}
