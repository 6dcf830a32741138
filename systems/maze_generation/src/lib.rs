#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural maze generation by mirrored recursive subdivision.
//!
//! The left half of the grid is split into chambers by walls on even lines
//! with gaps on odd lines, dead ends are braided into loops, and the result is
//! mirrored onto the right half. Every attempt is validated; when all attempts
//! fail the generator hands out a pillar layout that is connected by
//! construction.

use std::collections::VecDeque;

use maze_chase_core::{
    ConfigError, Direction, MazeData, MazeLayout, TilePos, TunnelPair, MIN_MAZE_DIMENSION,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimensions and retry budget of the generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of columns.
    pub width: i32,
    /// Number of rows.
    pub height: i32,
    /// Attempts before falling back to the pillar layout.
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 28,
            height: 31,
            max_attempts: 16,
        }
    }
}

/// Reasons a generated maze is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Some open cells cannot be reached from the player spawn.
    #[error("only {reachable} of {open} open cells are reachable from the player spawn")]
    Disconnected {
        /// Cells reached by the flood fill.
        reachable: usize,
        /// Open cells in the maze.
        open: usize,
    },
    /// Too few open cells hold a dot.
    #[error("{dots} dots cover too little of {open} open cells")]
    SparseDots {
        /// Dots placed.
        dots: usize,
        /// Open cells in the maze.
        open: usize,
    },
    /// The maze could never be cleared.
    #[error("maze holds no pickups")]
    NoPickups,
}

/// Builds connected mazes for successive levels.
#[derive(Clone, Debug)]
pub struct MazeGenerator {
    config: GeneratorConfig,
    fallback: MazeData,
}

impl MazeGenerator {
    /// Creates a generator after checking the configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        if config.width < MIN_MAZE_DIMENSION || config.height < MIN_MAZE_DIMENSION {
            return Err(ConfigError::MazeTooSmall {
                width: config.width,
                height: config.height,
            });
        }
        if config.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let fallback = MazeData::from_layout(Blueprint::pillars(&config).finish())?;
        Ok(Self { config, fallback })
    }

    /// Configuration the generator was built with.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the maze for `level` from the provided random source.
    ///
    /// Never returns a disconnected maze.
    pub fn generate<R>(&self, level: u32, rng: &mut R) -> MazeData
    where
        R: Rng + ?Sized,
    {
        let density = Density::for_level(level);
        for attempt in 1..=self.config.max_attempts {
            let mut blueprint = Blueprint::empty(&self.config);
            blueprint.subdivide(&density, rng);
            blueprint.braid(density.braid_chance, rng);

            let maze = match MazeData::from_layout(blueprint.finish()) {
                Ok(maze) => maze,
                Err(error) => {
                    tracing::warn!(level, attempt, %error, "generated layout rejected");
                    continue;
                }
            };
            match validate(&maze) {
                Ok(()) => {
                    tracing::debug!(
                        level,
                        attempt,
                        dots = maze.dots_remaining(),
                        "maze generated"
                    );
                    return maze;
                }
                Err(error) => {
                    tracing::warn!(level, attempt, %error, "generated maze failed validation");
                }
            }
        }

        tracing::warn!(
            level,
            attempts = self.config.max_attempts,
            "maze generation exhausted its attempts, using pillar layout"
        );
        self.fallback.clone()
    }

    /// Generates the maze for `level` from a ChaCha stream seeded with `seed`.
    #[must_use]
    pub fn generate_seeded(&self, level: u32, seed: u64) -> MazeData {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(level, &mut rng)
    }

    /// Deterministic pillar layout handed out when generation fails.
    #[must_use]
    pub fn fallback(&self) -> &MazeData {
        &self.fallback
    }
}

/// Number of open cells reachable from `start` through open neighbours.
#[must_use]
pub fn reachable_count(maze: &MazeData, start: TilePos) -> usize {
    if maze.is_wall(start) {
        return 0;
    }

    let width = usize::try_from(maze.width()).unwrap_or(0);
    let height = usize::try_from(maze.height()).unwrap_or(0);
    let mut visited = vec![false; width * height];
    let index = |cell: TilePos| {
        usize::try_from(cell.row()).unwrap_or(0) * width
            + usize::try_from(cell.column()).unwrap_or(0)
    };

    let mut queue = VecDeque::from([start]);
    visited[index(start)] = true;
    let mut reached = 0;
    while let Some(cell) = queue.pop_front() {
        reached += 1;
        for neighbor in maze.neighbors(cell) {
            if maze.is_wall(neighbor) || visited[index(neighbor)] {
                continue;
            }
            visited[index(neighbor)] = true;
            queue.push_back(neighbor);
        }
    }
    reached
}

/// Reports whether every open cell is reachable from the player spawn.
#[must_use]
pub fn is_connected(maze: &MazeData) -> bool {
    reachable_count(maze, maze.player_spawn()) == maze.open_cell_count()
}

/// Checks that every open cell is reachable and that something is left to eat.
///
/// This is the bar for mazes loaded from outside the generator.
pub fn check_playable(maze: &MazeData) -> Result<(), ValidationError> {
    let open = maze.open_cell_count();
    let reachable = reachable_count(maze, maze.player_spawn());
    if reachable != open {
        return Err(ValidationError::Disconnected { reachable, open });
    }
    if maze.pickups_remaining() == 0 {
        return Err(ValidationError::NoPickups);
    }
    Ok(())
}

/// Checks connectivity and pickup density of a maze.
pub fn validate(maze: &MazeData) -> Result<(), ValidationError> {
    check_playable(maze)?;
    let open = maze.open_cell_count();
    let dots = maze.dots_remaining();
    if dots * 10 <= open * 3 {
        return Err(ValidationError::SparseDots { dots, open });
    }
    Ok(())
}

/// Level-dependent knobs of the subdivision.
#[derive(Clone, Copy, Debug)]
struct Density {
    min_room: i32,
    extra_gaps: usize,
    braid_chance: f64,
}

impl Density {
    fn for_level(level: u32) -> Self {
        let above = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
        Self {
            min_room: (7 - above / 2).max(3),
            extra_gaps: usize::try_from((2 - above / 3).max(0)).unwrap_or(0),
            braid_chance: (0.9 - 0.08 * f64::from(above)).max(0.3),
        }
    }
}

/// Inclusive bounds of a chamber; every bound lies on an odd line.
#[derive(Clone, Copy, Debug)]
struct Chamber {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

/// Wall grid under construction.
#[derive(Clone, Debug)]
struct Blueprint {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    /// Rightmost column carved directly; columns beyond mirror the left half.
    last_column: i32,
    /// Bottom row of the carved region.
    last_row: i32,
}

impl Blueprint {
    /// Border walls around an open interior.
    fn empty(config: &GeneratorConfig) -> Self {
        let width = config.width;
        let height = config.height;
        let last_column = last_odd_at_most((width - 1) / 2);
        let last_row = last_odd_at_most(height - 2);
        let mut blueprint = Self {
            width,
            height,
            walls: vec![true; cell_count(width, height)],
            last_column,
            last_row,
        };
        for row in 1..=last_row {
            for column in 1..=last_column {
                blueprint.set_mirrored(TilePos::new(column, row), false);
            }
        }
        blueprint
    }

    /// Pillars on every interior even/even cell.
    fn pillars(config: &GeneratorConfig) -> Self {
        let mut blueprint = Self::empty(config);
        for row in (2..blueprint.last_row).step_by(2) {
            for column in (2..=blueprint.last_column).step_by(2) {
                blueprint.set_mirrored(TilePos::new(column, row), true);
            }
        }
        blueprint
    }

    fn subdivide<R>(&mut self, density: &Density, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let mut pending = vec![Chamber {
            left: 1,
            right: self.last_column,
            top: 1,
            bottom: self.last_row,
        }];

        while let Some(chamber) = pending.pop() {
            let width = chamber.right - chamber.left + 1;
            let height = chamber.bottom - chamber.top + 1;
            if width < 3 || height < 3 || (width < density.min_room && height < density.min_room)
            {
                continue;
            }

            let horizontal = match height.cmp(&width) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => rng.gen_bool(0.5),
            };

            if horizontal {
                let row = chamber.top + 1 + 2 * rng.gen_range(0..(height - 1) / 2);
                let gaps = wall_gaps(chamber.left, width, density, rng);
                for column in chamber.left..=chamber.right {
                    let open = gaps.contains(&column);
                    self.set_mirrored(TilePos::new(column, row), !open);
                }
                pending.push(Chamber {
                    bottom: row - 1,
                    ..chamber
                });
                pending.push(Chamber {
                    top: row + 1,
                    ..chamber
                });
            } else {
                let column = chamber.left + 1 + 2 * rng.gen_range(0..(width - 1) / 2);
                let gaps = wall_gaps(chamber.top, height, density, rng);
                for row in chamber.top..=chamber.bottom {
                    let open = gaps.contains(&row);
                    self.set_mirrored(TilePos::new(column, row), !open);
                }
                pending.push(Chamber {
                    right: column - 1,
                    ..chamber
                });
                pending.push(Chamber {
                    left: column + 1,
                    ..chamber
                });
            }
        }
    }

    /// Knocks out walls behind dead ends with probability `chance`.
    fn braid<R>(&mut self, chance: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for row in (1..=self.last_row).step_by(2) {
            for column in (1..=self.last_column).step_by(2) {
                let cell = TilePos::new(column, row);
                let exits = Direction::ALL
                    .into_iter()
                    .filter(|direction| !self.is_wall(cell.step(*direction)))
                    .count();
                if exits != 1 || !rng.gen_bool(chance) {
                    continue;
                }

                let candidates: Vec<TilePos> = Direction::ALL
                    .into_iter()
                    .map(|direction| (cell.step(direction), cell.offset(direction, 2)))
                    .filter(|(wall, beyond)| {
                        self.is_wall(*wall) && self.in_carved_region(*wall) && !self.is_wall(*beyond)
                    })
                    .map(|(wall, _)| wall)
                    .collect();
                if let Some(wall) = candidates.choose(rng) {
                    self.set_mirrored(*wall, false);
                }
            }
        }
    }

    /// Adds tunnels, spawns, power pellets and dots.
    fn finish(mut self) -> MazeLayout {
        let tunnel_row = {
            let middle = self.height / 2;
            if middle % 2 == 0 {
                middle - 1
            } else {
                middle
            }
        };
        for column in 0..self.width {
            let cell = TilePos::new(column, tunnel_row);
            if column == 0 || column == self.width - 1 {
                self.set(cell, false);
            }
        }
        let tunnel = TunnelPair {
            entrance: TilePos::new(0, tunnel_row),
            exit: TilePos::new(self.width - 1, tunnel_row),
        };

        let player_spawn = TilePos::new(self.width / 2, self.last_row);
        let ghost_spawn = TilePos::new(self.width / 2, tunnel_row - 2);

        let power_pellets: Vec<TilePos> = [
            TilePos::new(1, 1),
            TilePos::new(self.width - 2, 1),
            TilePos::new(1, self.height - 2),
            TilePos::new(self.width - 2, self.height - 2),
        ]
        .into_iter()
        .filter(|cell| !self.is_wall(*cell) && *cell != player_spawn && *cell != ghost_spawn)
        .collect();

        let mut dots = Vec::with_capacity(self.walls.len());
        for row in 0..self.height {
            for column in 0..self.width {
                let cell = TilePos::new(column, row);
                let near_ghost_spawn = cell.column().abs_diff(ghost_spawn.column()) <= 1
                    && cell.row().abs_diff(ghost_spawn.row()) <= 1;
                dots.push(
                    !self.is_wall(cell)
                        && cell != player_spawn
                        && !near_ghost_spawn
                        && !power_pellets.contains(&cell),
                );
            }
        }

        MazeLayout {
            width: self.width,
            height: self.height,
            walls: self.walls,
            dots,
            power_pellets,
            tunnels: [tunnel, tunnel.inverse()],
            player_spawn,
            ghost_spawn,
        }
    }

    fn in_carved_region(&self, cell: TilePos) -> bool {
        (1..=self.last_column).contains(&cell.column()) && (1..=self.last_row).contains(&cell.row())
    }

    fn is_wall(&self, cell: TilePos) -> bool {
        self.index(cell).map_or(true, |index| self.walls[index])
    }

    fn set(&mut self, cell: TilePos, wall: bool) {
        if let Some(index) = self.index(cell) {
            self.walls[index] = wall;
        }
    }

    /// Writes a cell of the carved half, its mirror image and any center gap.
    fn set_mirrored(&mut self, cell: TilePos, wall: bool) {
        self.set(cell, wall);
        self.set(TilePos::new(self.width - 1 - cell.column(), cell.row()), wall);
        if cell.column() == self.last_column {
            for column in (self.last_column + 1)..(self.width - 1 - self.last_column) {
                self.set(TilePos::new(column, cell.row()), wall);
            }
        }
    }

    fn index(&self, cell: TilePos) -> Option<usize> {
        if cell.column() < 0
            || cell.column() >= self.width
            || cell.row() < 0
            || cell.row() >= self.height
        {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * width + column)
    }
}

/// Odd offsets along a wall of `span` cells starting at `start` left open.
fn wall_gaps<R>(start: i32, span: i32, density: &Density, rng: &mut R) -> Vec<i32>
where
    R: Rng + ?Sized,
{
    let openings = usize::try_from((span + 1) / 2).unwrap_or(1);
    let count = (1 + density.extra_gaps).min(openings);
    rand::seq::index::sample(rng, openings, count)
        .into_iter()
        .map(|index| start + 2 * i32::try_from(index).unwrap_or(0))
        .collect()
}

fn last_odd_at_most(value: i32) -> i32 {
    if value % 2 == 0 {
        value - 1
    } else {
        value
    }
}

fn cell_count(width: i32, height: i32) -> usize {
    usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0)
}
