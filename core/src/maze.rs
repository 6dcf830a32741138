use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Direction, TilePos};

/// Smallest width and height accepted for a maze.
pub const MIN_MAZE_DIMENSION: i32 = 7;

/// One direction of travel through a side tunnel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TunnelPair {
    /// Edge cell an actor leaves the grid through.
    pub entrance: TilePos,
    /// Edge cell on the opposite side where the actor reappears.
    pub exit: TilePos,
}

impl TunnelPair {
    /// Pair describing travel in the opposite direction.
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self {
            entrance: self.exit,
            exit: self.entrance,
        }
    }
}

/// Serializable description of a maze before validation.
///
/// Matrices are stored row-major with `width * height` entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    /// Number of columns.
    pub width: i32,
    /// Number of rows.
    pub height: i32,
    /// Impassable cells.
    pub walls: Vec<bool>,
    /// Cells holding an ordinary dot.
    pub dots: Vec<bool>,
    /// Cells holding a power pellet.
    pub power_pellets: Vec<TilePos>,
    /// The two side tunnels.
    pub tunnels: [TunnelPair; 2],
    /// Cell where the player starts every life.
    pub player_spawn: TilePos,
    /// Cell where ghosts start and respawn.
    pub ghost_spawn: TilePos,
}

/// Structural problems detected while building a maze from a layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MazeError {
    /// The grid is narrower or shorter than the supported minimum.
    #[error("maze {width}x{height} is smaller than the 7x7 minimum")]
    TooSmall {
        /// Requested column count.
        width: i32,
        /// Requested row count.
        height: i32,
    },
    /// A matrix does not hold one entry per cell.
    #[error("{matrix} matrix has {actual} entries, expected {expected}")]
    MatrixSize {
        /// Name of the offending matrix.
        matrix: &'static str,
        /// Number of cells in the grid.
        expected: usize,
        /// Number of entries provided.
        actual: usize,
    },
    /// A dot was placed on a wall.
    #[error("dot at {cell:?} sits on a wall")]
    DotOnWall {
        /// Offending cell.
        cell: TilePos,
    },
    /// A power pellet lies outside the grid or on a wall.
    #[error("power pellet at {cell:?} is not on an open cell")]
    PelletBlocked {
        /// Offending cell.
        cell: TilePos,
    },
    /// A power pellet shares its cell with a dot or another pellet.
    #[error("power pellet at {cell:?} overlaps another pickup")]
    PelletOverlap {
        /// Offending cell.
        cell: TilePos,
    },
    /// A spawn point lies outside the grid or on a wall.
    #[error("{actor} spawn at {cell:?} is not on an open cell")]
    SpawnBlocked {
        /// Which spawn is invalid.
        actor: &'static str,
        /// Offending cell.
        cell: TilePos,
    },
    /// The player and the ghosts would start on the same cell.
    #[error("player and ghost spawns share {cell:?}")]
    SharedSpawn {
        /// Cell claimed by both spawns.
        cell: TilePos,
    },
    /// The tunnels do not connect the two side edges along one open row.
    #[error("tunnels {tunnels:?} do not join opposite edges of one open row")]
    InvalidTunnels {
        /// Offending tunnel pairs.
        tunnels: [TunnelPair; 2],
    },
    /// Text rows differ in length.
    #[error("row {row} has {actual} glyphs, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Glyph count of the first row.
        expected: usize,
        /// Glyph count of the offending row.
        actual: usize,
    },
    /// A glyph has no meaning in the text format.
    #[error("unknown glyph {glyph:?} at {cell:?}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Cell holding the character.
        cell: TilePos,
    },
    /// The text rows contain no spawn marker for an actor.
    #[error("no {actor} spawn marker")]
    MissingSpawn {
        /// Which spawn is missing.
        actor: &'static str,
    },
    /// No row is open on both side edges.
    #[error("no row is open on both side edges")]
    MissingTunnel,
}

/// Validated maze layout with consumable pickups.
///
/// Walls, tunnels and spawns never change after construction; dots and power
/// pellets are removed as the player eats them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeData {
    width: i32,
    height: i32,
    walls: Vec<bool>,
    dots: Vec<bool>,
    dot_count: usize,
    power_pellets: Vec<TilePos>,
    tunnels: [TunnelPair; 2],
    player_spawn: TilePos,
    ghost_spawn: TilePos,
}

impl MazeData {
    /// Validates a layout and converts it into a playable maze.
    pub fn from_layout(layout: MazeLayout) -> Result<Self, MazeError> {
        let MazeLayout {
            width,
            height,
            walls,
            dots,
            power_pellets,
            tunnels,
            player_spawn,
            ghost_spawn,
        } = layout;

        if width < MIN_MAZE_DIMENSION || height < MIN_MAZE_DIMENSION {
            return Err(MazeError::TooSmall { width, height });
        }

        let expected = cell_count(width, height);
        for (matrix, actual) in [("walls", walls.len()), ("dots", dots.len())] {
            if actual != expected {
                return Err(MazeError::MatrixSize {
                    matrix,
                    expected,
                    actual,
                });
            }
        }

        let mut maze = Self {
            width,
            height,
            walls,
            dots,
            dot_count: 0,
            power_pellets: Vec::with_capacity(power_pellets.len()),
            tunnels,
            player_spawn,
            ghost_spawn,
        };

        for index in 0..expected {
            if maze.dots[index] && maze.walls[index] {
                return Err(MazeError::DotOnWall {
                    cell: maze.position_of(index),
                });
            }
        }
        maze.dot_count = maze.dots.iter().filter(|dot| **dot).count();

        for cell in power_pellets {
            if maze.is_wall(cell) {
                return Err(MazeError::PelletBlocked { cell });
            }
            if maze.has_dot(cell) || maze.power_pellets.contains(&cell) {
                return Err(MazeError::PelletOverlap { cell });
            }
            maze.power_pellets.push(cell);
        }

        for (actor, cell) in [("player", player_spawn), ("ghost", ghost_spawn)] {
            if maze.is_wall(cell) {
                return Err(MazeError::SpawnBlocked { actor, cell });
            }
        }
        if player_spawn == ghost_spawn {
            return Err(MazeError::SharedSpawn { cell: player_spawn });
        }

        if !maze.tunnels_are_valid() {
            return Err(MazeError::InvalidTunnels { tunnels });
        }

        Ok(maze)
    }

    /// Serializable copy of the maze, including pickups still present.
    #[must_use]
    pub fn to_layout(&self) -> MazeLayout {
        MazeLayout {
            width: self.width,
            height: self.height,
            walls: self.walls.clone(),
            dots: self.dots.clone(),
            power_pellets: self.power_pellets.clone(),
            tunnels: self.tunnels,
            player_spawn: self.player_spawn,
            ghost_spawn: self.ghost_spawn,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Cell where the player starts every life.
    #[must_use]
    pub const fn player_spawn(&self) -> TilePos {
        self.player_spawn
    }

    /// Cell where ghosts start and respawn.
    #[must_use]
    pub const fn ghost_spawn(&self) -> TilePos {
        self.ghost_spawn
    }

    /// The two side tunnels, mutual inverses of one another.
    #[must_use]
    pub const fn tunnels(&self) -> &[TunnelPair; 2] {
        &self.tunnels
    }

    /// Reports whether the position lies within the grid.
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.column() >= 0 && pos.column() < self.width && pos.row() >= 0 && pos.row() < self.height
    }

    /// Reports whether the position is impassable. Out of bounds counts as wall.
    #[must_use]
    pub fn is_wall(&self, pos: TilePos) -> bool {
        self.index(pos).map_or(true, |index| self.walls[index])
    }

    /// In-bounds adjacent positions in priority order Up, Down, Left, Right.
    pub fn neighbors(&self, pos: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |direction| pos.step(direction))
            .filter(move |neighbor| self.contains(*neighbor))
    }

    /// Continuous coordinate of the tile center.
    #[must_use]
    pub fn tile_center(&self, pos: TilePos) -> Vec2 {
        Vec2::new(pos.column() as f32 + 0.5, pos.row() as f32 + 0.5)
    }

    /// Tile containing the continuous point.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> TilePos {
        TilePos::new(point.x.floor() as i32, point.y.floor() as i32)
    }

    /// Exit reached when leaving the grid from `pos` in `direction`.
    ///
    /// Returns `None` unless `pos` is a tunnel entrance and the step in
    /// `direction` leaves the grid.
    #[must_use]
    pub fn tunnel_exit(&self, pos: TilePos, direction: Direction) -> Option<TilePos> {
        if self.contains(pos.step(direction)) {
            return None;
        }
        self.tunnels
            .iter()
            .find(|tunnel| tunnel.entrance == pos)
            .map(|tunnel| tunnel.exit)
    }

    /// Reports whether a dot is still present at the position.
    #[must_use]
    pub fn has_dot(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|index| self.dots[index])
    }

    /// Reports whether a power pellet is still present at the position.
    #[must_use]
    pub fn is_power_pellet(&self, pos: TilePos) -> bool {
        self.power_pellets.contains(&pos)
    }

    /// Power pellets still present, in placement order.
    #[must_use]
    pub fn power_pellets(&self) -> &[TilePos] {
        &self.power_pellets
    }

    /// Removes the dot at the position, reporting whether one was present.
    pub fn take_dot(&mut self, pos: TilePos) -> bool {
        let Some(index) = self.index(pos) else {
            return false;
        };
        if !self.dots[index] {
            return false;
        }
        self.dots[index] = false;
        self.dot_count -= 1;
        true
    }

    /// Removes the power pellet at the position, reporting whether one was present.
    pub fn take_power_pellet(&mut self, pos: TilePos) -> bool {
        let before = self.power_pellets.len();
        self.power_pellets.retain(|pellet| *pellet != pos);
        self.power_pellets.len() != before
    }

    /// Number of dots left to eat.
    #[must_use]
    pub const fn dots_remaining(&self) -> usize {
        self.dot_count
    }

    /// Number of dots and power pellets left to eat.
    #[must_use]
    pub fn pickups_remaining(&self) -> usize {
        self.dot_count + self.power_pellets.len()
    }

    /// Number of passable cells in the grid.
    #[must_use]
    pub fn open_cell_count(&self) -> usize {
        self.walls.iter().filter(|wall| !**wall).count()
    }

    /// Iterator over every passable cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.walls
            .iter()
            .enumerate()
            .filter(|(_, wall)| !**wall)
            .map(|(index, _)| self.position_of(index))
    }

    /// Parses a maze from text rows.
    ///
    /// Glyphs: `#` wall, `.` dot, `o` power pellet, `P` player spawn,
    /// `G` ghost spawn, space for an empty corridor. The first row that is
    /// open on both side edges becomes the tunnel row.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, MazeError> {
        let expected = rows.first().map_or(0, |row| row.chars().count());
        let width = i32::try_from(expected).unwrap_or(i32::MAX);
        let height = i32::try_from(rows.len()).unwrap_or(i32::MAX);
        if width < MIN_MAZE_DIMENSION || height < MIN_MAZE_DIMENSION {
            return Err(MazeError::TooSmall { width, height });
        }

        let mut walls = Vec::with_capacity(cell_count(width, height));
        let mut dots = Vec::with_capacity(walls.capacity());
        let mut power_pellets = Vec::new();
        let mut player_spawn = None;
        let mut ghost_spawn = None;
        let mut tunnel_row = None;

        for (row_index, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != expected {
                return Err(MazeError::RaggedRow {
                    row: row_index,
                    expected,
                    actual,
                });
            }
            let row = i32::try_from(row_index).unwrap_or(i32::MAX);
            for (column, glyph) in (0..).zip(line.chars()) {
                let cell = TilePos::new(column, row);
                match glyph {
                    '#' | '.' | 'o' | 'P' | 'G' | ' ' => {}
                    _ => return Err(MazeError::UnknownGlyph { glyph, cell }),
                }
                walls.push(glyph == '#');
                dots.push(glyph == '.');
                match glyph {
                    'o' => power_pellets.push(cell),
                    'P' => player_spawn = Some(cell),
                    'G' => ghost_spawn = Some(cell),
                    _ => {}
                }
            }
            let open_edge = |glyph: Option<char>| glyph.is_some_and(|glyph| glyph != '#');
            if tunnel_row.is_none()
                && open_edge(line.chars().next())
                && open_edge(line.chars().last())
            {
                tunnel_row = Some(row);
            }
        }

        let player_spawn = player_spawn.ok_or(MazeError::MissingSpawn { actor: "player" })?;
        let ghost_spawn = ghost_spawn.ok_or(MazeError::MissingSpawn { actor: "ghost" })?;
        let row = tunnel_row.ok_or(MazeError::MissingTunnel)?;
        let tunnel = TunnelPair {
            entrance: TilePos::new(0, row),
            exit: TilePos::new(width - 1, row),
        };

        Self::from_layout(MazeLayout {
            width,
            height,
            walls,
            dots,
            power_pellets,
            tunnels: [tunnel, tunnel.inverse()],
            player_spawn,
            ghost_spawn,
        })
    }

    /// Renders the maze as text rows using the glyphs of [`MazeData::from_ascii`].
    #[must_use]
    pub fn to_ascii(&self) -> Vec<String> {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|column| {
                        let cell = TilePos::new(column, row);
                        if self.is_wall(cell) {
                            '#'
                        } else if cell == self.player_spawn {
                            'P'
                        } else if cell == self.ghost_spawn {
                            'G'
                        } else if self.is_power_pellet(cell) {
                            'o'
                        } else if self.has_dot(cell) {
                            '.'
                        } else {
                            ' '
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn tunnels_are_valid(&self) -> bool {
        let [first, second] = self.tunnels;
        if second != first.inverse() {
            return false;
        }
        let left = TilePos::new(0, first.entrance.row());
        let right = TilePos::new(self.width - 1, first.entrance.row());
        let joins_edges = (first.entrance == left && first.exit == right)
            || (first.entrance == right && first.exit == left);
        joins_edges && !self.is_wall(left) && !self.is_wall(right)
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let row = usize::try_from(pos.row()).ok()?;
        let column = usize::try_from(pos.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    fn position_of(&self, index: usize) -> TilePos {
        let width = usize::try_from(self.width).unwrap_or(1).max(1);
        let column = i32::try_from(index % width).unwrap_or(i32::MAX);
        let row = i32::try_from(index / width).unwrap_or(i32::MAX);
        TilePos::new(column, row)
    }
}

fn cell_count(width: i32, height: i32) -> usize {
    let width = usize::try_from(width).unwrap_or(0);
    let height = usize::try_from(height).unwrap_or(0);
    width * height
}
