//! Pure targeting rules for each ghost personality.

use maze_chase_core::{GhostMode, MazeData, Personality, PlayerSnapshot, TilePos};

/// Tiles ahead of the player the pink ghost aims for.
pub const AMBUSH_LOOKAHEAD: i32 = 4;

/// Tiles ahead of the player used as the cyan ghost's pivot.
pub const FLANK_LOOKAHEAD: i32 = 2;

/// Distance, in tiles, inside which the orange ghost retreats to its corner.
pub const SHY_RADIUS: i64 = 8;

/// Home corner a ghost heads for while scattering.
#[must_use]
pub fn scatter_corner(personality: Personality, maze: &MazeData) -> TilePos {
    let right = maze.width() - 1;
    let bottom = maze.height() - 1;
    match personality {
        Personality::Red => TilePos::new(right, 0),
        Personality::Pink => TilePos::new(0, 0),
        Personality::Cyan => TilePos::new(right, bottom),
        Personality::Orange => TilePos::new(0, bottom),
    }
}

/// Tile a ghost hunts while chasing.
///
/// `own` is the ghost's current tile and `red` the red ghost's tile, if one
/// is present. Targets may lie outside the grid.
#[must_use]
pub fn chase_target(
    personality: Personality,
    maze: &MazeData,
    player: &PlayerSnapshot,
    own: TilePos,
    red: Option<TilePos>,
) -> TilePos {
    match personality {
        Personality::Red => player.cell,
        Personality::Pink => player.cell.offset(player.direction, AMBUSH_LOOKAHEAD),
        Personality::Cyan => {
            let pivot = player.cell.offset(player.direction, FLANK_LOOKAHEAD);
            let red = red.unwrap_or(own);
            TilePos::new(
                2 * pivot.column() - red.column(),
                2 * pivot.row() - red.row(),
            )
        }
        Personality::Orange => {
            if own.distance_squared(player.cell) > SHY_RADIUS * SHY_RADIUS {
                player.cell
            } else {
                scatter_corner(personality, maze)
            }
        }
    }
}

/// Tile a ghost steers toward in its current mode; `None` means wander.
#[must_use]
pub fn mode_target(
    mode: GhostMode,
    personality: Personality,
    maze: &MazeData,
    player: &PlayerSnapshot,
    own: TilePos,
    red: Option<TilePos>,
) -> Option<TilePos> {
    match mode {
        GhostMode::Scatter => Some(scatter_corner(personality, maze)),
        GhostMode::Chase => Some(chase_target(personality, maze, player, own, red)),
        GhostMode::Frightened => None,
        GhostMode::Eaten => Some(maze.ghost_spawn()),
    }
}
