#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid-aligned motion primitives shared by the player and the ghosts.
//!
//! Actors carry a continuous position in tile units but only change heading
//! near a tile center. Everything here is a pure function of the maze and the
//! actor's [`Kinematics`]; the world owns the actors and calls [`advance`]
//! while applying `AdvanceActors`.

use std::time::Duration;

use glam::Vec2;
use maze_chase_core::{Direction, MazeData, TilePos};

/// Rate, per second, at which the off-axis coordinate converges on the lane.
pub const LANE_SNAP_RATE: f32 = 10.0;

/// Smallest distance from a tile center that still counts as "at the center".
pub const MIN_CENTER_TOLERANCE: f32 = 0.05;

/// Continuous motion state of a single actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    /// Position in tile units.
    pub position: Vec2,
    /// Current heading.
    pub direction: Direction,
    /// Velocity applied during the last step, in tiles per second.
    pub velocity: Vec2,
}

impl Kinematics {
    /// Actor resting at the center of `cell`.
    #[must_use]
    pub fn at_center(maze: &MazeData, cell: TilePos, direction: Direction) -> Self {
        Self {
            position: maze.tile_center(cell),
            direction,
            velocity: Vec2::ZERO,
        }
    }
}

/// Outcome of advancing an actor for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance {
    /// Cell occupied before moving.
    pub from: TilePos,
    /// Cell occupied after moving.
    pub to: TilePos,
    /// Whether a wall stopped the actor at its tile center.
    pub blocked: bool,
    /// Whether the actor travelled through a tunnel.
    pub tunneled: bool,
}

/// Reports whether the adjacent cell in `direction` is inside the grid and open.
#[must_use]
pub fn can_move(maze: &MazeData, pos: TilePos, direction: Direction) -> bool {
    !maze.is_wall(pos.step(direction))
}

/// Cell reached by leaving `pos` in `direction`, following tunnels.
///
/// Returns `None` when the move is blocked.
#[must_use]
pub fn next_cell(maze: &MazeData, pos: TilePos, direction: Direction) -> Option<TilePos> {
    let target = pos.step(direction);
    if maze.contains(target) {
        return (!maze.is_wall(target)).then_some(target);
    }
    maze.tunnel_exit(pos, direction)
        .filter(|exit| !maze.is_wall(*exit))
}

/// Directions with an open next cell, in priority order.
pub fn open_directions(maze: &MazeData, pos: TilePos) -> impl Iterator<Item = Direction> + '_ {
    Direction::ALL
        .into_iter()
        .filter(move |direction| next_cell(maze, pos, *direction).is_some())
}

/// Distance from a tile center within which heading changes are allowed.
///
/// Half the travel of one frame plus a small epsilon guarantees that exactly
/// one frame lands near each center the actor passes.
#[must_use]
pub fn decision_tolerance(speed: f32, dt: Duration) -> f32 {
    (speed * dt.as_secs_f32() * 0.5 + 1e-3).max(MIN_CENTER_TOLERANCE)
}

/// Reports whether `point` lies within `tolerance` of its tile's center.
#[must_use]
pub fn is_near_center(maze: &MazeData, point: Vec2, tolerance: f32) -> bool {
    let center = maze.tile_center(maze.tile_at(point));
    point.distance(center) <= tolerance
}

/// Moves the actor exactly onto the center of its tile.
pub fn snap_to_center(maze: &MazeData, kinematics: &mut Kinematics) {
    kinematics.position = maze.tile_center(maze.tile_at(kinematics.position));
}

/// Moves along `direction` and eases the off-axis coordinate onto the lane.
///
/// Walls are not consulted; see [`advance`].
pub fn step(kinematics: &mut Kinematics, direction: Direction, speed: f32, dt: Duration) {
    let seconds = dt.as_secs_f32();
    let lane = lane_center(kinematics.position);
    let blend = (LANE_SNAP_RATE * seconds).min(1.0);

    kinematics.direction = direction;
    kinematics.velocity = direction.unit() * speed;
    kinematics.position += kinematics.velocity * seconds;

    if direction.is_horizontal() {
        kinematics.position.y += (lane.y - kinematics.position.y) * blend;
    } else {
        kinematics.position.x += (lane.x - kinematics.position.x) * blend;
    }
}

/// Advances an actor, clamping at walls and relocating through tunnels.
pub fn advance(
    maze: &MazeData,
    kinematics: &mut Kinematics,
    direction: Direction,
    speed: f32,
    dt: Duration,
) -> Advance {
    let from = maze.tile_at(kinematics.position);
    let center = maze.tile_center(from);

    if next_cell(maze, from, direction).is_none() {
        let ahead = (center - kinematics.position).dot(direction.unit());
        if ahead <= speed * dt.as_secs_f32() {
            kinematics.position = center;
            kinematics.direction = direction;
            kinematics.velocity = Vec2::ZERO;
            return Advance {
                from,
                to: from,
                blocked: true,
                tunneled: false,
            };
        }
    }

    step(kinematics, direction, speed, dt);

    let mut to = maze.tile_at(kinematics.position);
    let mut tunneled = false;
    if !maze.contains(to) {
        match maze.tunnel_exit(from, direction) {
            Some(exit) => {
                kinematics.position = maze.tile_center(exit);
                to = exit;
                tunneled = true;
            }
            None => {
                kinematics.position = center;
                to = from;
            }
        }
    }

    Advance {
        from,
        to,
        blocked: false,
        tunneled,
    }
}

fn lane_center(point: Vec2) -> Vec2 {
    point.floor() + Vec2::splat(0.5)
}
