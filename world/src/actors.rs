//! Player and ghost state stored inside the world.

use std::time::Duration;

use maze_chase_core::{
    Direction, GhostId, GhostMode, GhostSnapshot, MazeData, Personality, PlayerSnapshot, TilePos,
};
use maze_chase_system_movement::Kinematics;

/// Heading every actor faces when placed on its spawn.
pub(crate) const SPAWN_HEADING: Direction = Direction::Left;

/// Player-controlled actor.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) kinematics: Kinematics,
    pub(crate) previous_cell: TilePos,
    /// Heading requested by input, held until it becomes legal.
    pub(crate) queued: Option<Direction>,
    pub(crate) moving: bool,
}

impl Player {
    /// Stationary player on the maze's player spawn.
    pub(crate) fn spawn(maze: &MazeData) -> Self {
        Self {
            kinematics: Kinematics::at_center(maze, maze.player_spawn(), SPAWN_HEADING),
            previous_cell: maze.player_spawn(),
            queued: None,
            moving: false,
        }
    }

    pub(crate) fn cell(&self, maze: &MazeData) -> TilePos {
        maze.tile_at(self.kinematics.position)
    }

    pub(crate) fn snapshot(&self, maze: &MazeData) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.cell(maze),
            previous_cell: self.previous_cell,
            position: self.kinematics.position,
            direction: self.kinematics.direction,
            moving: self.moving,
            queued: self.queued,
        }
    }
}

/// Autonomous pursuer.
#[derive(Clone, Debug)]
pub(crate) struct Ghost {
    pub(crate) id: GhostId,
    pub(crate) personality: Personality,
    pub(crate) kinematics: Kinematics,
    pub(crate) previous_cell: TilePos,
    pub(crate) mode: GhostMode,
    pub(crate) last_decision_tile: Option<TilePos>,
    pub(crate) respawn_in: Option<Duration>,
}

impl Ghost {
    /// Ghost on the maze's ghost spawn in the provided mode.
    pub(crate) fn spawn(
        maze: &MazeData,
        id: GhostId,
        personality: Personality,
        mode: GhostMode,
    ) -> Self {
        Self {
            id,
            personality,
            kinematics: Kinematics::at_center(maze, maze.ghost_spawn(), SPAWN_HEADING),
            previous_cell: maze.ghost_spawn(),
            mode,
            last_decision_tile: None,
            respawn_in: None,
        }
    }

    /// Full ghost roster, one per personality, in identifier order.
    pub(crate) fn roster(maze: &MazeData, mode: GhostMode) -> Vec<Self> {
        (0_u8..)
            .zip(Personality::ALL)
            .map(|(id, personality)| Self::spawn(maze, GhostId::new(id), personality, mode))
            .collect()
    }

    pub(crate) fn cell(&self, maze: &MazeData) -> TilePos {
        maze.tile_at(self.kinematics.position)
    }

    /// Moves the ghost back onto its spawn, keeping identity and personality.
    pub(crate) fn respawn(&mut self, maze: &MazeData, mode: GhostMode) {
        *self = Self::spawn(maze, self.id, self.personality, mode);
    }

    pub(crate) fn snapshot(&self, maze: &MazeData, speed: f32) -> GhostSnapshot {
        GhostSnapshot {
            id: self.id,
            personality: self.personality,
            cell: self.cell(maze),
            previous_cell: self.previous_cell,
            position: self.kinematics.position,
            direction: self.kinematics.direction,
            mode: self.mode,
            speed,
            travel_speed: self.kinematics.velocity.length(),
            last_decision_tile: self.last_decision_tile,
            respawn_in: self.respawn_in,
        }
    }
}
