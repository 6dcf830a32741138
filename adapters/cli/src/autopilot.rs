//! Greedy input source that walks toward the nearest pickup.

use std::collections::VecDeque;

use maze_chase_core::{Direction, GhostMode, GhostView, MazeData, PlayerSnapshot, TilePos};

/// Breadth-first planner reused across frames.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    first_step: Vec<Option<Direction>>,
    visited: Vec<bool>,
    danger: Vec<bool>,
    queue: VecDeque<TilePos>,
}

impl Autopilot {
    /// Heading of the shortest route to the closest dot or pellet.
    ///
    /// Routes through cells next to a hunting ghost are avoided unless no
    /// other route exists.
    pub(crate) fn steer(
        &mut self,
        maze: &MazeData,
        player: &PlayerSnapshot,
        ghosts: &GhostView,
    ) -> Option<Direction> {
        self.mark_danger(maze, ghosts);
        self.search(maze, player.cell, true)
            .or_else(|| self.search(maze, player.cell, false))
    }

    fn mark_danger(&mut self, maze: &MazeData, ghosts: &GhostView) {
        self.danger.clear();
        self.danger.resize(cell_count(maze), false);
        let hunting = ghosts
            .iter()
            .filter(|ghost| matches!(ghost.mode, GhostMode::Scatter | GhostMode::Chase));
        for ghost in hunting {
            let around = std::iter::once(ghost.cell).chain(maze.neighbors(ghost.cell));
            for cell in around {
                if let Some(index) = index(maze, cell) {
                    self.danger[index] = true;
                }
            }
        }
    }

    fn search(&mut self, maze: &MazeData, start: TilePos, cautious: bool) -> Option<Direction> {
        let cells = cell_count(maze);
        self.first_step.clear();
        self.first_step.resize(cells, None);
        self.visited.clear();
        self.visited.resize(cells, false);
        self.queue.clear();

        let start_index = index(maze, start)?;
        self.visited[start_index] = true;
        self.queue.push_back(start);

        while let Some(cell) = self.queue.pop_front() {
            let first = self.first_step[index(maze, cell)?];
            if cell != start && (maze.has_dot(cell) || maze.is_power_pellet(cell)) {
                return first;
            }

            for direction in Direction::ALL {
                let Some(next) = exit(maze, cell, direction) else {
                    continue;
                };
                let Some(next_index) = index(maze, next) else {
                    continue;
                };
                if self.visited[next_index] || (cautious && self.danger[next_index]) {
                    continue;
                }
                self.visited[next_index] = true;
                self.first_step[next_index] = first.or(Some(direction));
                self.queue.push_back(next);
            }
        }
        None
    }
}

fn exit(maze: &MazeData, cell: TilePos, direction: Direction) -> Option<TilePos> {
    let next = cell.step(direction);
    if maze.contains(next) {
        (!maze.is_wall(next)).then_some(next)
    } else {
        maze.tunnel_exit(cell, direction)
    }
}

fn cell_count(maze: &MazeData) -> usize {
    usize::try_from(maze.width() * maze.height()).unwrap_or_default()
}

fn index(maze: &MazeData, cell: TilePos) -> Option<usize> {
    if !maze.contains(cell) {
        return None;
    }
    usize::try_from(cell.row() * maze.width() + cell.column()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use maze_chase_core::{GhostId, GhostSnapshot, Personality};

    fn maze() -> MazeData {
        MazeData::from_ascii(&[
            "#########",
            "#o     o#",
            "# ## ## #",
            "#   G   #",
            "         ",
            "# ##### #",
            "#   P  .#",
            "#o     o#",
            "#########",
        ])
        .expect("valid maze")
    }

    fn player(cell: TilePos) -> PlayerSnapshot {
        PlayerSnapshot {
            cell,
            previous_cell: cell,
            position: center(cell),
            direction: Direction::Left,
            moving: false,
            queued: None,
        }
    }

    fn center(cell: TilePos) -> Vec2 {
        Vec2::new(cell.column() as f32 + 0.5, cell.row() as f32 + 0.5)
    }

    fn ghost(cell: TilePos, mode: GhostMode) -> GhostSnapshot {
        GhostSnapshot {
            id: GhostId::new(0),
            personality: Personality::Red,
            cell,
            previous_cell: cell,
            position: center(cell),
            direction: Direction::Left,
            mode,
            speed: 7.5,
            travel_speed: 7.5,
            last_decision_tile: None,
            respawn_in: None,
        }
    }

    #[test]
    fn heads_for_the_nearest_pickup() {
        let maze = maze();
        let mut autopilot = Autopilot::default();
        let steer = autopilot.steer(&maze, &player(TilePos::new(4, 6)), &GhostView::default());
        assert_eq!(steer, Some(Direction::Right));
    }

    #[test]
    fn detours_around_hunting_ghosts() {
        let maze = maze();
        let mut autopilot = Autopilot::default();
        let ghosts = GhostView::from_snapshots(vec![ghost(TilePos::new(6, 6), GhostMode::Chase)]);
        let steer = autopilot.steer(&maze, &player(TilePos::new(4, 6)), &ghosts);
        assert_eq!(steer, Some(Direction::Down));
    }

    #[test]
    fn frightened_ghosts_are_ignored() {
        let maze = maze();
        let mut autopilot = Autopilot::default();
        let ghosts =
            GhostView::from_snapshots(vec![ghost(TilePos::new(6, 6), GhostMode::Frightened)]);
        let steer = autopilot.steer(&maze, &player(TilePos::new(4, 6)), &ghosts);
        assert_eq!(steer, Some(Direction::Right));
    }

    #[test]
    fn empty_maze_has_nothing_to_chase() {
        let maze = MazeData::from_ascii(&[
            "#######",
            "#     #",
            "# ### #",
            "   G   ",
            "# ### #",
            "#  P  #",
            "#######",
        ])
        .expect("valid maze");
        let mut autopilot = Autopilot::default();
        let steer = autopilot.steer(&maze, &player(TilePos::new(3, 5)), &GhostView::default());
        assert_eq!(steer, None);
    }
}
