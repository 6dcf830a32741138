#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ghost decision engine that steers every ghost at intersections.
//!
//! Ghosts only reconsider their heading near a tile center. A decision is
//! forced when the current heading is blocked or the tile offers three or
//! more exits and has not been decided yet. The chosen heading minimises the
//! squared distance from the next tile to the ghost's target, never reversing
//! unless that is the only way out; frightened ghosts pick at random.

pub mod targeting;

use std::time::Duration;

use maze_chase_core::{
    Command, Direction, Event, GhostSnapshot, GhostView, MazeData, Personality, PlayerSnapshot,
    TilePos,
};
use maze_chase_system_movement::{decision_tolerance, is_near_center, next_cell, open_directions};
use rand::{seq::SliceRandom, Rng};

/// Read-only inputs of a decision round.
#[derive(Clone, Copy, Debug)]
pub struct DecisionContext<'a> {
    /// Maze the ghosts roam.
    pub maze: &'a MazeData,
    /// Current player state.
    pub player: &'a PlayerSnapshot,
    /// Current ghost states.
    pub ghosts: &'a GhostView,
}

/// Pure system that reacts to world ticks and emits ghost steering commands.
#[derive(Debug, Default)]
pub struct GhostAi {
    open: Vec<Direction>,
    choices: Vec<Direction>,
}

impl GhostAi {
    /// Consumes world events and immutable views to emit steering commands.
    ///
    /// Decisions are only taken on ticks that advanced time.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        context: &DecisionContext<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let Some(dt) = events.iter().find_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        }) else {
            return;
        };

        let red = context
            .ghosts
            .with_personality(Personality::Red)
            .map(|ghost| ghost.cell);

        for ghost in context.ghosts.iter() {
            if let Some(direction) = self.decide(ghost, context, red, dt, rng) {
                out.push(Command::SteerGhost {
                    ghost: ghost.id,
                    direction,
                });
            }
        }
    }

    fn decide<R>(
        &mut self,
        ghost: &GhostSnapshot,
        context: &DecisionContext<'_>,
        red: Option<TilePos>,
        dt: Duration,
        rng: &mut R,
    ) -> Option<Direction>
    where
        R: Rng + ?Sized,
    {
        let maze = context.maze;
        let cell = ghost.cell;
        // The step that brought the ghost here may predate a slowdown.
        let speed = ghost.speed.max(ghost.travel_speed);
        if !is_near_center(maze, ghost.position, decision_tolerance(speed, dt)) {
            return None;
        }

        self.open.clear();
        self.open.extend(open_directions(maze, cell));

        let heading = ghost.direction;
        let heading_open = self.open.contains(&heading);
        let decided_here = ghost.last_decision_tile == Some(cell);
        if heading_open && (decided_here || self.open.len() <= 2) {
            return None;
        }

        if self.open.is_empty() {
            tracing::warn!(ghost = ghost.id.get(), ?cell, "ghost has no legal move, reversing");
            return Some(heading.reverse());
        }

        self.choices.clear();
        self.choices.extend(
            self.open
                .iter()
                .copied()
                .filter(|direction| *direction != heading.reverse()),
        );
        if self.choices.is_empty() {
            self.choices.push(heading.reverse());
        }

        let target = targeting::mode_target(
            ghost.mode,
            ghost.personality,
            maze,
            context.player,
            cell,
            red,
        );
        match target {
            Some(target) => closest_to(maze, cell, &self.choices, target),
            None => self.choices.choose(rng).copied(),
        }
    }
}

/// Direction whose next tile lies closest to `target`; ties keep the earlier choice.
fn closest_to(
    maze: &MazeData,
    cell: TilePos,
    choices: &[Direction],
    target: TilePos,
) -> Option<Direction> {
    let mut best: Option<(i64, Direction)> = None;
    for direction in choices {
        let Some(next) = next_cell(maze, cell, *direction) else {
            continue;
        };
        let distance = next.distance_squared(target);
        if best.map_or(true, |(current, _)| distance < current) {
            best = Some((distance, *direction));
        }
    }
    best.map(|(_, direction)| direction)
}
