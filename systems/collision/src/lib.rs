#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision and scoring resolver.
//!
//! Detects the player overlapping pickups and ghosts after movement and
//! prices each overlap; the world applies the resulting commands. Pickups are
//! resolved in a first pass so that a pellet eaten on a ghost's tile frightens
//! that ghost before contacts are checked.

use maze_chase_core::{
    Command, Event, GhostMode, GhostSnapshot, GhostView, MazeData, PlayerSnapshot, DOT_POINTS,
    GHOST_BASE_POINTS, POWER_PELLET_POINTS,
};

/// Number of doublings after which the ghost reward stops growing.
const MAX_CHAIN_DOUBLINGS: u32 = 3;

/// Pure system that turns overlaps into scoring commands.
#[derive(Debug, Default)]
pub struct Collision {
    chain: u32,
}

impl Collision {
    /// Emits consume commands for pickups on the player's tile.
    pub fn handle_pickups(
        &mut self,
        events: &[Event],
        maze: &MazeData,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) {
        self.observe(events);

        let cell = player.cell;
        if maze.has_dot(cell) {
            out.push(Command::ConsumeDot {
                cell,
                points: DOT_POINTS,
            });
        }
        if maze.is_power_pellet(cell) {
            out.push(Command::ConsumePowerPellet {
                cell,
                points: POWER_PELLET_POINTS,
            });
        }
    }

    /// Emits eat or catch commands for ghosts touching the player.
    ///
    /// A ghost touches the player when it shares the player's tile or when the
    /// two swapped tiles during the latest movement step. Frightened ghosts
    /// are eaten and hunting ghosts catch the player at most once per call.
    /// Eaten ghosts pass through. Nothing happens once the level has been
    /// cleared.
    pub fn handle_contacts(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        ghosts: &GhostView,
        out: &mut Vec<Command>,
    ) {
        self.observe(events);
        if events
            .iter()
            .any(|event| matches!(event, Event::LevelCleared { .. }))
        {
            return;
        }

        for ghost in ghosts.iter().filter(|ghost| touches(player, ghost)) {
            match ghost.mode {
                GhostMode::Frightened => {
                    out.push(Command::EatGhost {
                        ghost: ghost.id,
                        points: self.next_ghost_reward(),
                    });
                }
                GhostMode::Scatter | GhostMode::Chase => {
                    out.push(Command::CatchPlayer { ghost: ghost.id });
                    return;
                }
                GhostMode::Eaten => {}
            }
        }
    }

    /// Points the next eaten ghost is worth in the current power window.
    #[must_use]
    pub fn ghost_reward(&self) -> u32 {
        GHOST_BASE_POINTS << self.chain.min(MAX_CHAIN_DOUBLINGS)
    }

    fn next_ghost_reward(&mut self) -> u32 {
        let reward = self.ghost_reward();
        self.chain = self.chain.saturating_add(1);
        reward
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            if matches!(
                event,
                Event::PowerModeStarted { .. }
                    | Event::LevelStarted { .. }
                    | Event::LifeLost { .. }
                    | Event::Restarted
            ) {
                self.chain = 0;
            }
        }
    }
}

fn touches(player: &PlayerSnapshot, ghost: &GhostSnapshot) -> bool {
    if ghost.cell == player.cell {
        return true;
    }
    // Head-on crossings can skip the shared tile between two samples.
    player.previous_cell != player.cell
        && ghost.cell == player.previous_cell
        && ghost.previous_cell == player.cell
}
