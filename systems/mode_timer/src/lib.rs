#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scatter/chase alternation and power-mode countdown with level scaling.
//!
//! The world owns a single [`ModeClock`] and advances it on every `Tick`.
//! All difficulty curves live on [`ModeSchedule`] so tests can inject
//! synthetic durations.

use std::time::Duration;

use maze_chase_core::SchedulePhase;
use serde::{Deserialize, Serialize};

/// Level-scaled durations and speeds driving ghost behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSchedule {
    /// Scatter phase length on level one, in milliseconds.
    pub scatter_base_ms: u64,
    /// Milliseconds removed from the scatter phase per level.
    pub scatter_step_ms: u64,
    /// Shortest scatter phase, in milliseconds.
    pub scatter_floor_ms: u64,
    /// Chase phase length on level one, in milliseconds.
    pub chase_base_ms: u64,
    /// Milliseconds added to the chase phase per level.
    pub chase_step_ms: u64,
    /// Longest chase phase, in milliseconds.
    pub chase_ceiling_ms: u64,
    /// Power window length on level one, in milliseconds.
    pub power_base_ms: u64,
    /// Scatter/chase ghost speed on level one, in tiles per second.
    pub ghost_base_speed: f32,
    /// Frightened ghost speed on level one, in tiles per second.
    pub frightened_base_speed: f32,
    /// Speed of eaten ghosts, in tiles per second.
    pub eaten_speed: f32,
}

impl Default for ModeSchedule {
    fn default() -> Self {
        Self {
            scatter_base_ms: 7_000,
            scatter_step_ms: 1_000,
            scatter_floor_ms: 2_000,
            chase_base_ms: 20_000,
            chase_step_ms: 5_000,
            chase_ceiling_ms: 40_000,
            power_base_ms: 8_000,
            ghost_base_speed: 7.5,
            frightened_base_speed: 5.0,
            eaten_speed: 15.0,
        }
    }
}

impl ModeSchedule {
    /// Scatter phase length: shrinks per level down to the floor.
    #[must_use]
    pub fn scatter_duration(&self, level: u32) -> Duration {
        let reduction = self.scatter_step_ms.saturating_mul(levels_above_first(level));
        let millis = self
            .scatter_base_ms
            .saturating_sub(reduction)
            .max(self.scatter_floor_ms);
        Duration::from_millis(millis)
    }

    /// Chase phase length: grows per level up to the ceiling.
    #[must_use]
    pub fn chase_duration(&self, level: u32) -> Duration {
        let growth = self.chase_step_ms.saturating_mul(levels_above_first(level));
        let millis = self
            .chase_base_ms
            .saturating_add(growth)
            .min(self.chase_ceiling_ms);
        Duration::from_millis(millis)
    }

    /// Length of the given phase on the given level.
    #[must_use]
    pub fn phase_duration(&self, phase: SchedulePhase, level: u32) -> Duration {
        match phase {
            SchedulePhase::Scatter => self.scatter_duration(level),
            SchedulePhase::Chase => self.chase_duration(level),
        }
    }

    /// Power window length: ten percent shorter per level, never below thirty percent.
    #[must_use]
    pub fn power_duration(&self, level: u32) -> Duration {
        let tenths = 10_u64.saturating_sub(levels_above_first(level)).max(3);
        Duration::from_millis(self.power_base_ms.saturating_mul(tenths) / 10)
    }

    /// Scatter/chase ghost speed on the given level.
    #[must_use]
    pub fn ghost_speed(&self, level: u32) -> f32 {
        self.ghost_base_speed * speed_multiplier(level)
    }

    /// Frightened ghost speed on the given level.
    #[must_use]
    pub fn frightened_speed(&self, level: u32) -> f32 {
        self.frightened_base_speed * speed_multiplier(level)
    }
}

fn levels_above_first(level: u32) -> u64 {
    u64::from(level.saturating_sub(1))
}

fn speed_multiplier(level: u32) -> f32 {
    (1.0 + 0.05 * levels_above_first(level) as f32).min(1.5)
}

/// Transitions reported by [`ModeClock::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockTick {
    /// Phase that became active, when the scatter/chase timer expired.
    pub phase_changed: Option<SchedulePhase>,
    /// Whether the power window ran out during the tick.
    pub power_expired: bool,
}

/// Shared scatter/chase countdown plus the power-mode countdown.
#[derive(Clone, Debug)]
pub struct ModeClock {
    schedule: ModeSchedule,
    level: u32,
    phase: SchedulePhase,
    phase_remaining: Duration,
    power_remaining: Option<Duration>,
}

impl ModeClock {
    /// Creates a clock at the start of level one.
    #[must_use]
    pub fn new(schedule: ModeSchedule) -> Self {
        let mut clock = Self {
            schedule,
            level: 1,
            phase: SchedulePhase::Scatter,
            phase_remaining: Duration::ZERO,
            power_remaining: None,
        };
        clock.reset(1);
        clock
    }

    /// Restarts the schedule in scatter for `level` and clears power mode.
    pub fn reset(&mut self, level: u32) {
        self.level = level.max(1);
        self.phase = SchedulePhase::Scatter;
        self.phase_remaining = self.schedule.scatter_duration(self.level);
        self.power_remaining = None;
    }

    /// Counts both timers down by `dt`.
    ///
    /// The phase timer keeps running while power mode is active.
    pub fn advance(&mut self, dt: Duration) -> ClockTick {
        let mut tick = ClockTick::default();

        let mut elapsed = dt;
        while elapsed >= self.phase_remaining {
            elapsed -= self.phase_remaining;
            self.phase = self.phase.flipped();
            self.phase_remaining = self.schedule.phase_duration(self.phase, self.level);
            tick.phase_changed = Some(self.phase);
            if self.phase_remaining.is_zero() {
                break;
            }
        }
        self.phase_remaining = self.phase_remaining.saturating_sub(elapsed);

        if let Some(remaining) = self.power_remaining {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                self.power_remaining = None;
                tick.power_expired = true;
            } else {
                self.power_remaining = Some(remaining);
            }
        }

        tick
    }

    /// Starts or restarts the power window, returning its length.
    pub fn activate_power(&mut self) -> Duration {
        let duration = self.schedule.power_duration(self.level);
        self.power_remaining = Some(duration);
        duration
    }

    /// Ends power mode without reporting expiry.
    pub fn clear_power(&mut self) {
        self.power_remaining = None;
    }

    /// Active scatter/chase phase.
    #[must_use]
    pub fn phase(&self) -> SchedulePhase {
        self.phase
    }

    /// Time left in the active phase.
    #[must_use]
    pub fn phase_remaining(&self) -> Duration {
        self.phase_remaining
    }

    /// Time left in the power window; zero when inactive.
    #[must_use]
    pub fn power_remaining(&self) -> Duration {
        self.power_remaining.unwrap_or_default()
    }

    /// Reports whether power mode is active.
    #[must_use]
    pub fn power_active(&self) -> bool {
        self.power_remaining.is_some()
    }

    /// Level the clock durations are scaled for.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Schedule driving the clock.
    #[must_use]
    pub fn schedule(&self) -> &ModeSchedule {
        &self.schedule
    }
}
