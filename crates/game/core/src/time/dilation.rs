//! Per-entity time dilation.
//!
//! The effective rate is the product of three percentages: the region's
//! ambient factor, the entity's personal time effects, and the running bonus.
//! The result is clamped to the configured range, so it is never zero.

use std::fmt;

use crate::config::SchedulerConfig;
use crate::env::SightOracle;
use crate::state::{Entity, Region, Tick};

/// Time rate in percent; 100 is real time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeFactor(pub u32);

impl TimeFactor {
    /// Real time: grants pass through unchanged.
    pub const NEUTRAL: Self = Self(100);

    pub const fn percent(self) -> u32 {
        self.0
    }

    /// Scales `raw` by this factor, rounding down.
    pub const fn apply(self, raw: u32) -> u32 {
        let scaled = raw as u64 * self.0 as u64 / 100;
        if scaled > u32::MAX as u64 {
            u32::MAX
        } else {
            scaled as u32
        }
    }

    /// Composes two rates (`50%` of `200%` is `100%`).
    const fn stack(self, percent: u32) -> Self {
        Self(self.apply(percent))
    }
}

impl Default for TimeFactor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for TimeFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// What happened to the running bonus during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunningState {
    NotRunning,
    /// Running and permitted: the bonus was applied.
    Boosted,
    /// Running, but a hostile is in view outside a safe region. The caller
    /// should stop the entity running.
    Denied,
}

/// Outcome of resolving an entity's time rate for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dilation {
    pub factor: TimeFactor,
    pub running: RunningState,
}

/// Resolves the effective time factor of an entity.
///
/// Holds the configured clamp range and running bonus. Resolution itself is
/// stateless, so one resolver serves every entity and region.
///
/// ```text
/// factor = clamp(ambient * effect_1 * ... * effect_n * running, min, max)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeDilationResolver {
    min: u32,
    max: u32,
    running_bonus: u32,
}

impl TimeDilationResolver {
    pub const fn new(min: u32, max: u32, running_bonus: u32) -> Self {
        Self {
            min,
            max,
            running_bonus,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(
            config.min_time_factor,
            config.max_time_factor,
            config.running_bonus_percent,
        )
    }

    /// Ambient factor of a region. A missing or zero factor is neutral.
    pub fn ambient(region: &Region) -> TimeFactor {
        match region.time_factor {
            Some(percent) if percent > 0 => TimeFactor(percent),
            _ => TimeFactor::NEUTRAL,
        }
    }

    /// Effective factor for `entity` standing in `region` at `now`.
    pub fn factor_for(
        &self,
        entity: &Entity,
        region: &Region,
        sight: &dyn SightOracle,
        now: Tick,
    ) -> TimeFactor {
        self.resolve(entity, region, sight, now).factor
    }

    /// Full resolution, including whether running was allowed.
    pub fn resolve(
        &self,
        entity: &Entity,
        region: &Region,
        sight: &dyn SightOracle,
        now: Tick,
    ) -> Dilation {
        let mut factor = Self::ambient(region);

        for effect in entity.time_effects.active(now) {
            factor = factor.stack(effect.percent);
        }

        let running = if !entity.running {
            RunningState::NotRunning
        } else if region.is_safe() || !sight.hostile_in_view(entity.id, region.id) {
            factor = factor.stack(self.running_bonus);
            RunningState::Boosted
        } else {
            RunningState::Denied
        };

        Dilation {
            factor: TimeFactor(factor.0.clamp(self.min, self.max)),
            running,
        }
    }
}
