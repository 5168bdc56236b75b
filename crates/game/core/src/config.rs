//! Scheduler configuration constants and tunable parameters.

use crate::error::{ErrorSeverity, GameError};
use crate::policy::EntityCategory;

/// One step of the depth tax curve: regions at `min_depth` or deeper use
/// `threshold` until a deeper step applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdStep {
    pub min_depth: u32,
    pub threshold: u32,
}

/// Per-category chance (percent) of acting despite a blocking status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryOverride {
    pub category: EntityCategory,
    pub chance: u8,
}

/// Scheduler configuration. Validated once at startup; an invalid config
/// never reaches a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SchedulerConfig {
    /// Energy cost of one turn at depth 0 (and wherever the curve is silent).
    pub base_action_threshold: u32,

    /// Depth tax curve, sorted by `min_depth`. Empty means a flat threshold.
    pub threshold_curve: Vec<ThresholdStep>,

    /// Global ticks between world ticks.
    pub world_tick_interval: u64,

    /// World ticks per full day/night cycle. The first half is day.
    pub day_length: u64,

    /// World ticks between resource respawn passes.
    pub respawn_interval: u64,

    /// World ticks between transient-object cleanup passes.
    pub cleanup_interval: u64,

    /// World ticks between structure lifecycle checks.
    pub structure_interval: u64,

    /// Energy multiplier (percent) while running with no hostile in view.
    pub running_bonus_percent: u32,

    /// Floor for any resolved time factor (percent). Must be positive.
    pub min_time_factor: u32,

    /// Ceiling for any resolved time factor (percent).
    pub max_time_factor: u32,

    /// Upper bound on free actions a single player may chain in one tick.
    pub max_free_actions_per_tick: u32,

    /// Seed for the deterministic override rolls.
    pub game_seed: u64,

    /// Overrides for the built-in category table.
    pub category_overrides: Vec<CategoryOverride>,
}

impl SchedulerConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ACTION_THRESHOLD: u32 = 100;
    pub const DEFAULT_WORLD_TICK_INTERVAL: u64 = 10;
    pub const DEFAULT_DAY_LENGTH: u64 = 240;
    pub const DEFAULT_RESPAWN_INTERVAL: u64 = 30;
    pub const DEFAULT_CLEANUP_INTERVAL: u64 = 6;
    pub const DEFAULT_STRUCTURE_INTERVAL: u64 = 60;
    pub const DEFAULT_RUNNING_BONUS: u32 = 200;
    pub const DEFAULT_MIN_TIME_FACTOR: u32 = 10;
    pub const DEFAULT_MAX_TIME_FACTOR: u32 = 400;
    pub const DEFAULT_MAX_FREE_ACTIONS: u32 = 32;

    // ===== compile-time constants =====
    /// Maximum concurrent personal time effects per entity.
    pub const MAX_TIME_EFFECTS: usize = 4;

    pub fn new() -> Self {
        Self {
            base_action_threshold: Self::DEFAULT_ACTION_THRESHOLD,
            threshold_curve: Vec::new(),
            world_tick_interval: Self::DEFAULT_WORLD_TICK_INTERVAL,
            day_length: Self::DEFAULT_DAY_LENGTH,
            respawn_interval: Self::DEFAULT_RESPAWN_INTERVAL,
            cleanup_interval: Self::DEFAULT_CLEANUP_INTERVAL,
            structure_interval: Self::DEFAULT_STRUCTURE_INTERVAL,
            running_bonus_percent: Self::DEFAULT_RUNNING_BONUS,
            min_time_factor: Self::DEFAULT_MIN_TIME_FACTOR,
            max_time_factor: Self::DEFAULT_MAX_TIME_FACTOR,
            max_free_actions_per_tick: Self::DEFAULT_MAX_FREE_ACTIONS,
            game_seed: 0,
            category_overrides: Vec::new(),
        }
    }

    pub fn with_seed(mut self, game_seed: u64) -> Self {
        self.game_seed = game_seed;
        self
    }

    pub fn with_threshold_curve(mut self, curve: Vec<ThresholdStep>) -> Self {
        self.threshold_curve = curve;
        self
    }

    pub fn with_category_override(mut self, category: EntityCategory, chance: u8) -> Self {
        self.category_overrides
            .retain(|entry| entry.category != category);
        self.category_overrides
            .push(CategoryOverride { category, chance });
        self
    }

    /// Action threshold for a region at `depth`.
    pub fn threshold_for_depth(&self, depth: u32) -> u32 {
        self.threshold_curve
            .iter()
            .take_while(|step| step.min_depth <= depth)
            .last()
            .map_or(self.base_action_threshold, |step| step.threshold)
    }

    /// Rejects configurations that would break scheduler invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_action_threshold == 0 {
            return Err(ConfigError::ZeroThreshold { depth: None });
        }

        let mut previous_depth = None;
        for step in &self.threshold_curve {
            if step.threshold == 0 {
                return Err(ConfigError::ZeroThreshold {
                    depth: Some(step.min_depth),
                });
            }
            if previous_depth.is_some_and(|previous| step.min_depth <= previous) {
                return Err(ConfigError::UnsortedCurve {
                    depth: step.min_depth,
                });
            }
            previous_depth = Some(step.min_depth);
        }

        for (name, value) in [
            ("world_tick_interval", self.world_tick_interval),
            ("day_length", self.day_length),
            ("respawn_interval", self.respawn_interval),
            ("cleanup_interval", self.cleanup_interval),
            ("structure_interval", self.structure_interval),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }

        if self.min_time_factor == 0 || self.min_time_factor > self.max_time_factor {
            return Err(ConfigError::InvalidTimeFactorRange {
                min: self.min_time_factor,
                max: self.max_time_factor,
            });
        }

        if self.max_free_actions_per_tick == 0 {
            return Err(ConfigError::ZeroFreeActionBudget);
        }

        if let Some(entry) = self.category_overrides.iter().find(|e| e.chance > 100) {
            return Err(ConfigError::InvalidOverrideChance {
                category: entry.category,
                chance: entry.chance,
            });
        }

        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Startup-fatal configuration errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("action threshold must be positive (depth {depth:?})")]
    ZeroThreshold { depth: Option<u32> },

    #[error("threshold curve must be strictly increasing in depth (at depth {depth})")]
    UnsortedCurve { depth: u32 },

    #[error("{name} must be positive")]
    ZeroInterval { name: &'static str },

    #[error("time factor range {min}..={max} is invalid (min must be positive and <= max)")]
    InvalidTimeFactorRange { min: u32, max: u32 },

    #[error("max_free_actions_per_tick must be positive")]
    ZeroFreeActionBudget,

    #[error("override chance {chance}% for {category} exceeds 100%")]
    InvalidOverrideChance { category: EntityCategory, chance: u8 },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroThreshold { .. } => "CONFIG_ZERO_THRESHOLD",
            Self::UnsortedCurve { .. } => "CONFIG_UNSORTED_CURVE",
            Self::ZeroInterval { .. } => "CONFIG_ZERO_INTERVAL",
            Self::InvalidTimeFactorRange { .. } => "CONFIG_TIME_FACTOR_RANGE",
            Self::ZeroFreeActionBudget => "CONFIG_ZERO_FREE_ACTIONS",
            Self::InvalidOverrideChance { .. } => "CONFIG_OVERRIDE_CHANCE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SchedulerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn threshold_curve_is_piecewise_constant() {
        let config = SchedulerConfig::default().with_threshold_curve(vec![
            ThresholdStep {
                min_depth: 10,
                threshold: 110,
            },
            ThresholdStep {
                min_depth: 30,
                threshold: 130,
            },
        ]);

        assert_eq!(config.threshold_for_depth(0), 100);
        assert_eq!(config.threshold_for_depth(9), 100);
        assert_eq!(config.threshold_for_depth(10), 110);
        assert_eq!(config.threshold_for_depth(29), 110);
        assert_eq!(config.threshold_for_depth(99), 130);
    }

    #[test]
    fn rejects_zero_threshold() {
        let config = SchedulerConfig {
            base_action_threshold: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroThreshold { depth: None })
        );

        let config = SchedulerConfig::default().with_threshold_curve(vec![ThresholdStep {
            min_depth: 5,
            threshold: 0,
        }]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroThreshold { depth: Some(5) })
        );
    }

    #[test]
    fn rejects_unsorted_curve() {
        let config = SchedulerConfig::default().with_threshold_curve(vec![
            ThresholdStep {
                min_depth: 20,
                threshold: 120,
            },
            ThresholdStep {
                min_depth: 20,
                threshold: 130,
            },
        ]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsortedCurve { depth: 20 })
        );
    }

    #[test]
    fn rejects_bad_time_factor_range_and_intervals() {
        let config = SchedulerConfig {
            min_time_factor: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeFactorRange { .. })
        ));

        let config = SchedulerConfig {
            world_tick_interval: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval {
                name: "world_tick_interval"
            })
        );
    }

    #[test]
    fn rejects_override_above_hundred() {
        let config = SchedulerConfig::default().with_category_override(EntityCategory::Undead, 101);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOverrideChance { chance: 101, .. })
        ));
    }
}
