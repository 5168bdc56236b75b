//! Scheduler errors.
//!
//! [`SchedulerError`] is API misuse between ticks and never escapes a tick
//! on its own. [`TickError`] wraps an [`InvariantViolation`] detected while a
//! tick ran; the host decides whether to halt or roll back.

use crate::config::ConfigError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, RegionId, Tick};
use crate::time::ClockError;

/// Errors from scheduler calls made outside a tick, and from input events.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("region {0} already exists")]
    DuplicateRegion(RegionId),

    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    #[error("entity {0} does not take commands")]
    NotCommanded(EntityId),

    #[error("entity {0} is leaving the scheduler")]
    Inactive(EntityId),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError for SchedulerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEntity(_) | Self::NotCommanded(_) | Self::Inactive(_) => {
                ErrorSeverity::Validation
            }
            Self::UnknownRegion(_) | Self::DuplicateRegion(_) | Self::DuplicateEntity(_) => {
                ErrorSeverity::Validation
            }
            Self::Clock(error) => error.severity(),
            Self::Config(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "SCHEDULER_UNKNOWN_ENTITY",
            Self::UnknownRegion(_) => "SCHEDULER_UNKNOWN_REGION",
            Self::DuplicateRegion(_) => "SCHEDULER_DUPLICATE_REGION",
            Self::DuplicateEntity(_) => "SCHEDULER_DUPLICATE_ENTITY",
            Self::NotCommanded(_) => "SCHEDULER_NOT_COMMANDED",
            Self::Inactive(_) => "SCHEDULER_INACTIVE",
            Self::Clock(error) => error.error_code(),
            Self::Config(error) => error.error_code(),
        }
    }
}

/// State corruption that would desynchronize persisted counters.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvariantViolation {
    #[error("{entity} holds {energy} energy above its ceiling of {ceiling}")]
    EnergyAboveCeiling {
        entity: EntityId,
        energy: u32,
        ceiling: u32,
    },

    #[error("{entity} acted with {energy} energy but the action costs {cost}")]
    ActedWithoutEnergy {
        entity: EntityId,
        energy: u32,
        cost: u32,
    },

    #[error("global tick moved to {actual}, expected {expected}")]
    TickNotAdvanced { expected: Tick, actual: Tick },

    #[error("turn counter overflow (entity {entity:?})")]
    CounterOverflow { entity: Option<EntityId> },

    #[error("{entity} has active_turn {active} above game_turn {game}")]
    ActiveTurnAheadOfGame {
        entity: EntityId,
        active: u64,
        game: u64,
    },
}

/// A tick aborted on an invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("tick {tick} aborted: {violation}")]
pub struct TickError {
    pub tick: Tick,
    pub violation: InvariantViolation,
}

impl TickError {
    pub fn new(tick: Tick, violation: InvariantViolation) -> Self {
        Self { tick, violation }
    }
}

impl GameError for TickError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self.violation {
            InvariantViolation::EnergyAboveCeiling { .. } => "TICK_ENERGY_ABOVE_CEILING",
            InvariantViolation::ActedWithoutEnergy { .. } => "TICK_ACTED_WITHOUT_ENERGY",
            InvariantViolation::TickNotAdvanced { .. } => "TICK_NOT_ADVANCED",
            InvariantViolation::CounterOverflow { .. } => "TICK_COUNTER_OVERFLOW",
            InvariantViolation::ActiveTurnAheadOfGame { .. } => "TICK_ACTIVE_AHEAD_OF_GAME",
        }
    }
}
