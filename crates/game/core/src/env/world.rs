//! Time-driven per-region side effects.

use bitflags::bitflags;

use crate::error::{ErrorSeverity, GameError};
use crate::state::{Region, RegionId, Tick};

bitflags! {
    /// Side effects due for a region on a world tick.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WorldEffects: u8 {
        /// Day turned to night or back (surface regions only).
        const DAY_NIGHT  = 1 << 0;
        /// Creature respawn and resource regrowth.
        const RESPAWN    = 1 << 1;
        /// Trap and timer countdowns.
        const TRAP_DECAY = 1 << 2;
        /// Transient object cleanup (dropped items, corpses).
        const CLEANUP    = 1 << 3;
        /// Structure lifecycle (decay, ownership expiry).
        const STRUCTURES = 1 << 4;
    }
}

/// What the world ticker is asked to do for one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldTickContext {
    pub tick: Tick,
    /// Number of world ticks since the scheduler started counting, this one
    /// included.
    pub world_tick: u64,
    pub is_day: bool,
    pub effects: WorldEffects,
}

/// Region-local failures of the world ticker; logged, never fatal to a tick.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldTickError {
    #[error("world state for {0} is unavailable")]
    Unavailable(RegionId),

    #[error("world tick failed in {region}: {reason}")]
    Failed { region: RegionId, reason: String },
}

impl GameError for WorldTickError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unavailable(_) => ErrorSeverity::Recoverable,
            Self::Failed { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "WORLD_TICK_UNAVAILABLE",
            Self::Failed { .. } => "WORLD_TICK_FAILED",
        }
    }
}

/// Runs world-tick side effects.
pub trait WorldTicker: Send {
    fn run(&mut self, region: &Region, context: &WorldTickContext) -> Result<(), WorldTickError>;
}
