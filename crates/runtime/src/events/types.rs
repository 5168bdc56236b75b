//! Event types for different topics.

use game_core::{EntityId, RegionId, RemovalReason, TickError, TickReport, TurnCounters};
use serde::{Deserialize, Serialize};

/// Tick loop progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    /// A tick ran to completion.
    Completed(Box<TickReport>),

    /// A tick aborted on a broken invariant. The worker stops after this.
    Halted { error: TickError },
}

/// Region and entity lifecycle, mirrored from the scheduler's observer
/// callbacks in the order they fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    RegionChanged {
        entity: EntityId,
        from: RegionId,
        to: RegionId,
    },

    EntityRemoved {
        entity: EntityId,
        reason: RemovalReason,
        counters: Option<TurnCounters>,
    },

    RegionEmptied { region: RegionId },
}
