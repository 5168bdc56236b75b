//! Region and entity lifecycle notifications.

use crate::state::{EntityId, RegionId, RegionSpec};
use crate::time::TurnCounters;

/// Why an entity left the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RemovalReason {
    Died,
    Disconnected,
}

/// Receives lifecycle notifications at fixed points of the tick.
///
/// `on_entity_region_changed` fires at the end of the player phase for every
/// transition requested in it; removals and region teardown fire at the end
/// of the tick, after energize. A move whose destination turns out to be
/// unavailable is retracted with a second `on_entity_region_changed` back to
/// the original region.
pub trait LifecycleObserver: Send {
    fn on_region_emptied(&mut self, region: RegionId);

    fn on_entity_region_changed(&mut self, entity: EntityId, from: RegionId, to: RegionId);

    fn on_entity_removed(
        &mut self,
        entity: EntityId,
        reason: RemovalReason,
        counters: Option<TurnCounters>,
    );

    /// True if something outside the scheduler (a house, a guild hall, a
    /// pending save) keeps an empty region alive.
    fn has_persistent_claims(&self, _region: RegionId) -> bool {
        false
    }
}

/// Produces parameters for regions created on first arrival.
pub trait LevelGenerator: Send {
    /// Returns `None` if the region cannot be generated; the entity then
    /// stays where it was.
    fn generate(&mut self, region: RegionId) -> Option<RegionSpec>;
}
