use crate::env::RemovalReason;
use crate::state::{EntityId, RegionId, Tick};

/// Region membership change applied at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionChange {
    pub entity: EntityId,
    pub from: RegionId,
    pub to: RegionId,
}

/// Summary of one completed tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    /// The tick that just completed (equal to the new global tick).
    pub tick: Tick,
    pub catch_up_actions: u32,
    pub player_actions: u32,
    pub free_actions: u32,
    pub creature_actions: u32,
    pub failed_actions: u32,
    pub world_tick: bool,
    pub transitions: Vec<RegionChange>,
    pub removed: Vec<(EntityId, RemovalReason)>,
    pub regions_created: Vec<RegionId>,
    pub regions_released: Vec<RegionId>,
}

impl TickReport {
    pub(super) fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Energy-consuming actions across all phases.
    pub fn actions(&self) -> u32 {
        self.catch_up_actions + self.player_actions + self.creature_actions
    }
}
