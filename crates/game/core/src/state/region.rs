//! Regions: independently tracked world areas with their own residents and
//! ambient time factor.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::state::{RegionId, Tick};

new_key_type! {
    /// Stable arena handle for an entity; tombstoned on removal.
    pub struct EntityKey;
}

bitflags! {
    /// Static properties of a region.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RegionFlags: u8 {
        /// Globally safe (town, sanctuary): running is never restricted.
        const SAFE       = 1 << 0;
        /// Holds a persistent claim (house, guild hall): never torn down.
        const PERSISTENT = 1 << 1;
        /// Open to the sky: takes part in day/night transitions.
        const SURFACE    = 1 << 2;
    }
}

/// Parameters for creating a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionSpec {
    pub depth: u32,
    /// Ambient time factor in percent. `None` or `0` means neutral.
    pub time_factor: Option<u32>,
    pub flags: RegionFlags,
}

impl RegionSpec {
    pub fn at_depth(depth: u32) -> Self {
        Self {
            depth,
            time_factor: None,
            flags: RegionFlags::empty(),
        }
    }

    pub fn surface() -> Self {
        Self {
            depth: 0,
            time_factor: None,
            flags: RegionFlags::SURFACE,
        }
    }

    pub fn with_time_factor(mut self, percent: u32) -> Self {
        self.time_factor = Some(percent);
        self
    }

    pub fn with_flags(mut self, flags: RegionFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// A live region and its resident table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub depth: u32,
    pub time_factor: Option<u32>,
    pub flags: RegionFlags,
    /// Energy cost of one turn here, resolved from the depth tax curve.
    pub action_threshold: u32,
    pub created_at: Tick,
    residents: Vec<EntityKey>,
}

impl Region {
    pub(crate) fn new(id: RegionId, spec: RegionSpec, action_threshold: u32, now: Tick) -> Self {
        Self {
            id,
            depth: spec.depth,
            time_factor: spec.time_factor,
            flags: spec.flags,
            action_threshold,
            created_at: now,
            residents: Vec::new(),
        }
    }

    /// Residents in arrival order.
    pub fn residents(&self) -> &[EntityKey] {
        &self.residents
    }

    pub fn resident_count(&self) -> usize {
        self.residents.len()
    }

    pub fn is_safe(&self) -> bool {
        self.flags.contains(RegionFlags::SAFE)
    }

    pub fn is_persistent(&self) -> bool {
        self.flags.contains(RegionFlags::PERSISTENT)
    }

    pub(crate) fn admit(&mut self, key: EntityKey) {
        self.residents.push(key);
    }

    pub(crate) fn evict(&mut self, key: EntityKey) -> bool {
        let before = self.residents.len();
        self.residents.retain(|resident| *resident != key);
        self.residents.len() != before
    }
}
