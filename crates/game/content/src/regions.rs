//! Region catalogue: static region parameters keyed by id.

use std::collections::BTreeMap;

use game_core::{LevelGenerator, RegionId, RegionSpec};

/// Known regions and which of them exist from server start.
///
/// Regions outside the catalogue can still be generated when `fallback` is
/// enabled; they get a plain region whose depth equals the id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionCatalog {
    entries: BTreeMap<RegionId, RegionSpec>,
    preload: Vec<RegionId>,
    fallback: bool,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry. Preloaded regions are listed by
    /// [`RegionCatalog::preloaded`] in insertion order.
    pub fn insert(&mut self, id: RegionId, spec: RegionSpec, preload: bool) {
        self.entries.insert(id, spec);
        self.preload.retain(|existing| *existing != id);
        if preload {
            self.preload.push(id);
        }
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn get(&self, id: RegionId) -> Option<&RegionSpec> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Regions to create before the first tick.
    pub fn preloaded(&self) -> impl Iterator<Item = (RegionId, RegionSpec)> + '_ {
        self.preload
            .iter()
            .filter_map(|id| self.entries.get(id).map(|spec| (*id, *spec)))
    }
}

impl LevelGenerator for RegionCatalog {
    fn generate(&mut self, region: RegionId) -> Option<RegionSpec> {
        if let Some(spec) = self.entries.get(&region) {
            return Some(*spec);
        }
        if self.fallback {
            tracing::debug!(%region, "region not catalogued, generating flat level");
            return Some(RegionSpec::at_depth(region.0));
        }
        None
    }
}
