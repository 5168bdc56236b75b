//! Region registry: the entity arena plus the set of live regions.
//!
//! Entities live in a generational arena so a key held across a phase stays
//! valid (or detectably stale) no matter what else happens in the tick. The
//! registry never removes anything on its own; structural changes are made
//! by the scheduler's end-of-tick step.

use std::collections::{BTreeMap, HashMap};

use slotmap::SlotMap;

use crate::policy::BehaviorProfile;
use crate::state::{Entity, EntityId, EntityKey, EntitySpec, Region, RegionId};

#[derive(Clone, Debug)]
pub struct RegionRegistry {
    entities: SlotMap<EntityKey, Entity>,
    index: HashMap<EntityId, EntityKey>,
    /// Registration order. Player fairness depends on this order being stable.
    roster: Vec<EntityKey>,
    regions: BTreeMap<RegionId, Region>,
    next_id: EntityId,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            index: HashMap::new(),
            roster: Vec::new(),
            regions: BTreeMap::new(),
            next_id: EntityId(1),
        }
    }

    // ========================================================================
    // Regions
    // ========================================================================

    /// Registers a region. Returns false if the id is already taken.
    pub(crate) fn insert_region(&mut self, region: Region) -> bool {
        if self.regions.contains_key(&region.id) {
            return false;
        }
        self.regions.insert(region.id, region);
        true
    }

    pub(crate) fn release_region(&mut self, id: RegionId) -> Option<Region> {
        self.regions.remove(&id)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    pub fn contains_region(&self, id: RegionId) -> bool {
        self.regions.contains_key(&id)
    }

    /// Regions in id order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn region_ids(&self) -> Vec<RegionId> {
        self.regions.keys().copied().collect()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Snapshot of a region's resident keys, safe to hold while entities are
    /// mutated.
    pub fn residents(&self, id: RegionId) -> Vec<EntityKey> {
        self.regions
            .get(&id)
            .map(|region| region.residents().to_vec())
            .unwrap_or_default()
    }

    // ========================================================================
    // Entities
    // ========================================================================

    /// Allocates an id and places a new entity in its region.
    ///
    /// Returns `None` if the region is not registered.
    pub(crate) fn spawn(
        &mut self,
        spec: &EntitySpec,
        profile: BehaviorProfile,
    ) -> Option<(EntityId, EntityKey)> {
        let id = self.next_id;
        let key = self.insert(id, spec, profile)?;
        self.next_id = id.next();
        Some((id, key))
    }

    /// Places an entity under a caller-chosen id (restoring a persisted
    /// player). Returns `None` if the id is live or the region is unknown.
    pub(crate) fn spawn_with_id(
        &mut self,
        id: EntityId,
        spec: &EntitySpec,
        profile: BehaviorProfile,
    ) -> Option<EntityKey> {
        if self.index.contains_key(&id) {
            return None;
        }
        let key = self.insert(id, spec, profile)?;
        self.reserve_ids_through(id);
        Some(key)
    }

    /// Makes sure future allocations never hand out `id` or anything below it.
    pub(crate) fn reserve_ids_through(&mut self, id: EntityId) {
        if id >= self.next_id {
            self.next_id = id.next();
        }
    }

    fn insert(
        &mut self,
        id: EntityId,
        spec: &EntitySpec,
        profile: BehaviorProfile,
    ) -> Option<EntityKey> {
        let region = self.regions.get_mut(&spec.region)?;
        let key = self.entities.insert(Entity::new(id, spec, profile));
        region.admit(key);
        self.index.insert(id, key);
        self.roster.push(key);
        Some(key)
    }

    /// Moves an entity's membership to `to`. Returns the region it left.
    pub(crate) fn relocate(&mut self, key: EntityKey, to: RegionId) -> Option<RegionId> {
        let from = self.entities.get(key)?.region;
        if !self.regions.contains_key(&to) {
            return None;
        }
        if let Some(region) = self.regions.get_mut(&from) {
            region.evict(key);
        }
        if let Some(region) = self.regions.get_mut(&to) {
            region.admit(key);
        }
        if let Some(entity) = self.entities.get_mut(key) {
            entity.region = to;
        }
        Some(from)
    }

    /// Removes an entity from the arena, its region and the roster.
    pub(crate) fn remove(&mut self, key: EntityKey) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        if let Some(region) = self.regions.get_mut(&entity.region) {
            region.evict(key);
        }
        self.index.remove(&entity.id);
        self.roster.retain(|k| *k != key);
        Some(entity)
    }

    pub fn key_of(&self, id: EntityId) -> Option<EntityKey> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.key_of(id).and_then(|key| self.entities.get(key))
    }

    /// Entity and the region it stands in.
    pub fn entity_with_region(&self, key: EntityKey) -> Option<(&Entity, &Region)> {
        let entity = self.entities.get(key)?;
        let region = self.regions.get(&entity.region)?;
        Some((entity, region))
    }

    /// Every entity in registration order.
    pub fn roster(&self) -> &[EntityKey] {
        &self.roster
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::EntityCategory;
    use crate::state::{RegionSpec, Tick};

    fn registry_with_regions(ids: &[u32]) -> RegionRegistry {
        let mut registry = RegionRegistry::new();
        for id in ids {
            let region = Region::new(RegionId(*id), RegionSpec::at_depth(*id), 100, Tick::ZERO);
            assert!(registry.insert_region(region));
        }
        registry
    }

    #[test]
    fn spawn_requires_known_region() {
        let mut registry = registry_with_regions(&[1]);
        let profile = BehaviorProfile::default();

        assert!(registry.spawn(&EntitySpec::player(RegionId(9)), profile).is_none());
        let (id, key) = registry
            .spawn(&EntitySpec::player(RegionId(1)), profile)
            .unwrap();

        assert_eq!(id, EntityId(1));
        assert_eq!(registry.key_of(id), Some(key));
        assert_eq!(registry.residents(RegionId(1)), vec![key]);
    }

    #[test]
    fn duplicate_region_is_rejected() {
        let mut registry = registry_with_regions(&[1]);
        let again = Region::new(RegionId(1), RegionSpec::at_depth(5), 100, Tick::ZERO);
        assert!(!registry.insert_region(again));
        assert_eq!(registry.region(RegionId(1)).unwrap().depth, 1);
    }

    #[test]
    fn roster_keeps_registration_order_across_removal() {
        let mut registry = registry_with_regions(&[1]);
        let profile = BehaviorProfile::default();
        let keys: Vec<_> = (0..4)
            .map(|_| {
                registry
                    .spawn(&EntitySpec::player(RegionId(1)), profile)
                    .unwrap()
                    .1
            })
            .collect();

        registry.remove(keys[1]).unwrap();

        assert_eq!(registry.roster(), &[keys[0], keys[2], keys[3]]);
        assert!(registry.get(keys[1]).is_none());
        assert_eq!(registry.residents(RegionId(1)).len(), 3);
    }

    #[test]
    fn relocate_moves_membership() {
        let mut registry = registry_with_regions(&[1, 2]);
        let spec = EntitySpec::creature(EntityCategory::Beast, RegionId(1));
        let (id, key) = registry.spawn(&spec, BehaviorProfile::default()).unwrap();

        assert_eq!(registry.relocate(key, RegionId(2)), Some(RegionId(1)));
        assert!(registry.residents(RegionId(1)).is_empty());
        assert_eq!(registry.residents(RegionId(2)), vec![key]);
        assert_eq!(registry.entity(id).unwrap().region, RegionId(2));

        assert_eq!(registry.relocate(key, RegionId(7)), None);
    }

    #[test]
    fn restored_ids_are_never_reallocated() {
        let mut registry = registry_with_regions(&[1]);
        let profile = BehaviorProfile::default();
        let spec = EntitySpec::player(RegionId(1));

        registry.spawn_with_id(EntityId(10), &spec, profile).unwrap();
        assert!(registry.spawn_with_id(EntityId(10), &spec, profile).is_none());

        let (next, _) = registry.spawn(&spec, profile).unwrap();
        assert_eq!(next, EntityId(11));
    }
}
