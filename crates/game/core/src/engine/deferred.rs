//! End-of-tick structural changes.
//!
//! Everything that would change a region's resident list is recorded here
//! during the phases and applied once energize has finished.

use std::collections::BTreeSet;

use crate::env::{RemovalReason, TickEnv};
use crate::error::log_isolated;
use crate::state::{EntityId, EntityKey, Lifecycle, Region, RegionId};

use super::{RegionChange, SchedulerError, TickReport, TickScheduler};

#[derive(Clone, Copy, Debug)]
struct PendingTransition {
    key: EntityKey,
    entity: EntityId,
    from: RegionId,
    to: RegionId,
    notified: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingRemoval {
    key: EntityKey,
    entity: EntityId,
    reason: RemovalReason,
}

#[derive(Clone, Debug, Default)]
pub(super) struct Deferred {
    transitions: Vec<PendingTransition>,
    removals: Vec<PendingRemoval>,
    /// Regions that lost a resident this tick; candidates for teardown.
    vacated: BTreeSet<RegionId>,
}

impl Deferred {
    pub(super) fn transition(
        &mut self,
        key: EntityKey,
        entity: EntityId,
        from: RegionId,
        to: RegionId,
    ) {
        self.transitions.push(PendingTransition {
            key,
            entity,
            from,
            to,
            notified: false,
        });
    }

    pub(super) fn remove(&mut self, key: EntityKey, entity: EntityId, reason: RemovalReason) {
        self.removals.push(PendingRemoval {
            key,
            entity,
            reason,
        });
    }

    /// Entities killed so far this tick, in the order they died.
    pub(super) fn deaths(&self) -> impl Iterator<Item = (EntityKey, EntityId)> + '_ {
        self.removals
            .iter()
            .filter(|removal| removal.reason == RemovalReason::Died)
            .map(|removal| (removal.key, removal.entity))
    }
}

impl TickScheduler {
    /// Fires `on_entity_region_changed` for every transition requested so far
    /// that has not been announced yet.
    pub(super) fn announce_transitions(&mut self, env: &mut TickEnv<'_>) {
        for pending in self.deferred.transitions.iter_mut().filter(|t| !t.notified) {
            env.observer
                .on_entity_region_changed(pending.entity, pending.from, pending.to);
            pending.notified = true;
        }
    }

    /// Applies transitions, then removals, then releases regions left empty.
    pub(super) fn resolve_deferred(&mut self, env: &mut TickEnv<'_>, report: &mut TickReport) {
        self.announce_transitions(env);

        let transitions = std::mem::take(&mut self.deferred.transitions);
        for pending in transitions {
            self.apply_transition(env, pending, report);
        }

        let removals = std::mem::take(&mut self.deferred.removals);
        for pending in removals {
            self.apply_removal(env, pending, report);
        }

        let vacated = std::mem::take(&mut self.deferred.vacated);
        for region_id in vacated {
            self.release_if_empty(env, region_id, report);
        }
    }

    fn apply_transition(
        &mut self,
        env: &mut TickEnv<'_>,
        pending: PendingTransition,
        report: &mut TickReport,
    ) {
        let Some(entity) = self.registry.get(pending.key) else {
            return;
        };
        // Died or disconnected after asking to move; the removal wins.
        if entity.lifecycle() != (Lifecycle::Transitioning { to: pending.to }) {
            return;
        }

        let available = self.registry.contains_region(pending.to)
            || self.generate_region(env, pending.to, report);
        if !available {
            tracing::warn!(
                entity = %pending.entity,
                to = %pending.to,
                "destination region unavailable, entity stays"
            );
            if let Some(entity) = self.registry.get_mut(pending.key) {
                entity.lifecycle = Lifecycle::Active;
            }
            // Observers already heard about the move; take it back.
            if pending.notified {
                env.observer
                    .on_entity_region_changed(pending.entity, pending.to, pending.from);
            }
            return;
        }

        let Some(from) = self.registry.relocate(pending.key, pending.to) else {
            return;
        };
        let threshold = self
            .registry
            .region(pending.to)
            .map(|region| region.action_threshold)
            .unwrap_or(self.config.base_action_threshold);
        let limits = self.limits(threshold);

        if let Some(entity) = self.registry.get_mut(pending.key) {
            entity.lifecycle = Lifecycle::Active;
            entity.account.clamp_to(&limits);
        }

        self.deferred.vacated.insert(from);
        report.transitions.push(RegionChange {
            entity: pending.entity,
            from,
            to: pending.to,
        });
        tracing::debug!(entity = %pending.entity, %from, to = %pending.to, "region changed");
    }

    fn generate_region(
        &mut self,
        env: &mut TickEnv<'_>,
        id: RegionId,
        report: &mut TickReport,
    ) -> bool {
        let Some(spec) = env.generator.generate(id) else {
            return false;
        };
        match self.add_region(id, spec) {
            Ok(()) => {
                report.regions_created.push(id);
                true
            }
            Err(error) => {
                log_isolated("level generation", &error);
                matches!(error, SchedulerError::DuplicateRegion(_))
            }
        }
    }

    fn apply_removal(
        &mut self,
        env: &mut TickEnv<'_>,
        pending: PendingRemoval,
        report: &mut TickReport,
    ) {
        let Some(entity) = self.registry.remove(pending.key) else {
            return;
        };

        // Players keep their counters so a later restore resumes them.
        let counters = if entity.is_player() {
            self.clock.counters(pending.entity)
        } else {
            self.clock.retire(pending.entity)
        };

        self.deferred.vacated.insert(entity.region);
        env.observer
            .on_entity_removed(pending.entity, pending.reason, counters);
        report.removed.push((pending.entity, pending.reason));
        tracing::debug!(entity = %pending.entity, reason = %pending.reason, "entity removed");
    }

    fn release_if_empty(&mut self, env: &mut TickEnv<'_>, id: RegionId, report: &mut TickReport) {
        let Some(region) = self.registry.region(id) else {
            return;
        };
        if !is_releasable(region) || env.observer.has_persistent_claims(id) {
            return;
        }

        self.registry.release_region(id);
        env.observer.on_region_emptied(id);
        report.regions_released.push(id);
        tracing::info!(region = %id, "region released");
    }
}

fn is_releasable(region: &Region) -> bool {
    region.resident_count() == 0 && !region.is_persistent()
}
