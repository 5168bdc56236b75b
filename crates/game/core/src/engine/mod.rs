//! The five-phase tick scheduler.
//!
//! [`TickScheduler::tick`] runs, in fixed order:
//!
//! 1. pre-turn: input ingestion, action gating, the catch-up pass
//! 2. players: queued commands in registration order
//! 3. creatures: one AI turn each for everyone who has not acted
//! 4. world tick: time-driven region side effects on a fixed cadence
//! 5. energize: dilation, energy grants, turn counters
//!
//! followed by the deferred step that applies region transitions, removals
//! and region teardown. Nothing structural changes before that step, so keys
//! taken from a region's resident list stay valid for the whole tick.

mod creatures;
mod deferred;
mod energize;
mod errors;
mod players;
mod pre_turn;
mod report;
mod world_tick;

pub use errors::{InvariantViolation, SchedulerError, TickError};
pub use report::{RegionChange, TickReport};

use crate::action::{ActionOutcome, QueuedAction};
use crate::config::{ConfigError, SchedulerConfig};
use crate::energy::{EnergyLimits, GrantOutcome};
use crate::env::{InputEvent, RemovalReason, TickEnv};
use crate::policy::{CategoryTable, IncapacitationPolicy};
use crate::state::{
    Entity, EntityId, EntityKey, EntitySpec, Lifecycle, Region, RegionId, RegionRegistry,
    RegionSpec, Tick,
};
use crate::time::{ClockError, TimeDilationResolver, TurnClock, TurnClockSnapshot, TurnCounters};

use deferred::Deferred;

/// Read-only view of an entity's ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyState {
    pub energy: u32,
    pub extra_energy: u32,
    pub action_threshold: u32,
}

/// Orchestrates ticks over every registered region and entity.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    config: SchedulerConfig,
    registry: RegionRegistry,
    clock: TurnClock,
    categories: CategoryTable,
    incapacitation: IncapacitationPolicy,
    dilation: TimeDilationResolver,
    deferred: Deferred,
}

impl TickScheduler {
    /// Validates `config` and builds an empty scheduler.
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        tracing::info!(
            threshold = config.base_action_threshold,
            curve_steps = config.threshold_curve.len(),
            world_tick_interval = config.world_tick_interval,
            "scheduler configured"
        );

        Ok(Self {
            categories: CategoryTable::from_config(&config),
            incapacitation: IncapacitationPolicy::from_config(&config),
            dilation: TimeDilationResolver::from_config(&config),
            registry: RegionRegistry::new(),
            clock: TurnClock::new(),
            deferred: Deferred::default(),
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Number of completed ticks.
    pub fn global_tick(&self) -> Tick {
        self.clock.global_tick()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.entity(id)
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.registry.region(id)
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Pre-generates a region.
    pub fn add_region(&mut self, id: RegionId, spec: RegionSpec) -> Result<(), SchedulerError> {
        let threshold = self.config.threshold_for_depth(spec.depth);
        let region = Region::new(id, spec, threshold, self.clock.global_tick());
        if !self.registry.insert_region(region) {
            return Err(SchedulerError::DuplicateRegion(id));
        }
        tracing::debug!(region = %id, depth = spec.depth, threshold, "region added");
        Ok(())
    }

    /// Registers a new entity in an existing region.
    pub fn spawn(&mut self, spec: EntitySpec) -> Result<EntityId, SchedulerError> {
        let profile = self.categories.profile(spec.category);
        let (id, key) = self
            .registry
            .spawn(&spec, profile)
            .ok_or(SchedulerError::UnknownRegion(spec.region))?;
        self.admit(id, key);
        Ok(id)
    }

    /// Registers an entity under a known id, resuming any turn counters the
    /// clock holds for it.
    pub fn restore_entity(&mut self, id: EntityId, spec: EntitySpec) -> Result<(), SchedulerError> {
        if self.registry.key_of(id).is_some() {
            return Err(SchedulerError::DuplicateEntity(id));
        }
        let profile = self.categories.profile(spec.category);
        let key = self
            .registry
            .spawn_with_id(id, &spec, profile)
            .ok_or(SchedulerError::UnknownRegion(spec.region))?;
        self.admit(id, key);
        Ok(())
    }

    fn admit(&mut self, id: EntityId, key: EntityKey) {
        let Some((entity, region)) = self.registry.entity_with_region(key) else {
            return;
        };
        let limits = self.limits(region.action_threshold);
        let (category, region_id) = (entity.category, region.id);

        if let Some(entity) = self.registry.get_mut(key) {
            entity.account.clamp_to(&limits);
        }
        self.clock.register(id);
        tracing::debug!(entity = %id, %category, region = %region_id, "entity registered");
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Applies one transport event. Also used by the pre-turn phase for
    /// everything drained from the input source.
    pub fn apply_input(&mut self, event: InputEvent) -> Result<(), SchedulerError> {
        let id = event.entity();
        let key = self
            .registry
            .key_of(id)
            .ok_or(SchedulerError::UnknownEntity(id))?;
        let entity = self
            .registry
            .get_mut(key)
            .ok_or(SchedulerError::UnknownEntity(id))?;
        if !entity.is_active() {
            return Err(SchedulerError::Inactive(id));
        }

        match event {
            InputEvent::Queue { action, .. } => {
                let queue = entity
                    .queue_mut()
                    .ok_or(SchedulerError::NotCommanded(id))?;
                queue.push(action);
            }
            InputEvent::Withdraw { action, .. } => {
                let queue = entity
                    .queue_mut()
                    .ok_or(SchedulerError::NotCommanded(id))?;
                if !queue.withdraw(action) {
                    tracing::debug!(
                        entity = %id,
                        action = action.0,
                        "withdraw: action not pending"
                    );
                }
            }
            InputEvent::Supersede { action, .. } => {
                let queue = entity
                    .queue_mut()
                    .ok_or(SchedulerError::NotCommanded(id))?;
                let dropped = queue.supersede(action);
                tracing::debug!(entity = %id, dropped, "queue superseded");
            }
            InputEvent::Disconnect { .. } => {
                if !entity.is_player() {
                    return Err(SchedulerError::NotCommanded(id));
                }
                self.retire(key, RemovalReason::Disconnected);
            }
            InputEvent::SetRunning { running, .. } => entity.running = running,
            InputEvent::SetStatus { status, .. } => entity.status = status,
            InputEvent::AddTimeEffect { effect, .. } => entity.time_effects.add(effect),
            InputEvent::RemoveTimeEffect { kind, .. } => entity.time_effects.remove(kind),
        }
        Ok(())
    }

    /// Queues a command for a player.
    pub fn queue_action(
        &mut self,
        id: EntityId,
        action: QueuedAction,
    ) -> Result<(), SchedulerError> {
        self.apply_input(InputEvent::Queue { entity: id, action })
    }

    /// Drops a player's connection. Removal happens at the end of the next tick.
    pub fn disconnect(&mut self, id: EntityId) -> Result<(), SchedulerError> {
        self.apply_input(InputEvent::Disconnect { entity: id })
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Runs one complete tick.
    pub fn tick(&mut self, env: &mut TickEnv<'_>) -> Result<TickReport, TickError> {
        let now = self.clock.global_tick() + 1;
        let mut report = TickReport::new(now);

        self.pre_turn_phase(env, now, &mut report)
            .map_err(|violation| TickError::new(now, violation))?;
        self.player_phase(env, &mut report)
            .map_err(|violation| TickError::new(now, violation))?;
        self.creature_phase(env, &mut report)
            .map_err(|violation| TickError::new(now, violation))?;
        self.world_tick_phase(env, now, &mut report);
        self.energize_phase(env, now)
            .map_err(|violation| TickError::new(now, violation))?;
        self.resolve_deferred(env, &mut report);

        tracing::trace!(
            tick = %now,
            actions = report.actions(),
            free = report.free_actions,
            "tick complete"
        );
        Ok(report)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn entity_energy_state(&self, id: EntityId) -> Option<EnergyState> {
        let key = self.registry.key_of(id)?;
        let (entity, region) = self.registry.entity_with_region(key)?;
        Some(EnergyState {
            energy: entity.account.energy(),
            extra_energy: entity.account.extra_energy(),
            action_threshold: region.action_threshold,
        })
    }

    pub fn turn_counters(&self, id: EntityId) -> Option<TurnCounters> {
        self.clock.counters(id)
    }

    // ========================================================================
    // Persistence hooks
    // ========================================================================

    /// Snapshot of the turn clock for the host to persist between ticks.
    pub fn save_turn_counters(&self) -> TurnClockSnapshot {
        self.clock.snapshot()
    }

    /// Replaces the turn clock with a persisted one.
    ///
    /// The global tick may not move backwards. Live entities missing from the
    /// snapshot start from zero.
    pub fn load_turn_counters(
        &mut self,
        snapshot: TurnClockSnapshot,
    ) -> Result<(), SchedulerError> {
        let live = self.clock.global_tick();
        if snapshot.global_tick < live {
            return Err(ClockError::TickRewind {
                snapshot: snapshot.global_tick,
                live,
            }
            .into());
        }

        let mut clock = TurnClock::from_snapshot(snapshot)?;
        for (_, entity) in self.registry.iter() {
            clock.register(entity.id);
        }
        if let Some(highest) = clock.highest_entity() {
            self.registry.reserve_ids_through(highest);
        }

        tracing::info!(
            global_tick = %clock.global_tick(),
            tracked = clock.tracked().count(),
            "turn counters loaded"
        );
        self.clock = clock;
        Ok(())
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    fn limits(&self, threshold: u32) -> EnergyLimits {
        EnergyLimits::for_threshold(threshold, self.config.max_time_factor)
    }

    /// Records what an action did to its actor's membership.
    fn apply_outcome(&mut self, key: EntityKey, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Completed => {}
            ActionOutcome::ChangedRegion(to) => {
                let Some(entity) = self.registry.get_mut(key) else {
                    return;
                };
                if entity.region == to || !entity.is_active() {
                    return;
                }
                let (id, from) = (entity.id, entity.region);
                entity.lifecycle = Lifecycle::Transitioning { to };
                self.deferred.transition(key, id, from, to);
            }
            ActionOutcome::Died => self.retire(key, RemovalReason::Died),
            ActionOutcome::Disconnected => self.retire(key, RemovalReason::Disconnected),
        }
    }

    /// Tombstones an entity and schedules its removal at the end of the tick.
    fn retire(&mut self, key: EntityKey, reason: RemovalReason) {
        let Some(entity) = self.registry.get_mut(key) else {
            return;
        };
        if !entity.is_active() {
            return;
        }

        let dropped = match reason {
            RemovalReason::Disconnected => {
                entity.lifecycle = Lifecycle::Disconnecting;
                entity.disconnect()
            }
            RemovalReason::Died => {
                entity.lifecycle = Lifecycle::Dead;
                0
            }
        };
        tracing::debug!(entity = %entity.id, %reason, dropped, "entity retired");
        self.deferred.remove(key, entity.id, reason);
    }
}

/// Result of giving one entity its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Turn {
    /// Nothing to do (empty queue, AI held, budget exhausted).
    Waiting,
    /// An energy-consuming action ran.
    Acted,
    /// A free action ended further processing (moved, died, dropped).
    Ended,
    /// The collaborator failed; nothing was charged.
    Failed,
}

impl Turn {
    const fn took_turn(self) -> bool {
        matches!(self, Self::Acted | Self::Ended)
    }
}

fn log_grant(entity: EntityId, raw: u32, outcome: GrantOutcome) {
    match outcome {
        GrantOutcome::Energy(amount) => tracing::trace!(%entity, raw, amount, "energy granted"),
        GrantOutcome::Banked { banked, discarded } => {
            tracing::trace!(%entity, raw, banked, discarded, "energy banked")
        }
        GrantOutcome::Discarded(amount) => {
            tracing::trace!(%entity, raw, amount, "energy discarded at ceiling")
        }
    }
}
