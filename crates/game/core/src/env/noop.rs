//! Collaborators that do nothing, for hosts without a world attached and for
//! tests.

use crate::action::{ActionOutcome, AiDecision, QueuedAction};
use crate::env::{
    ActionError, AiDispatcher, CommandInterpreter, InputEvent, InputSource, LevelGenerator,
    LifecycleObserver, RemovalReason, SightOracle, WorldTickContext, WorldTickError, WorldTicker,
};
use crate::state::{Entity, EntityId, Region, RegionId, RegionSpec};
use crate::time::TurnCounters;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInput;

impl InputSource for NoopInput {
    fn drain(&mut self) -> Vec<InputEvent> {
        Vec::new()
    }
}

/// Every command completes in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInterpreter;

impl CommandInterpreter for NoopInterpreter {
    fn execute(
        &mut self,
        _actor: &Entity,
        _region: &Region,
        _action: &QueuedAction,
    ) -> Result<ActionOutcome, ActionError> {
        Ok(ActionOutcome::Completed)
    }
}

/// Creatures never find anything worth doing.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleAi;

impl AiDispatcher for IdleAi {
    fn dispatch(&mut self, _actor: &Entity, _region: &Region) -> Result<AiDecision, ActionError> {
        Ok(AiDecision::Hold)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopWorld;

impl WorldTicker for NoopWorld {
    fn run(&mut self, _region: &Region, _context: &WorldTickContext) -> Result<(), WorldTickError> {
        Ok(())
    }
}

/// Nothing is ever in view.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSight;

impl SightOracle for NoopSight {
    fn hostile_in_view(&self, _entity: EntityId, _region: RegionId) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {
    fn on_region_emptied(&mut self, _region: RegionId) {}

    fn on_entity_region_changed(&mut self, _entity: EntityId, _from: RegionId, _to: RegionId) {}

    fn on_entity_removed(
        &mut self,
        _entity: EntityId,
        _reason: RemovalReason,
        _counters: Option<TurnCounters>,
    ) {
    }
}

/// Creates plain regions whose depth equals their id.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatGenerator;

impl LevelGenerator for FlatGenerator {
    fn generate(&mut self, region: RegionId) -> Option<RegionSpec> {
        Some(RegionSpec::at_depth(region.0))
    }
}
