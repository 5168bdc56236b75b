//! Adapters between the scheduler's collaborator traits and the runtime's
//! channels.

use tokio::sync::mpsc;

use game_core::{
    EntityId, InputEvent, InputSource, LifecycleObserver, RegionId, RemovalReason, TurnCounters,
};

use crate::events::{Event, EventBus, LifecycleEvent};

/// Input source fed by [`crate::RuntimeHandle::submit`].
///
/// Drains the host-provided source first, then everything that arrived on
/// the channel since the previous tick.
pub(crate) struct ChannelInput {
    rx: mpsc::Receiver<InputEvent>,
    inner: Box<dyn InputSource>,
}

impl ChannelInput {
    pub(crate) fn new(rx: mpsc::Receiver<InputEvent>, inner: Box<dyn InputSource>) -> Self {
        Self { rx, inner }
    }
}

impl InputSource for ChannelInput {
    fn drain(&mut self) -> Vec<InputEvent> {
        let mut events = self.inner.drain();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Forwards lifecycle callbacks to the host observer and mirrors them onto
/// [`crate::Topic::Lifecycle`].
pub(crate) struct PublishingObserver {
    inner: Box<dyn LifecycleObserver>,
    bus: EventBus,
}

impl PublishingObserver {
    pub(crate) fn new(inner: Box<dyn LifecycleObserver>, bus: EventBus) -> Self {
        Self { inner, bus }
    }
}

impl LifecycleObserver for PublishingObserver {
    fn on_region_emptied(&mut self, region: RegionId) {
        self.inner.on_region_emptied(region);
        self.bus
            .publish(Event::Lifecycle(LifecycleEvent::RegionEmptied { region }));
    }

    fn on_entity_region_changed(&mut self, entity: EntityId, from: RegionId, to: RegionId) {
        self.inner.on_entity_region_changed(entity, from, to);
        self.bus
            .publish(Event::Lifecycle(LifecycleEvent::RegionChanged { entity, from, to }));
    }

    fn on_entity_removed(
        &mut self,
        entity: EntityId,
        reason: RemovalReason,
        counters: Option<TurnCounters>,
    ) {
        self.inner.on_entity_removed(entity, reason, counters);
        self.bus
            .publish(Event::Lifecycle(LifecycleEvent::EntityRemoved {
                entity,
                reason,
                counters,
            }));
    }

    fn has_persistent_claims(&self, region: RegionId) -> bool {
        self.inner.has_persistent_claims(region)
    }
}
