//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! stepping the scheduler, submitting transport input, or streaming events
//! from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{
    ActionId, EnergyState, EntityId, EntitySpec, InputEvent, QueuedAction, RegionId, RegionSpec,
    TickReport, TurnClockSnapshot, TurnCounters,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    input_tx: mpsc::Sender<InputEvent>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        input_tx: mpsc::Sender<InputEvent>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            command_tx,
            input_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Run one tick immediately and return its report.
    ///
    /// This is how manual mode advances. In timer mode it inserts an extra
    /// tick between timer ticks.
    pub async fn step(&self) -> Result<TickReport> {
        self.request(|reply| Command::Step { reply }).await?
    }

    /// Queue transport input for the next tick's pre-turn phase.
    pub async fn submit(&self, event: InputEvent) -> Result<()> {
        self.input_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::InputChannelClosed)
    }

    /// Append an action to a player's queue (applied at the next tick).
    pub async fn queue_action(&self, entity: EntityId, action: QueuedAction) -> Result<()> {
        self.submit(InputEvent::Queue { entity, action }).await
    }

    /// Cancel a pending action before it runs.
    pub async fn withdraw(&self, entity: EntityId, action: ActionId) -> Result<()> {
        self.submit(InputEvent::Withdraw { entity, action }).await
    }

    /// Report a lost connection. The entity is removed at the end of the
    /// next tick.
    pub async fn disconnect(&self, entity: EntityId) -> Result<()> {
        self.submit(InputEvent::Disconnect { entity }).await
    }

    pub async fn add_region(&self, id: RegionId, spec: RegionSpec) -> Result<()> {
        self.request(|reply| Command::AddRegion { id, spec, reply })
            .await?
    }

    pub async fn spawn(&self, spec: EntitySpec) -> Result<EntityId> {
        self.request(|reply| Command::Spawn { spec, reply }).await?
    }

    /// Re-admit a returning entity so its saved turn counters resume.
    pub async fn restore_entity(&self, id: EntityId, spec: EntitySpec) -> Result<()> {
        self.request(|reply| Command::Restore { id, spec, reply })
            .await?
    }

    pub async fn energy_state(&self, entity: EntityId) -> Result<Option<EnergyState>> {
        self.request(|reply| Command::EnergyState { entity, reply })
            .await
    }

    pub async fn turn_counters(&self, entity: EntityId) -> Result<Option<TurnCounters>> {
        self.request(|reply| Command::TurnCounters { entity, reply })
            .await
    }

    /// Current turn clock, as the repository would store it.
    pub async fn snapshot(&self) -> Result<TurnClockSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Persist turn counters now, outside the checkpoint cadence.
    pub async fn checkpoint(&self) -> Result<()> {
        self.request(|reply| Command::Checkpoint { reply }).await?
    }

    /// Ask the worker to save and stop. Completion is observed through
    /// [`crate::Runtime::shutdown`].
    pub(crate) async fn request_shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Tick` - Tick completion and halts
    /// - `Topic::Lifecycle` - Region transitions, removals, region teardown
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut tick_rx = handle.subscribe(Topic::Tick);
    /// while let Ok(event) = tick_rx.recv().await {
    ///     // Handle tick events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
