//! High-level runtime orchestrator.
//!
//! The runtime owns the scheduler worker, wires up command/input/event
//! channels, and exposes a builder-based API for hosts to drive ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use game_core::env::{NoopInput, NoopObserver};
use game_core::{
    Collaborators, InputEvent, InputSource, LifecycleObserver, RegionId, RegionSpec,
    SchedulerConfig, TickScheduler,
};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::repository::TurnCounterRepository;
use crate::workers::{ChannelInput, Command, PublishingObserver, SchedulerWorker};

/// How ticks are triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// Fixed-rate timer at `tick_rate_hz`. Late ticks are skipped, never
    /// bunched.
    Timer,
    /// Only [`RuntimeHandle::step`] advances the clock. Used by tests and
    /// offline replay.
    Manual,
}

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub scheduler: SchedulerConfig,
    pub mode: TickMode,
    pub tick_rate_hz: u32,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub input_buffer_size: usize,
    /// Save turn counters every N ticks. Zero disables periodic checkpoints;
    /// counters are still saved on shutdown.
    pub checkpoint_interval: u64,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_RATE_HZ: u32 = 10;

    /// Timer period, or `None` in manual mode.
    pub fn tick_period(&self) -> Result<Option<Duration>> {
        match self.mode {
            TickMode::Manual => Ok(None),
            TickMode::Timer if self.tick_rate_hz == 0 => Err(RuntimeError::InvalidTickRate),
            TickMode::Timer => Ok(Some(Duration::from_secs(1) / self.tick_rate_hz)),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            mode: TickMode::Timer,
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            event_buffer_size: 100,
            command_buffer_size: 32,
            input_buffer_size: 1024,
            checkpoint_interval: 100,
        }
    }
}

/// Main runtime that hosts the tick loop
///
/// Design: Runtime owns the worker task and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: JoinHandle<Result<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// True once the worker has stopped (shut down or halted).
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Saves turn counters and stops the worker. If a tick halted the worker
    /// earlier, that [`RuntimeError::Halted`] is returned instead.
    pub async fn shutdown(self) -> Result<()> {
        if self.handle.request_shutdown().await.is_err() {
            tracing::debug!("scheduler worker already stopped");
        }

        self.worker.await.map_err(RuntimeError::WorkerJoin)?
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    collaborators: Collaborators,
    repository: Option<Arc<dyn TurnCounterRepository>>,
    regions: Vec<(RegionId, RegionSpec)>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            collaborators: Collaborators::noop(),
            repository: None,
            regions: Vec::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the scheduler configuration
    pub fn scheduler_config(mut self, scheduler: SchedulerConfig) -> Self {
        self.config.scheduler = scheduler;
        self
    }

    pub fn mode(mut self, mode: TickMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the collaborator set (defaults to an empty world)
    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Persist turn counters through `repository`
    ///
    /// A stored snapshot is loaded during [`RuntimeBuilder::build`].
    pub fn repository(mut self, repository: Arc<dyn TurnCounterRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Create a region before the first tick
    pub fn region(mut self, id: RegionId, spec: RegionSpec) -> Self {
        self.regions.push((id, spec));
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let tick_period = self.config.tick_period()?;

        let mut scheduler = TickScheduler::new(self.config.scheduler.clone())?;
        for (id, spec) in self.regions {
            scheduler.add_region(id, spec)?;
        }
        if let Some(repository) = &self.repository
            && let Some(snapshot) = repository.load()?
        {
            scheduler.load_turn_counters(snapshot)?;
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (input_tx, input_rx) = mpsc::channel::<InputEvent>(self.config.input_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, input_tx, event_bus.clone());

        let mut collaborators = self.collaborators;
        let host_input: Box<dyn InputSource> =
            std::mem::replace(&mut collaborators.input, Box::new(NoopInput));
        collaborators.input = Box::new(ChannelInput::new(input_rx, host_input));
        let host_observer: Box<dyn LifecycleObserver> =
            std::mem::replace(&mut collaborators.observer, Box::new(NoopObserver));
        collaborators.observer =
            Box::new(PublishingObserver::new(host_observer, event_bus.clone()));

        let worker = SchedulerWorker::new(
            scheduler,
            collaborators,
            command_rx,
            event_bus,
            self.repository,
            tick_period,
            self.config.checkpoint_interval,
        );

        let worker = tokio::spawn(worker.run());

        Ok(Runtime { handle, worker })
    }
}
