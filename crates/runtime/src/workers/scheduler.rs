//! Scheduler worker that owns the authoritative [`TickScheduler`].
//!
//! Receives commands from [`crate::RuntimeHandle`], runs ticks on a timer or
//! on request, and publishes tick events to the [`EventBus`]. Nothing else
//! touches the scheduler, so a tick is never interleaved with a command.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use game_core::{
    Collaborators, EnergyState, EntityId, EntitySpec, RegionId, RegionSpec, TickError,
    TickReport, TickScheduler, TurnClockSnapshot, TurnCounters,
};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, TickEvent};
use crate::repository::TurnCounterRepository;

/// Commands that can be sent to the scheduler worker
pub(crate) enum Command {
    /// Run one tick now (manual mode, or an extra tick in timer mode).
    Step {
        reply: oneshot::Sender<Result<TickReport>>,
    },
    AddRegion {
        id: RegionId,
        spec: RegionSpec,
        reply: oneshot::Sender<Result<()>>,
    },
    Spawn {
        spec: EntitySpec,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    /// Re-admit a previously known entity under its old id.
    Restore {
        id: EntityId,
        spec: EntitySpec,
        reply: oneshot::Sender<Result<()>>,
    },
    EnergyState {
        entity: EntityId,
        reply: oneshot::Sender<Option<EnergyState>>,
    },
    TurnCounters {
        entity: EntityId,
        reply: oneshot::Sender<Option<TurnCounters>>,
    },
    Snapshot {
        reply: oneshot::Sender<TurnClockSnapshot>,
    },
    /// Persist turn counters now.
    Checkpoint { reply: oneshot::Sender<Result<()>> },
    /// Save and stop.
    Shutdown,
}

/// Background task that runs the tick loop.
pub(crate) struct SchedulerWorker {
    scheduler: TickScheduler,
    collaborators: Collaborators,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    repository: Option<Arc<dyn TurnCounterRepository>>,
    tick_period: Option<Duration>,
    checkpoint_interval: u64,
}

impl SchedulerWorker {
    pub(crate) fn new(
        scheduler: TickScheduler,
        collaborators: Collaborators,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        repository: Option<Arc<dyn TurnCounterRepository>>,
        tick_period: Option<Duration>,
        checkpoint_interval: u64,
    ) -> Self {
        info!(
            global_tick = %scheduler.global_tick(),
            regions = scheduler.registry().region_count(),
            tick_period = ?tick_period,
            "SchedulerWorker initialized"
        );

        Self {
            scheduler,
            collaborators,
            command_rx,
            event_bus,
            repository,
            tick_period,
            checkpoint_interval,
        }
    }

    /// Main worker loop.
    ///
    /// Returns when shut down (after a final save) or when a tick halts.
    pub(crate) async fn run(mut self) -> Result<()> {
        let mut ticker = self.tick_period.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            // A slow tick never causes a burst of catch-up ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });

        loop {
            tokio::select! {
                biased;
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(Command::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd)?,
                    }
                }
                _ = next_tick(&mut ticker) => {
                    self.run_tick()?;
                }
            }
        }

        info!(global_tick = %self.scheduler.global_tick(), "SchedulerWorker stopping");
        self.save_counters()
    }

    fn handle_command(&mut self, cmd: Command) -> std::result::Result<(), TickError> {
        match cmd {
            Command::Step { reply } => {
                let result = self.run_tick();
                let halted = result.as_ref().err().cloned();
                if reply.send(result.map_err(RuntimeError::from)).is_err() {
                    debug!("Step reply channel closed (caller dropped)");
                }
                if let Some(error) = halted {
                    return Err(error);
                }
            }
            Command::AddRegion { id, spec, reply } => {
                let result = self.scheduler.add_region(id, spec).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("AddRegion reply channel closed (caller dropped)");
                }
            }
            Command::Spawn { spec, reply } => {
                let result = self.scheduler.spawn(spec).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("Spawn reply channel closed (caller dropped)");
                }
            }
            Command::Restore { id, spec, reply } => {
                let result = self.scheduler.restore_entity(id, spec).map_err(Into::into);
                if reply.send(result).is_err() {
                    debug!("Restore reply channel closed (caller dropped)");
                }
            }
            Command::EnergyState { entity, reply } => {
                if reply
                    .send(self.scheduler.entity_energy_state(entity))
                    .is_err()
                {
                    debug!("EnergyState reply channel closed (caller dropped)");
                }
            }
            Command::TurnCounters { entity, reply } => {
                if reply.send(self.scheduler.turn_counters(entity)).is_err() {
                    debug!("TurnCounters reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.scheduler.save_turn_counters()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Checkpoint { reply } => {
                if reply.send(self.save_counters()).is_err() {
                    debug!("Checkpoint reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
        Ok(())
    }

    /// Runs one tick and publishes its outcome.
    fn run_tick(&mut self) -> std::result::Result<TickReport, TickError> {
        let mut env = self.collaborators.env();
        match self.scheduler.tick(&mut env) {
            Ok(report) => {
                self.event_bus
                    .publish(Event::Tick(TickEvent::Completed(Box::new(report.clone()))));
                self.maybe_checkpoint(&report);
                Ok(report)
            }
            Err(error) => {
                error!(%error, "tick aborted, halting scheduler");
                self.event_bus.publish(Event::Tick(TickEvent::Halted {
                    error: error.clone(),
                }));
                Err(error)
            }
        }
    }

    fn maybe_checkpoint(&self, report: &TickReport) {
        if self.checkpoint_interval == 0 || !report.tick.is_multiple_of(self.checkpoint_interval) {
            return;
        }
        if let Err(error) = self.save_counters() {
            warn!(tick = %report.tick, %error, "turn counter checkpoint failed");
        }
    }

    fn save_counters(&self) -> Result<()> {
        let Some(repository) = &self.repository else {
            return Ok(());
        };
        repository.save(&self.scheduler.save_turn_counters())?;
        Ok(())
    }
}

/// Resolves on the next timer tick, or never in manual mode.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
