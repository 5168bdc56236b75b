//! Async host for the tick scheduler.
//!
//! This crate owns a [`game_core::TickScheduler`] on a background worker,
//! drives it from a fixed-rate timer (or manual steps), and exposes a
//! cloneable [`RuntimeHandle`] for transport layers.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`repository`] persists turn counters across restarts
//! - `workers` keeps the tick loop internal to the crate
pub mod api;
pub mod events;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, LifecycleEvent, TickEvent, Topic};
pub use repository::{
    CounterManifest, FileTurnCounterRepository, InMemoryTurnCounterRepo, RepositoryError,
    TurnCounterRepository,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, TickMode};
