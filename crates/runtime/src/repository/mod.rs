//! Repository layer for turn counters.
//!
//! The scheduler's only durable state is its turn clock: the global tick and
//! per-entity counters. Everything else (positions, inventories, regions) is
//! owned by collaborators and persisted by them.

mod error;
mod file;
mod memory;
mod traits;

pub use error::RepositoryError;
pub use file::{CounterManifest, FileTurnCounterRepository};
pub use memory::InMemoryTurnCounterRepo;
pub use traits::TurnCounterRepository;
