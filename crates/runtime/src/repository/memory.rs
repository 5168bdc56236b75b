//! In-memory TurnCounterRepository implementation for tests and local runs.

use std::sync::RwLock;

use game_core::TurnClockSnapshot;

use super::error::{RepositoryError, Result};
use super::traits::TurnCounterRepository;

/// In-memory implementation of TurnCounterRepository.
#[derive(Default)]
pub struct InMemoryTurnCounterRepo {
    snapshot: RwLock<Option<TurnClockSnapshot>>,
    saves: RwLock<u64>,
}

impl InMemoryTurnCounterRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `snapshot` already stored, as if from an earlier run.
    pub fn with_snapshot(snapshot: TurnClockSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: RwLock::new(0),
        }
    }

    /// How many times `save` succeeded.
    pub fn save_count(&self) -> u64 {
        self.saves.read().map(|saves| *saves).unwrap_or(0)
    }
}

impl TurnCounterRepository for InMemoryTurnCounterRepo {
    fn save(&self, snapshot: &TurnClockSnapshot) -> Result<()> {
        let mut stored = self
            .snapshot
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *stored = Some(snapshot.clone());

        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<TurnClockSnapshot>> {
        let stored = self
            .snapshot
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(stored.clone())
    }
}
