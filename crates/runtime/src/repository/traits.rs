//! Repository contract for saving and loading turn counters.

use game_core::TurnClockSnapshot;

use super::error::Result;

/// Persistence hook for the scheduler's turn clock.
///
/// The runtime loads once at build time, checkpoints periodically after a
/// tick returns, and saves on shutdown. Implementations never see a
/// snapshot taken mid-tick.
pub trait TurnCounterRepository: Send + Sync {
    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &TurnClockSnapshot) -> Result<()>;

    /// Latest stored snapshot, or `None` on a fresh start.
    fn load(&self) -> Result<Option<TurnClockSnapshot>>;
}
