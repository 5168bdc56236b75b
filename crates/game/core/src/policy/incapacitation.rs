//! Whether an entity may act this tick.

use crate::config::SchedulerConfig;
use crate::policy::{PcgRng, RngOracle, RollContext, compute_seed};
use crate::state::{Entity, Tick};

/// Action gate combining connection state, blocking statuses and the
/// per-category override chance.
///
/// The override is rolled fresh every tick from a deterministic seed; a
/// success never carries over to the next tick.
#[derive(Clone, Debug)]
pub struct IncapacitationPolicy<R: RngOracle = PcgRng> {
    rng: R,
    game_seed: u64,
}

impl IncapacitationPolicy<PcgRng> {
    /// Policy rolling with [`PcgRng`] under the configured game seed.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(PcgRng, config.game_seed)
    }
}

impl<R: RngOracle> IncapacitationPolicy<R> {
    pub fn new(rng: R, game_seed: u64) -> Self {
        Self { rng, game_seed }
    }

    /// Decides whether `entity` may act at `now` and updates its
    /// `idle_since` marker accordingly.
    pub fn can_act(&self, entity: &mut Entity, now: Tick) -> bool {
        let allowed = self.evaluate(entity, now);

        if allowed {
            if let Some(since) = entity.idle_since.take() {
                tracing::debug!(
                    entity = %entity.id,
                    idle_ticks = now.since(since),
                    "entity resumed"
                );
            }
        } else if entity.idle_since.is_none() {
            entity.idle_since = Some(now);
        }

        allowed
    }

    fn evaluate(&self, entity: &Entity, now: Tick) -> bool {
        if !entity.is_connected() {
            return false;
        }
        if !entity.status.blocks() {
            return true;
        }

        let chance = entity.profile.override_chance;
        if chance == 0 {
            return false;
        }

        let seed = compute_seed(
            self.game_seed,
            now,
            entity.id,
            RollContext::IncapacitationOverride,
        );
        let overridden = self.rng.chance(seed, chance);
        if overridden {
            tracing::trace!(entity = %entity.id, status = ?entity.status, "status overridden");
        }
        overridden
    }
}
