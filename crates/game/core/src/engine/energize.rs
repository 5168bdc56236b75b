//! Phase 5: energy grants and turn counters.

use crate::energy::energy_for_speed;
use crate::env::TickEnv;
use crate::state::{EntityId, Tick};
use crate::time::RunningState;

use super::{InvariantViolation, TickScheduler, log_grant};

/// Per-entity counter update collected while granting energy.
struct TurnRecord {
    entity: EntityId,
    player_turns: u32,
    active: bool,
}

impl TickScheduler {
    /// Grants energy to every active entity, advances the global tick by one
    /// and records a turn for each entity, checking ledger and counter
    /// invariants as it goes.
    pub(super) fn energize_phase(
        &mut self,
        env: &mut TickEnv<'_>,
        now: Tick,
    ) -> Result<(), InvariantViolation> {
        let mut records = Vec::with_capacity(self.registry.entity_count());

        for key in self.registry.roster().to_vec() {
            let Some((entity, region)) = self.registry.entity_with_region(key) else {
                continue;
            };
            if !entity.is_active() {
                continue;
            }

            let dilation = self.dilation.resolve(entity, region, env.sight, now);
            let threshold = region.action_threshold;
            let limits = self.limits(threshold);
            let raw = dilation
                .factor
                .apply(energy_for_speed(entity.speed))
                .max(1);

            let Some(entity) = self.registry.get_mut(key) else {
                continue;
            };
            entity.time_effects.purge_expired(now);
            entity.time_bubble_factor = dilation.factor;
            if dilation.running == RunningState::Denied {
                entity.running = false;
                tracing::debug!(entity = %entity.id, "running stopped, hostile in view");
            }

            let outcome = entity.account.grant(raw, &limits);
            log_grant(entity.id, raw, outcome);

            let energy = entity.account.energy();
            if energy > limits.ceiling() {
                return Err(InvariantViolation::EnergyAboveCeiling {
                    entity: entity.id,
                    energy,
                    ceiling: limits.ceiling(),
                });
            }

            records.push(TurnRecord {
                entity: entity.id,
                player_turns: entity.account.accrue_charge(raw, threshold),
                active: entity.idle_since.is_none(),
            });
        }

        let previous = self.clock.global_tick();
        let advanced = self
            .clock
            .advance_global()
            .ok_or(InvariantViolation::CounterOverflow { entity: None })?;
        if advanced != now || advanced.0 != previous.0 + 1 {
            return Err(InvariantViolation::TickNotAdvanced {
                expected: now,
                actual: advanced,
            });
        }

        for record in records {
            let counters = self
                .clock
                .record_turn(record.entity, record.player_turns, record.active)
                .ok_or(InvariantViolation::CounterOverflow {
                    entity: Some(record.entity),
                })?;
            if !counters.is_consistent() {
                return Err(InvariantViolation::ActiveTurnAheadOfGame {
                    entity: record.entity,
                    active: counters.active_turn,
                    game: counters.game_turn,
                });
            }
        }
        Ok(())
    }
}
