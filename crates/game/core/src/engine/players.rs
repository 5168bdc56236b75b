//! Phase 2: players drain their command queues in registration order.

use crate::env::TickEnv;
use crate::error::{GameError, log_isolated};
use crate::state::EntityKey;

use super::{InvariantViolation, TickReport, TickScheduler, Turn};

impl TickScheduler {
    pub(super) fn player_phase(
        &mut self,
        env: &mut TickEnv<'_>,
        report: &mut TickReport,
    ) -> Result<(), InvariantViolation> {
        for key in self.registry.roster().to_vec() {
            let Some((entity, region)) = self.registry.entity_with_region(key) else {
                continue;
            };
            let ready = entity.is_player()
                && entity.is_active()
                && !entity.acted
                && entity.can_act
                && entity.account.is_ready(region.action_threshold);
            if !ready {
                continue;
            }

            let turn = self.player_turn(env, key, report)?;
            if turn == Turn::Acted {
                report.player_actions += 1;
            }
            if turn.took_turn()
                && let Some(entity) = self.registry.get_mut(key)
            {
                entity.acted = true;
            }
        }

        self.announce_transitions(env);
        Ok(())
    }

    /// Runs queued commands for one player: free actions loop (up to the
    /// per-tick budget), the first energy-consuming action ends the turn.
    pub(super) fn player_turn(
        &mut self,
        env: &mut TickEnv<'_>,
        key: EntityKey,
        report: &mut TickReport,
    ) -> Result<Turn, InvariantViolation> {
        let mut free_actions = 0;

        loop {
            let Some((entity, region)) = self.registry.entity_with_region(key) else {
                return Ok(Turn::Waiting);
            };
            if !entity.is_active() {
                return Ok(Turn::Ended);
            }
            let Some(action) = entity.queue().and_then(|queue| queue.peek()).cloned() else {
                return Ok(Turn::Waiting);
            };
            if action.cost.is_free() && free_actions >= self.config.max_free_actions_per_tick {
                tracing::debug!(entity = %entity.id, "free action budget exhausted");
                return Ok(Turn::Waiting);
            }

            let id = entity.id;
            let threshold = region.action_threshold;
            let result = env.commands.execute(entity, region, &action);

            let Some(entity) = self.registry.get_mut(key) else {
                return Ok(Turn::Waiting);
            };
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(error) => {
                    log_isolated("player action", &error);
                    report.failed_actions += 1;
                    // Transient failures retry next tick; anything else is
                    // dropped so a bad command cannot wedge the queue.
                    if !error.severity().is_recoverable()
                        && let Some(queue) = entity.queue_mut()
                    {
                        queue.discard_head();
                    }
                    return Ok(Turn::Failed);
                }
            };

            if let Some(queue) = entity.queue_mut() {
                queue.pop();
            }

            let spends_energy = !action.cost.is_free();
            if spends_energy {
                let cost = action.cost.resolve(threshold);
                let energy = entity.account.energy();
                if !entity.account.consume(cost) {
                    return Err(InvariantViolation::ActedWithoutEnergy {
                        entity: id,
                        energy,
                        cost,
                    });
                }
            } else {
                free_actions += 1;
                report.free_actions += 1;
            }
            tracing::debug!(
                entity = %id,
                action = action.id.0,
                code = action.command.code,
                ?outcome,
                "player action"
            );

            self.apply_outcome(key, outcome);
            if spends_energy {
                return Ok(Turn::Acted);
            }
            if outcome.ends_processing() {
                return Ok(Turn::Ended);
            }
        }
    }
}
