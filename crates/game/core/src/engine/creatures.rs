//! Phase 3: one AI turn for every creature that has not acted yet.

use crate::action::AiDecision;
use crate::env::TickEnv;
use crate::error::log_isolated;
use crate::state::EntityKey;

use super::{InvariantViolation, TickReport, TickScheduler, Turn};

impl TickScheduler {
    pub(super) fn creature_phase(
        &mut self,
        env: &mut TickEnv<'_>,
        report: &mut TickReport,
    ) -> Result<(), InvariantViolation> {
        for region_id in self.registry.region_ids() {
            for key in self.registry.residents(region_id) {
                let Some((entity, region)) = self.registry.entity_with_region(key) else {
                    continue;
                };
                let ready = !entity.is_player()
                    && entity.is_active()
                    && !entity.acted
                    && entity.can_act
                    && entity.account.is_ready(region.action_threshold);
                if !ready {
                    continue;
                }

                if self.creature_turn(env, key, report)? == Turn::Acted {
                    report.creature_actions += 1;
                }
            }
        }

        // Everyone starts the next tick fresh, whatever happened above.
        for key in self.registry.roster().to_vec() {
            if let Some(entity) = self.registry.get_mut(key) {
                entity.acted = false;
            }
        }
        Ok(())
    }

    pub(super) fn creature_turn(
        &mut self,
        env: &mut TickEnv<'_>,
        key: EntityKey,
        report: &mut TickReport,
    ) -> Result<Turn, InvariantViolation> {
        let Some((entity, region)) = self.registry.entity_with_region(key) else {
            return Ok(Turn::Waiting);
        };
        let id = entity.id;
        let threshold = region.action_threshold;

        let decision = match env.ai.dispatch(entity, region) {
            Ok(decision) => decision,
            Err(error) => {
                log_isolated("creature turn", &error);
                report.failed_actions += 1;
                return Ok(Turn::Failed);
            }
        };
        let AiDecision::Act { cost, outcome } = decision else {
            return Ok(Turn::Waiting);
        };

        let Some(entity) = self.registry.get_mut(key) else {
            return Ok(Turn::Waiting);
        };
        let amount = cost.resolve(threshold);
        let energy = entity.account.energy();
        if !entity.account.consume(amount) {
            return Err(InvariantViolation::ActedWithoutEnergy {
                entity: id,
                energy,
                cost: amount,
            });
        }
        entity.acted = true;
        tracing::debug!(entity = %id, cost = amount, ?outcome, "creature action");

        self.apply_outcome(key, outcome);
        Ok(if cost.is_free() {
            Turn::Ended
        } else {
            Turn::Acted
        })
    }
}
