//! Phase 1: input ingestion, action gating and the catch-up pass.

use crate::env::TickEnv;
use crate::error::log_isolated;
use crate::state::Tick;

use super::{InvariantViolation, TickReport, TickScheduler};

impl TickScheduler {
    pub(super) fn pre_turn_phase(
        &mut self,
        env: &mut TickEnv<'_>,
        now: Tick,
        report: &mut TickReport,
    ) -> Result<(), InvariantViolation> {
        self.ingest_input(env);
        self.gate_actions(now);
        self.catch_up_pass(env, report)?;
        self.settle_casualties();
        Ok(())
    }

    fn ingest_input(&mut self, env: &mut TickEnv<'_>) {
        for event in env.input.drain() {
            if let Err(error) = self.apply_input(event) {
                log_isolated("input", &error);
            }
        }
    }

    /// Evaluates the incapacitation policy once per entity; every later
    /// phase of this tick reuses the answer.
    fn gate_actions(&mut self, now: Tick) {
        for key in self.registry.roster().to_vec() {
            let Some(entity) = self.registry.get_mut(key) else {
                continue;
            };
            entity.can_act = entity.is_active() && self.incapacitation.can_act(entity, now);
        }
    }

    /// Gives one action to every entity that is saturated and holding banked
    /// energy, then folds the bank back into its ledger.
    ///
    /// Regions are visited in id order and residents in arrival order.
    fn catch_up_pass(
        &mut self,
        env: &mut TickEnv<'_>,
        report: &mut TickReport,
    ) -> Result<(), InvariantViolation> {
        for region_id in self.registry.region_ids() {
            let Some(threshold) = self.registry.region(region_id).map(|r| r.action_threshold)
            else {
                continue;
            };
            let limits = self.limits(threshold);

            for key in self.registry.residents(region_id) {
                let Some(entity) = self.registry.get(key) else {
                    continue;
                };
                if !entity.is_active() || !entity.can_act || !entity.account.has_backlog(&limits) {
                    continue;
                }

                let turn = if entity.is_player() {
                    self.player_turn(env, key, report)?
                } else {
                    self.creature_turn(env, key, report)?
                };
                if !turn.took_turn() {
                    continue;
                }

                report.catch_up_actions += 1;
                if let Some(entity) = self.registry.get_mut(key) {
                    entity.acted = true;
                    let restored = entity.account.restore_bank(&limits);
                    tracing::debug!(entity = %entity.id, restored, "catch-up action");
                }
            }
        }
        Ok(())
    }

    /// Death bookkeeping: the dead give up their pending commands and take no
    /// further part in this tick.
    fn settle_casualties(&mut self) {
        let deaths: Vec<_> = self.deferred.deaths().collect();
        for (key, id) in deaths {
            let Some(entity) = self.registry.get_mut(key) else {
                continue;
            };
            entity.can_act = false;
            let dropped = entity.queue_mut().map_or(0, |queue| queue.clear());
            tracing::debug!(entity = %id, dropped, "casualty settled");
        }
    }
}
