//! Phase 4: time-driven region side effects.
//!
//! World ticks happen every `world_tick_interval` global ticks regardless of
//! entity speed. The world-tick count is derived from the global tick, so a
//! restored clock resumes the same day/night and respawn cadence.

use crate::env::{TickEnv, WorldEffects, WorldTickContext};
use crate::error::log_isolated;
use crate::state::{RegionFlags, Tick};

use super::{TickReport, TickScheduler};

impl TickScheduler {
    pub(super) fn world_tick_phase(
        &mut self,
        env: &mut TickEnv<'_>,
        now: Tick,
        report: &mut TickReport,
    ) {
        let interval = self.config.world_tick_interval;
        if !now.is_multiple_of(interval) {
            return;
        }

        let world_tick = now.0 / interval;
        let is_day = self.is_day(world_tick);
        let day_flipped = is_day != self.is_day(world_tick - 1);
        let effects = self.due_effects(world_tick);

        tracing::debug!(tick = %now, world_tick, is_day, ?effects, "world tick");

        for region in self.registry.regions() {
            let mut context = WorldTickContext {
                tick: now,
                world_tick,
                is_day,
                effects,
            };
            if day_flipped && region.flags.contains(RegionFlags::SURFACE) {
                context.effects |= WorldEffects::DAY_NIGHT;
            }

            if let Err(error) = env.world.run(region, &context) {
                log_isolated("world tick", &error);
            }
        }
        report.world_tick = true;
    }

    /// The first half of each day is daylight.
    fn is_day(&self, world_tick: u64) -> bool {
        let day_length = self.config.day_length;
        world_tick % day_length < day_length.div_ceil(2)
    }

    fn due_effects(&self, world_tick: u64) -> WorldEffects {
        let mut effects = WorldEffects::TRAP_DECAY;
        if world_tick % self.config.respawn_interval == 0 {
            effects |= WorldEffects::RESPAWN;
        }
        if world_tick % self.config.cleanup_interval == 0 {
            effects |= WorldEffects::CLEANUP;
        }
        if world_tick % self.config.structure_interval == 0 {
            effects |= WorldEffects::STRUCTURES;
        }
        effects
    }
}
