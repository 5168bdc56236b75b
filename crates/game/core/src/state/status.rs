//! Blocking statuses and personal time effects.
//!
//! Time effects store `expires_at: Tick` and are purged once
//! `current_tick >= expires_at`, the same way regardless of how many ticks an
//! entity spent unable to act.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::SchedulerConfig;
use crate::state::Tick;

bitflags! {
    /// Statuses that prevent an entity from acting.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Incapacitation: u8 {
        const PARALYZED   = 1 << 0;
        const KNOCKED_OUT = 1 << 1;
        const STUNNED     = 1 << 2;
        /// Busy with a multi-tick activity (casting, digging, resting).
        const OCCUPIED    = 1 << 3;
    }
}

impl Incapacitation {
    /// True if any status blocks action.
    pub const fn blocks(self) -> bool {
        !self.is_empty()
    }
}

/// Personal effects that change how fast an entity perceives time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeEffectKind {
    Hasted,
    Slowed,
    /// Caught in a personal time bubble (temporal magic, stasis field).
    Chronal,
}

/// A single time effect with its rate and expiration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeEffect {
    pub kind: TimeEffectKind,
    /// Rate multiplier in percent (100 = no change).
    pub percent: u32,
    pub expires_at: Tick,
}

/// Active time effects on an entity, bounded per entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeEffects {
    effects: ArrayVec<TimeEffect, { SchedulerConfig::MAX_TIME_EFFECTS }>,
}

impl TimeEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Adds an effect, replacing any effect of the same kind.
    pub fn add(&mut self, effect: TimeEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            *existing = effect;
            return;
        }

        // One slot per kind, so capacity is never exceeded.
        if self.effects.try_push(effect).is_err() {
            tracing::warn!(kind = %effect.kind, "time effect set full, effect dropped");
        }
    }

    /// Removes an effect immediately.
    pub fn remove(&mut self, kind: TimeEffectKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    /// Drops every effect expired at `now`.
    pub fn purge_expired(&mut self, now: Tick) {
        self.effects.retain(|e| e.expires_at > now);
    }

    /// Iterates over effects active at `now`.
    pub fn active(&self, now: Tick) -> impl Iterator<Item = &TimeEffect> {
        self.effects.iter().filter(move |e| e.expires_at > now)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
