//! Per-entity energy ledger.

use super::table::MAX_TABLE_ENERGY;

/// Saturation limits for an entity in its current region.
///
/// `threshold` is both the cost of one full turn and the point at which
/// regular grants stop flowing into `energy`. `margin` is the largest grant a
/// single tick can produce; `threshold + margin` bounds the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnergyLimits {
    pub threshold: u32,
    pub margin: u32,
}

impl EnergyLimits {
    pub const fn new(threshold: u32, margin: u32) -> Self {
        Self { threshold, margin }
    }

    /// Limits for a threshold using the theoretical maximum single-tick grant
    /// for `max_time_factor` percent dilation.
    pub const fn for_threshold(threshold: u32, max_time_factor: u32) -> Self {
        Self {
            threshold,
            margin: max_frame_grant(max_time_factor),
        }
    }

    /// Upper bound on `energy` and on `energy + extra_energy`.
    pub const fn ceiling(&self) -> u32 {
        self.threshold.saturating_add(self.margin)
    }
}

/// Largest energy a single tick may grant under `max_time_factor` percent.
pub const fn max_frame_grant(max_time_factor: u32) -> u32 {
    let grant = MAX_TABLE_ENERGY.saturating_mul(max_time_factor) / 100;
    if grant == 0 { 1 } else { grant }
}

/// Where a grant ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Added to `energy`.
    Energy(u32),
    /// Added to the overflow bank; the rest (if any) was discarded.
    Banked { banked: u32, discarded: u32 },
    /// Ledger already at its ceiling; the whole grant was discarded.
    Discarded(u32),
}

/// Energy ledger of one entity.
///
/// `energy` gates actions. `extra_energy` banks frames received while the
/// entity was already saturated so fast-but-blocked entities lose nothing.
/// `charge` is an independent accumulator feeding the player-turn counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyAccount {
    energy: u32,
    extra_energy: u32,
    charge: u32,
}

impl EnergyAccount {
    pub const fn new() -> Self {
        Self {
            energy: 0,
            extra_energy: 0,
            charge: 0,
        }
    }

    /// Account starting with `energy` (used when restoring or spawning mid-turn).
    pub const fn with_energy(energy: u32) -> Self {
        Self {
            energy,
            extra_energy: 0,
            charge: 0,
        }
    }

    pub const fn energy(&self) -> u32 {
        self.energy
    }

    pub const fn extra_energy(&self) -> u32 {
        self.extra_energy
    }

    pub const fn charge(&self) -> u32 {
        self.charge
    }

    /// True once the entity can afford a turn at `threshold`.
    pub const fn is_ready(&self, threshold: u32) -> bool {
        self.energy >= threshold
    }

    /// Saturated and holding banked surplus: the entity could have acted but
    /// did not, and is owed a catch-up action.
    pub const fn has_backlog(&self, limits: &EnergyLimits) -> bool {
        self.energy >= limits.threshold && self.extra_energy > 0
    }

    /// Adds a tick's worth of energy.
    ///
    /// Below the threshold the grant goes to `energy`. At or above it, the
    /// grant is banked in `extra_energy` while `energy + extra_energy` stays
    /// below the ceiling; anything beyond is discarded.
    pub fn grant(&mut self, raw_energy: u32, limits: &EnergyLimits) -> GrantOutcome {
        if self.energy < limits.threshold {
            self.energy = self.energy.saturating_add(raw_energy);
            return GrantOutcome::Energy(raw_energy);
        }

        let held = self.energy.saturating_add(self.extra_energy);
        let room = limits.ceiling().saturating_sub(held);
        if room == 0 {
            return GrantOutcome::Discarded(raw_energy);
        }

        let banked = raw_energy.min(room);
        self.extra_energy += banked;
        GrantOutcome::Banked {
            banked,
            discarded: raw_energy - banked,
        }
    }

    /// Spends `amount` if affordable. Returns false and leaves the ledger
    /// untouched otherwise.
    pub fn consume(&mut self, amount: u32) -> bool {
        if self.energy >= amount {
            self.energy -= amount;
            true
        } else {
            false
        }
    }

    /// Folds the overflow bank back into `energy`, bounded by the ceiling.
    ///
    /// Called after a catch-up action so the banked frames are not lost.
    pub fn restore_bank(&mut self, limits: &EnergyLimits) -> u32 {
        let room = limits.ceiling().saturating_sub(self.energy);
        let restored = self.extra_energy.min(room);
        self.energy += restored;
        self.extra_energy = 0;
        restored
    }

    /// Re-applies the ceiling after the limits changed (e.g. a move to a
    /// deeper region with a higher threshold, or a lower one).
    pub fn clamp_to(&mut self, limits: &EnergyLimits) {
        let ceiling = limits.ceiling();
        self.energy = self.energy.min(ceiling);
        self.extra_energy = self.extra_energy.min(ceiling - self.energy);
    }

    /// Accumulates `raw_energy` into the charge and returns how many times it
    /// crossed `threshold`.
    pub fn accrue_charge(&mut self, raw_energy: u32, threshold: u32) -> u32 {
        if threshold == 0 {
            return 0;
        }
        self.charge = self.charge.saturating_add(raw_energy);
        let crossings = self.charge / threshold;
        self.charge %= threshold;
        crossings
    }
}
