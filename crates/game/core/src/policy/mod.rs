//! Per-entity policies evaluated during a tick: who may act, and with what
//! category-specific coefficients.
//!
//! - [`EntityCategory`] is fixed at spawn and resolved once into a
//!   [`BehaviorProfile`] through the [`CategoryTable`]. Nothing in the tick
//!   looks at the category again.
//! - [`IncapacitationPolicy`] is the action gate used by the pre-turn phase.
//!   It also keeps each entity's `idle_since` marker current.
//! - [`RngOracle`] and [`compute_seed`] make the gate's override roll
//!   deterministic.
mod category;
mod incapacitation;
mod rng;

pub use category::{BehaviorProfile, CategoryTable, EntityCategory};
pub use incapacitation::IncapacitationPolicy;
pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};
