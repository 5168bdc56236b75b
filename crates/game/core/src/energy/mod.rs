//! Energy model: the speed table and the per-entity ledger.
//!
//! Every tick an entity earns energy from its speed; spending a threshold's
//! worth of energy buys one turn. `grant` and `consume` on [`EnergyAccount`]
//! are the whole rationing mechanism.
mod account;
mod table;

pub use account::{EnergyAccount, EnergyLimits, GrantOutcome, max_frame_grant};
pub use table::{MAX_TABLE_ENERGY, Speed, energy_for_speed};
