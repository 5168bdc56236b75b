//! Game time: how real ticks turn into energy (dilation) and how they are
//! counted (turn clock).
//!
//! [`TimeDilationResolver`] runs in the energize phase for every active
//! entity and scales its energy grant by a [`TimeFactor`]. [`TurnClock`]
//! owns the global tick and the per-entity [`TurnCounters`]; only the
//! scheduler advances it, and hosts move it in and out of storage as a
//! [`TurnClockSnapshot`].
mod clock;
mod dilation;

pub use clock::{ClockError, TurnClock, TurnClockSnapshot, TurnCounters};
pub use dilation::{Dilation, RunningState, TimeDilationResolver, TimeFactor};
