//! Deterministic turn and energy scheduling for a tick-driven multiplayer
//! dungeon.
//!
//! `game-core` decides, every fixed server tick, which players and creatures
//! get to act and what that costs. Hosts own a [`TickScheduler`], feed it
//! collaborators through [`env::TickEnv`], and call [`TickScheduler::tick`]
//! from their fixed-rate timer. There is no I/O and no async here; supporting
//! crates depend on the types re-exported below.
pub mod action;
pub mod config;
pub mod energy;
pub mod engine;
pub mod env;
pub mod error;
pub mod policy;
pub mod state;
pub mod time;

pub use action::{
    ActionCost, ActionId, ActionOutcome, ActionQueue, AiDecision, Command, QueuedAction,
};
pub use config::{CategoryOverride, ConfigError, SchedulerConfig, ThresholdStep};
pub use energy::{EnergyAccount, EnergyLimits, Speed, energy_for_speed};
pub use engine::{
    EnergyState, InvariantViolation, RegionChange, SchedulerError, TickError, TickReport,
    TickScheduler,
};
pub use env::{
    ActionError, AiDispatcher, Collaborators, CommandInterpreter, InputBuffer, InputEvent,
    InputSource, LevelGenerator, LifecycleObserver, RemovalReason, SightOracle, TickEnv,
    WorldEffects, WorldTickContext, WorldTickError, WorldTicker,
};
pub use error::{ErrorSeverity, GameError};
pub use policy::{BehaviorProfile, CategoryTable, EntityCategory, IncapacitationPolicy};
pub use state::{
    Entity, EntityId, EntitySpec, Incapacitation, Lifecycle, Region, RegionFlags, RegionId,
    RegionRegistry, RegionSpec, Tick, TimeEffect, TimeEffectKind,
};
pub use time::{
    ClockError, TimeDilationResolver, TimeFactor, TurnClock, TurnClockSnapshot, TurnCounters,
};
