//! Scheduler-visible world state.
//!
//! Entities are owned by the [`RegionRegistry`] arena and referenced by
//! [`EntityKey`] while a tick runs. Only the scheduler changes region
//! membership, and only at the end of a tick.
mod common;
mod entity;
mod region;
mod registry;
mod status;

pub use common::{EntityId, RegionId, Tick};
pub use entity::{Connection, Control, Entity, EntitySpec, Lifecycle};
pub use region::{EntityKey, Region, RegionFlags, RegionSpec};
pub use registry::RegionRegistry;
pub use status::{Incapacitation, TimeEffect, TimeEffectKind, TimeEffects};
