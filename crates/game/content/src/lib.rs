//! Data-driven scheduler content and loaders.
//!
//! This crate turns TOML data files into values the scheduler consumes:
//! - Scheduler configuration (thresholds, world-tick cadence, time factors)
//! - Region catalogues (depth, ambient time factor, safety and persistence)
//!
//! A [`RegionCatalog`] also acts as a [`game_core::LevelGenerator`], so
//! regions created on first arrival take their parameters from data.

pub mod regions;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use regions::RegionCatalog;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, RegionLoader};
