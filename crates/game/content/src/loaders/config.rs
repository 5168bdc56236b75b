//! Scheduler configuration loader.

use std::path::Path;

use game_core::SchedulerConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for scheduler configuration from TOML files.
///
/// Missing keys fall back to [`SchedulerConfig::default`]. The result is
/// validated before it is returned, so a loaded config is always usable.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<SchedulerConfig> {
        let content = read_file(path)?;
        let config = Self::load_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

        tracing::info!(path = %path.display(), "scheduler config loaded");
        Ok(config)
    }

    /// Parse and validate config data from a TOML string.
    pub fn load_str(content: &str) -> LoadResult<SchedulerConfig> {
        let config: SchedulerConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid scheduler config: {}", e))?;

        Ok(config)
    }
}
