//! Server configuration from the environment.
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `SCHEDULER_CONFIG`    | TOML scheduler config (defaults if unset) |
//! | `REGION_CATALOG`      | TOML region catalogue                     |
//! | `TICK_RATE_HZ`        | Timer frequency                           |
//! | `SAVE_DATA_DIR`       | Turn counter directory                    |
//! | `CHECKPOINT_INTERVAL` | Ticks between counter checkpoints         |
//! | `GAME_SESSION_ID`     | Session name for saves and logs           |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use runtime::RuntimeConfig;

/// Settings assembled once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub scheduler_config: Option<PathBuf>,
    pub region_catalog: Option<PathBuf>,
    pub tick_rate_hz: u32,
    pub save_data_dir: PathBuf,
    pub checkpoint_interval: u64,
    pub session_id: String,
    /// Variables that were set but could not be parsed. Reported once logging
    /// is up, since the config is read before the subscriber exists.
    pub warnings: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scheduler_config: None,
            region_catalog: None,
            tick_rate_hz: RuntimeConfig::DEFAULT_TICK_RATE_HZ,
            save_data_dir: data_dir(),
            checkpoint_interval: RuntimeConfig::default().checkpoint_interval,
            session_id: "default".to_string(),
            warnings: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.scheduler_config = env::var("SCHEDULER_CONFIG").ok().map(PathBuf::from);
        config.region_catalog = env::var("REGION_CATALOG").ok().map(PathBuf::from);

        if let Some(rate) = read_env::<u32>("TICK_RATE_HZ", &mut config.warnings) {
            config.tick_rate_hz = rate.max(1);
        }

        if let Some(dir) = env::var("SAVE_DATA_DIR").ok().map(PathBuf::from) {
            config.save_data_dir = dir;
        }

        if let Some(interval) = read_env::<u64>("CHECKPOINT_INTERVAL", &mut config.warnings) {
            config.checkpoint_interval = interval;
        }

        if let Ok(session_id) = env::var("GAME_SESSION_ID")
            && !session_id.trim().is_empty()
        {
            config.session_id = session_id;
        }

        config
    }
}

fn read_env<T: FromStr>(key: &str, warnings: &mut Vec<String>) -> Option<T> {
    let raw = env::var(key).ok()?;
    parse_value(key, &raw, warnings)
}

fn parse_value<T: FromStr>(key: &str, raw: &str, warnings: &mut Vec<String>) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warnings.push(format!("ignoring {key}={raw:?}: not a valid value"));
            None
        }
    }
}

/// Platform data directory for saves
///
/// - macOS: `~/Library/Application Support/dungeon`
/// - Linux: `~/.local/share/dungeon` (or `$XDG_DATA_HOME/dungeon`)
/// - Windows: `%APPDATA%\dungeon`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "dungeon")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

/// Platform cache directory for logs
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "dungeon")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/dungeon"))
        .join("logs")
}
