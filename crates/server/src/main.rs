//! Dungeon scheduler server.
//!
//! Composition root: loads configuration, restores turn counters, and runs
//! the tick loop until Ctrl-C. Collaborators are the no-op set (commands
//! complete, creatures hold); regions come from the catalogue, if any.
//!
//! ```bash
//! SCHEDULER_CONFIG=scheduler.toml REGION_CATALOG=regions.toml \
//!     cargo run -p dungeon-server
//! ```

mod config;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use game_content::{ConfigLoader, RegionCatalog, RegionLoader};
use game_core::{Collaborators, SchedulerConfig};
use runtime::{
    Event, FileTurnCounterRepository, Runtime, RuntimeConfig, TickEvent, TickMode, Topic,
};

use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let server_config = ServerConfig::from_env();
    let _log_guard = logging::setup_logging(&server_config.session_id)?;
    for warning in &server_config.warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!("Starting dungeon server");
    tracing::info!("Session ID: {}", server_config.session_id);
    tracing::info!("Tick rate: {} Hz", server_config.tick_rate_hz);
    tracing::info!("Save data: {}", server_config.save_data_dir.display());

    let scheduler = match &server_config.scheduler_config {
        Some(path) => ConfigLoader::load(path)?,
        None => SchedulerConfig::default(),
    };
    let catalog = match &server_config.region_catalog {
        Some(path) => RegionLoader::load(path)?,
        None => RegionCatalog::new().with_fallback(true),
    };

    let repository = FileTurnCounterRepository::new(
        &server_config.save_data_dir,
        server_config.session_id.clone(),
    )
    .context("failed to open save data directory")?;

    let mut builder = Runtime::builder()
        .config(RuntimeConfig {
            scheduler,
            mode: TickMode::Timer,
            tick_rate_hz: server_config.tick_rate_hz,
            checkpoint_interval: server_config.checkpoint_interval,
            ..RuntimeConfig::default()
        })
        .repository(Arc::new(repository));
    for (id, spec) in catalog.preloaded() {
        builder = builder.region(id, spec);
    }
    let runtime = builder
        .collaborators(Collaborators::noop().with_generator(catalog))
        .build()
        .await?;

    tracing::info!("Runtime built, ticking");

    let mut ticks = runtime.subscribe(Topic::Tick);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("Ctrl-C received, shutting down");
                break;
            }
            event = ticks.recv() => match event {
                Ok(Event::Tick(TickEvent::Halted { error })) => {
                    tracing::error!(%error, "scheduler halted");
                    break;
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "tick event subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    runtime.shutdown().await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}
