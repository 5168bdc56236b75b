//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and the scheduler
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ConfigError, SchedulerError, TickError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("scheduler worker command channel closed")]
    CommandChannelClosed,

    #[error("scheduler input channel closed")]
    InputChannelClosed,

    #[error("scheduler worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("scheduler worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("tick rate must be positive in timer mode")]
    InvalidTickRate,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("scheduler halted: {0}")]
    Halted(#[from] TickError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
