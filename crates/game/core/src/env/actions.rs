//! Action execution collaborators: the command interpreter for players and
//! AI dispatch for creatures.

use crate::action::{ActionOutcome, AiDecision, QueuedAction};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{Entity, EntityId, Region};

/// Failure of a single entity's action. Isolated to that entity.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The collaborator could not serve this entity right now.
    #[error("action handling unavailable for {0}")]
    Unavailable(EntityId),

    /// The command was malformed or not allowed.
    #[error("action rejected for {entity}: {reason}")]
    Rejected { entity: EntityId, reason: String },

    /// The collaborator hit an inconsistency of its own.
    #[error("action failed for {entity}: {reason}")]
    Internal { entity: EntityId, reason: String },
}

impl ActionError {
    pub fn rejected(entity: EntityId, reason: impl Into<String>) -> Self {
        Self::Rejected {
            entity,
            reason: reason.into(),
        }
    }
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unavailable(_) => ErrorSeverity::Recoverable,
            Self::Rejected { .. } => ErrorSeverity::Validation,
            Self::Internal { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "ACTION_UNAVAILABLE",
            Self::Rejected { .. } => "ACTION_REJECTED",
            Self::Internal { .. } => "ACTION_INTERNAL",
        }
    }
}

/// Executes opaque player commands.
///
/// The scheduler has already decided the actor may act and will charge the
/// action's declared cost on success. A returned error means nothing happened
/// and no energy is spent.
pub trait CommandInterpreter: Send {
    fn execute(
        &mut self,
        actor: &Entity,
        region: &Region,
        action: &QueuedAction,
    ) -> Result<ActionOutcome, ActionError>;
}

/// Chooses and performs one creature turn.
pub trait AiDispatcher: Send {
    fn dispatch(&mut self, actor: &Entity, region: &Region) -> Result<AiDecision, ActionError>;
}
