//! Opaque actions as the scheduler sees them.
//!
//! The scheduler never interprets a command. It only needs to know whether
//! executing it costs energy and how much, and what happened to the actor's
//! membership afterwards (still here, moved region, died, disconnected).
mod queue;

use arrayvec::ArrayVec;

use crate::state::RegionId;

pub use queue::ActionQueue;

/// Identifier of a queued action, unique per player queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u64);

/// Opaque command handed through to the command interpreter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    pub code: u32,
    pub args: ArrayVec<i32, 4>,
}

impl Command {
    pub fn new(code: u32) -> Self {
        Self {
            code,
            args: ArrayVec::new(),
        }
    }

    pub fn with_arg(mut self, arg: i32) -> Self {
        if self.args.try_push(arg).is_err() {
            tracing::warn!(code = self.code, "command argument dropped, list full");
        }
        self
    }
}

/// Energy cost of executing an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCost {
    /// Inspection and UI commands; the actor may chain another action at once.
    Free,
    /// One full turn at the region's action threshold.
    Turn,
    /// An exact amount, capped at the threshold when charged.
    Energy(u32),
}

impl ActionCost {
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Energy to deduct at `threshold`. Never more than one full turn, so an
    /// actor that passed the readiness gate can always pay.
    pub const fn resolve(&self, threshold: u32) -> u32 {
        match *self {
            Self::Free => 0,
            Self::Turn => threshold,
            Self::Energy(amount) => {
                if amount > threshold {
                    threshold
                } else {
                    amount
                }
            }
        }
    }
}

/// A player command waiting in an [`ActionQueue`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueuedAction {
    pub id: ActionId,
    pub command: Command,
    pub cost: ActionCost,
    /// Further repetitions after this one (e.g. "tunnel 20 times").
    pub repeat: u32,
}

impl QueuedAction {
    pub fn new(id: ActionId, command: Command, cost: ActionCost) -> Self {
        Self {
            id,
            command,
            cost,
            repeat: 0,
        }
    }

    pub fn repeating(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }
}

/// What happened to the actor once an action (or AI turn) ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionOutcome {
    /// Still in place; nothing for the scheduler to do.
    Completed,
    /// Took stairs/portal/recall; region membership changes at end of tick.
    ChangedRegion(RegionId),
    /// Killed as a consequence of its own action.
    Died,
    /// Connection dropped while acting.
    Disconnected,
}

impl ActionOutcome {
    /// True if the actor must not be processed further this tick.
    pub const fn ends_processing(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Decision returned by the AI dispatcher for one creature turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiDecision {
    /// The creature acted.
    Act {
        cost: ActionCost,
        outcome: ActionOutcome,
    },
    /// Nothing worth doing; energy is kept.
    Hold,
}
