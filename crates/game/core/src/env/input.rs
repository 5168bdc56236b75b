//! Transport input drained at the start of every tick.

use std::collections::VecDeque;

use crate::action::{ActionId, QueuedAction};
use crate::state::{EntityId, Incapacitation, TimeEffect, TimeEffectKind};

/// A request from outside the scheduler, applied during the pre-turn phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputEvent {
    /// Appends to the player's action queue.
    Queue {
        entity: EntityId,
        action: QueuedAction,
    },
    /// Cancels a pending action before it runs.
    Withdraw { entity: EntityId, action: ActionId },
    /// Replaces everything pending, including a repeat counter.
    Supersede {
        entity: EntityId,
        action: QueuedAction,
    },
    /// Connection lost: pending actions are dropped and the entity is removed
    /// at the end of the tick.
    Disconnect { entity: EntityId },
    SetRunning { entity: EntityId, running: bool },
    SetStatus {
        entity: EntityId,
        status: Incapacitation,
    },
    AddTimeEffect { entity: EntityId, effect: TimeEffect },
    /// Ends an effect early (dispel, cure).
    RemoveTimeEffect {
        entity: EntityId,
        kind: TimeEffectKind,
    },
}

impl InputEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Queue { entity, .. }
            | Self::Withdraw { entity, .. }
            | Self::Supersede { entity, .. }
            | Self::Disconnect { entity }
            | Self::SetRunning { entity, .. }
            | Self::SetStatus { entity, .. }
            | Self::AddTimeEffect { entity, .. }
            | Self::RemoveTimeEffect { entity, .. } => *entity,
        }
    }
}

/// Source of transport input.
pub trait InputSource: Send {
    /// Takes every event received since the last call, oldest first.
    fn drain(&mut self) -> Vec<InputEvent>;
}

/// In-process FIFO input source; the runtime pushes into it between ticks.
#[derive(Clone, Debug, Default)]
pub struct InputBuffer {
    pending: VecDeque<InputEvent>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl InputSource for InputBuffer {
    fn drain(&mut self) -> Vec<InputEvent> {
        self.pending.drain(..).collect()
    }
}
