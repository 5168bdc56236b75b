//! Per-player command queue.

use std::collections::VecDeque;

use super::{ActionId, QueuedAction};

/// FIFO of commands a player has sent but the scheduler has not yet run.
///
/// Anything still in the queue can be withdrawn. Once the scheduler pops an
/// action and charges its energy, it is gone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionQueue {
    pending: VecDeque<QueuedAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: QueuedAction) {
        self.pending.push_back(action);
    }

    /// Next action to run, if any.
    pub fn peek(&self) -> Option<&QueuedAction> {
        self.pending.front()
    }

    /// Consumes one execution of the head action.
    ///
    /// A repeating head stays in place with its counter decremented; the
    /// returned value is the execution that just happened.
    pub fn pop(&mut self) -> Option<QueuedAction> {
        let head = self.pending.front_mut()?;
        if head.repeat > 0 {
            head.repeat -= 1;
            return Some(QueuedAction {
                repeat: 0,
                ..head.clone()
            });
        }
        self.pending.pop_front()
    }

    /// Drops the head action outright, ignoring any repeat counter.
    pub fn discard_head(&mut self) -> Option<QueuedAction> {
        self.pending.pop_front()
    }

    /// Withdraws a pending action. Returns false if it is unknown or already ran.
    pub fn withdraw(&mut self, id: ActionId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|action| action.id != id);
        self.pending.len() != before
    }

    /// Replaces everything pending (including a repeating head) with `action`.
    pub fn supersede(&mut self, action: QueuedAction) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.pending.push_back(action);
        dropped
    }

    /// Cancels everything; returns how many actions were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
