//! Plan: the ordered actions for one main phase plus an execution cursor.

use crate::core::action::Action;

/// Ordered sequence of actions produced for the current main phase.
///
/// Owned solely by the turn controller; discarded on turn change. The cursor
/// only ever moves forward, one action per tick, whether or not the action
/// succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    actions: Vec<Action>,
    cursor: usize,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, cursor: 0 }
    }

    /// The next unexecuted action, if any.
    pub fn current(&self) -> Option<&Action> {
        self.actions.get(self.cursor)
    }

    /// Move past the current action.
    pub fn advance(&mut self) {
        if self.cursor < self.actions.len() {
            self.cursor += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.actions.len() - self.cursor
    }
}
