//! Undo/redo history
//!
//! `ActionJournal` owns the recorded actions and a cursor. Actions before the
//! cursor are applied, actions from the cursor on form the redo tail.
//! Element order is reassigned after every change so `order` stays
//! contiguous.

use crate::actions::action::{Action, ActionRecord};
use crate::errors::Result;
use crate::ops::DsmModel;

#[derive(Debug, Clone, Default)]
pub struct ActionJournal {
    history: Vec<Action>,
    cursor: usize,
}

impl ActionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `action` and append it, dropping any redo tail
    ///
    /// # Errors
    ///
    /// Returns the action's error; the action is not recorded then.
    pub fn record(&mut self, model: &mut DsmModel, mut action: Action) -> Result<()> {
        action.apply(model)?;
        model.assign_element_order();
        self.history.truncate(self.cursor);
        self.history.push(action);
        self.cursor = self.history.len();
        Ok(())
    }

    /// Revert the most recent applied action
    ///
    /// Returns `false` without touching the model when there is nothing to
    /// undo.
    ///
    /// # Errors
    ///
    /// Returns the action's error; the cursor does not move then.
    pub fn undo(&mut self, model: &mut DsmModel) -> Result<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        self.history[self.cursor - 1].undo(model)?;
        self.cursor -= 1;
        model.assign_element_order();
        Ok(true)
    }

    /// Re-apply the next action of the redo tail
    ///
    /// Returns `false` without touching the model when there is nothing to
    /// redo.
    ///
    /// # Errors
    ///
    /// Returns the action's error; the cursor does not move then.
    pub fn redo(&mut self, model: &mut DsmModel) -> Result<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        self.history[self.cursor].apply(model)?;
        self.cursor += 1;
        model.assign_element_order();
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Description of the action `undo` would revert
    pub fn undo_description(&self, model: &DsmModel) -> Option<String> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.history.get(i))
            .map(|a| format!("{}: {}", a.title(), a.description(model)))
    }

    /// Description of the action `redo` would re-apply
    pub fn redo_description(&self, model: &DsmModel) -> Option<String> {
        self.history
            .get(self.cursor)
            .map(|a| format!("{}: {}", a.title(), a.description(model)))
    }

    /// Applied actions, oldest first
    pub fn actions(&self) -> &[Action] {
        &self.history[..self.cursor]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.cursor = 0;
    }

    /// Record a named checkpoint
    ///
    /// # Errors
    ///
    /// Fails if the model digest cannot be computed.
    pub fn make_snapshot(&mut self, model: &mut DsmModel, name: &str) -> Result<()> {
        let snapshot = Action::snapshot(model, name)?;
        self.record(model, snapshot)
    }

    /// Records of the applied actions, for persistence
    pub fn export(&self) -> Vec<ActionRecord> {
        self.actions().iter().map(Action::to_record).collect()
    }

    /// Replace the history with already-applied actions
    ///
    /// The model must already reflect `actions`; the cursor ends up after
    /// the last one.
    pub fn load(&mut self, actions: Vec<Action>) {
        self.history = actions;
        self.cursor = self.history.len();
    }
}
