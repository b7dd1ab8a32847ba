//! Journaled model mutations

pub mod action;
pub mod attributes;
pub mod journal;

pub use action::{Action, ActionRecord, ActionType};
pub use attributes::{ActionAttributes, ActionReadOnlyAttributes};
pub use journal::ActionJournal;
