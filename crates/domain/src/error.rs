//! Builder error taxonomy.
//!
//! Every variant is a local, recoverable condition surfaced to the caller
//! as data. Nothing here is process-fatal; even host integration mistakes
//! (operating on a step outside the configured flow) come back as
//! `MissingConfiguration` rather than a panic.

use thiserror::Error;

use crate::steps::{SelectionMode, SlotKey};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// Referenced catalog item id does not exist for the step.
    #[error("No catalog item '{item_id}' for step '{step}'")]
    InvalidSelection { step: SlotKey, item_id: String },

    /// Attempted to add an already-present id to a multi-select slot.
    #[error("Item '{item_id}' is already selected for step '{step}'")]
    DuplicateSelection { step: SlotKey, item_id: String },

    /// Operation invoked against a step configured for the other mode.
    #[error("Step '{step}' is a {actual} selection step")]
    WrongSelectionMode { step: SlotKey, actual: SelectionMode },

    /// Step or rule not supplied where required.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// The step's externally supplied rule reported errors; advance is blocked.
    #[error("Validation failed for step '{step}': {}", errors.join("; "))]
    ValidationFailed { step: SlotKey, errors: Vec<String> },

    /// Over budget at the point of advancing. Editing while over budget is
    /// allowed; only forward navigation is blocked.
    #[error("Budget exceeded by {overage} credits")]
    BudgetExceeded { overage: i64 },
}

impl BuilderError {
    pub fn invalid_selection(step: SlotKey, item_id: impl Into<String>) -> Self {
        Self::InvalidSelection {
            step,
            item_id: item_id.into(),
        }
    }

    pub fn duplicate_selection(step: SlotKey, item_id: impl Into<String>) -> Self {
        Self::DuplicateSelection {
            step,
            item_id: item_id.into(),
        }
    }

    pub fn missing_configuration(msg: impl Into<String>) -> Self {
        Self::MissingConfiguration(msg.into())
    }
}
