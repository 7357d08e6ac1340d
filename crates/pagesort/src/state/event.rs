//! Change notifications published by the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A property of the document state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StateField {
    CurrentPageNumber,
    SelectedPages,
    ProcessingPages,
    ProcessedDocuments,
    FinishedDocuments,
}

impl StateField {
    pub const ALL: [StateField; 5] = [
        StateField::CurrentPageNumber,
        StateField::SelectedPages,
        StateField::ProcessingPages,
        StateField::ProcessedDocuments,
        StateField::FinishedDocuments,
    ];
}

impl std::fmt::Display for StateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateField::CurrentPageNumber => write!(f, "currentPageNumber"),
            StateField::SelectedPages => write!(f, "selectedPages"),
            StateField::ProcessingPages => write!(f, "processingPages"),
            StateField::ProcessedDocuments => write!(f, "processedDocuments"),
            StateField::FinishedDocuments => write!(f, "finishedDocuments"),
        }
    }
}

/// Emitted once per changed field after every write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StateEvent {
    pub field: StateField,
    /// Store revision after the write. Strictly increasing.
    pub revision: u64,
    pub timestamp: DateTime<Utc>,
}

impl StateEvent {
    pub fn new(field: StateField, revision: u64) -> Self {
        Self {
            field,
            revision,
            timestamp: Utc::now(),
        }
    }
}
