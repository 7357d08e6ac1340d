//! Observable document state shared with the UI layer.

pub mod event;
pub mod store;

use thiserror::Error;

use crate::document::TransitionError;

pub use event::{StateEvent, StateField};
pub use store::{DocumentState, DocumentStateSnapshot, DocumentStore};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No entry with id '{id}'")]
    NotFound { id: String },

    #[error("Cannot start processing an empty page group")]
    EmptyGroup,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}
