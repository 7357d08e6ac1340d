//! Document data model shared by the state store, the LLM client and storage.
//!
//! The schema is the superset of every historical shape and is versioned by
//! [`SCHEMA_VERSION`]. Version 1 stored the reasoning record under `info`;
//! version 2 stores it under `debug`. Both deserialize.

pub mod info;
pub mod page;
pub mod processing;

pub use info::{
    validate_file_name, DocumentInfo, DocumentSummary, DocumentType, FileNameGeneration,
    ImportantDate, InvalidFileName, MainEntities, Reasoning, TypeAbbreviation,
};
pub use page::{extract_page_number, PageContent, PageImage, UNIDENTIFIED_PAGE};
pub use processing::{ProcessedDocument, ProcessingPage, ProcessingStatus, TransitionError};

/// Current version of the persisted document schema.
pub const SCHEMA_VERSION: u32 = 2;
