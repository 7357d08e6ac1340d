//! Structured document metadata returned by the file-name generation step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters a file name may not contain. Includes both path separators.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// A file name that cannot be used for an exported document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid file name '{name}': {reason}")]
pub struct InvalidFileName {
    pub name: String,
    pub reason: &'static str,
}

/// Checks that `name` is a single path component without reserved
/// characters.
pub fn validate_file_name(name: &str) -> Result<(), InvalidFileName> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path")
    } else if name.contains(RESERVED_CHARS) {
        Some("name contains a path separator or reserved character")
    } else if name.chars().any(char::is_control) {
        Some("name contains a control character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InvalidFileName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Summary of the document contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub analysis: String,
    pub formatting_process: String,
    pub summary: String,
}

/// Document type classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    pub analysis: String,
    pub type_name: String,
}

/// The date that best identifies the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantDate {
    pub analysis: String,
    pub date: String,
}

/// People and organizations the document is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainEntities {
    pub analysis: String,
    pub entities: String,
}

/// Short abbreviation of the document type used as a file-name prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAbbreviation {
    pub analysis: String,
    pub type_abbr: String,
}

/// Reasoning tree: one analysis plus derived value per extracted field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reasoning {
    pub document_summary: DocumentSummary,
    pub document_type: DocumentType,
    pub important_date: ImportantDate,
    pub language: String,
    pub main_entities: MainEntities,
    pub type_abbreviation: TypeAbbreviation,
}

/// Document metadata as produced by the LLM and persisted in the `.json`
/// sidecar.
///
/// The LLM only fills `file_name` and `reasoning`; the remaining fields are
/// bookkeeping added by the pipeline and default to empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub file_name: String,
    #[serde(default)]
    pub file_name_history: Vec<String>,
    #[serde(default)]
    pub pages_paths: Vec<String>,
    #[serde(default)]
    pub json_file_path: String,
    pub reasoning: Reasoning,
}

/// The LLM response shape. Same wire format as [`DocumentInfo`].
pub type FileNameGeneration = DocumentInfo;

impl DocumentInfo {
    /// Renames the document, keeping a history of previous names.
    ///
    /// The first rename seeds the history with the original name. A name
    /// already in the history is not added again. Returns `false` when the
    /// name is unchanged.
    pub fn rename(&mut self, name: &str) -> bool {
        if self.file_name == name {
            return false;
        }
        if self.file_name_history.is_empty() {
            self.file_name_history.push(self.file_name.clone());
        }
        if !self.file_name_history.iter().any(|n| n == name) {
            self.file_name_history.push(name.to_string());
        }
        self.file_name = name.to_string();
        true
    }
}
