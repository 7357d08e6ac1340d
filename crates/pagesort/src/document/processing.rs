//! Processing records for grouped-page jobs.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::info::DocumentInfo;

/// Message recorded when a failure is reported without one.
const UNKNOWN_ERROR: &str = "unknown error";

/// Status of a grouped-page job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ProcessingStatus {
    /// Returns true for `Completed` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Error)
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Pending => write!(f, "pending"),
            ProcessingStatus::Processing => write!(f, "processing"),
            ProcessingStatus::Completed => write!(f, "completed"),
            ProcessingStatus::Error => write!(f, "error"),
        }
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid transition for '{id}': {from} -> {to}")]
pub struct TransitionError {
    pub id: String,
    pub from: ProcessingStatus,
    pub to: ProcessingStatus,
}

/// A grouped-page job in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingPage {
    pub id: String,
    /// Source page numbers, in the order the user grouped them.
    pub pages: Vec<u32>,
    pub pages_paths: Vec<String>,
    pub status: ProcessingStatus,
    #[serde(rename = "startTime", with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(
        rename = "endTime",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds between `start_time` and `end_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_file_path: Option<String>,
}

impl ProcessingPage {
    /// Creates a pending job with a fresh id. Times are kept at millisecond
    /// precision, matching the serialized form.
    pub fn new(pages: Vec<u32>, pages_paths: Vec<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pages,
            pages_paths,
            status: ProcessingStatus::Pending,
            start_time: start_time.trunc_subsecs(3),
            end_time: None,
            elapsed: None,
            error: None,
            json_file_path: None,
        }
    }

    fn transition_error(&self, to: ProcessingStatus) -> TransitionError {
        TransitionError {
            id: self.id.clone(),
            from: self.status,
            to,
        }
    }

    fn finish_at(&mut self, at: DateTime<Utc>) {
        let end = at.trunc_subsecs(3).max(self.start_time);
        self.end_time = Some(end);
        self.elapsed = Some((end - self.start_time).num_milliseconds());
    }

    /// pending -> processing.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.status != ProcessingStatus::Pending {
            return Err(self.transition_error(ProcessingStatus::Processing));
        }
        self.status = ProcessingStatus::Processing;
        Ok(())
    }

    /// processing -> completed.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status != ProcessingStatus::Processing {
            return Err(self.transition_error(ProcessingStatus::Completed));
        }
        self.status = ProcessingStatus::Completed;
        self.error = None;
        self.finish_at(at);
        Ok(())
    }

    /// pending or processing -> error. An empty message is replaced so an
    /// errored job always explains itself.
    pub fn fail(&mut self, at: DateTime<Utc>, message: &str) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(self.transition_error(ProcessingStatus::Error));
        }
        let message = message.trim();
        self.status = ProcessingStatus::Error;
        self.error = Some(if message.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message.to_string()
        });
        self.finish_at(at);
        Ok(())
    }
}

/// A completed job together with the name and reasoning the LLM produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    #[serde(flatten)]
    pub page: ProcessingPage,
    pub file_name: String,
    #[serde(alias = "info")]
    pub debug: DocumentInfo,
}

impl ProcessedDocument {
    /// Wraps a completed job. Any other status is rejected.
    pub fn from_completed(
        page: ProcessingPage,
        info: DocumentInfo,
    ) -> Result<Self, TransitionError> {
        if page.status != ProcessingStatus::Completed {
            return Err(page.transition_error(ProcessingStatus::Completed));
        }
        let mut page = page;
        if !info.json_file_path.is_empty() {
            page.json_file_path = Some(info.json_file_path.clone());
        }
        Ok(Self {
            file_name: info.file_name.clone(),
            page,
            debug: info,
        })
    }

    pub fn id(&self) -> &str {
        &self.page.id
    }

    /// Renames the document, see [`DocumentInfo::rename`].
    pub fn rename(&mut self, name: &str) -> bool {
        let changed = self.debug.rename(name);
        self.file_name = self.debug.file_name.clone();
        changed
    }
}
