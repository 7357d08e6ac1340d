//! In-memory document store with change notifications.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::document::{DocumentInfo, ProcessedDocument, ProcessingPage, SCHEMA_VERSION};

use super::event::{StateEvent, StateField};
use super::StoreError;

/// Default capacity of the change notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// The full document state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    pub current_page_number: u32,
    pub selected_pages: Vec<u32>,
    pub processing_pages: Vec<ProcessingPage>,
    pub processed_documents: Vec<ProcessedDocument>,
    pub finished_documents: Vec<ProcessedDocument>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            current_page_number: 1,
            selected_pages: Vec::new(),
            processing_pages: Vec::new(),
            processed_documents: Vec::new(),
            finished_documents: Vec::new(),
        }
    }
}

impl DocumentState {
    fn changed_fields(&self, other: &DocumentState) -> Vec<StateField> {
        StateField::ALL
            .into_iter()
            .filter(|field| match field {
                StateField::CurrentPageNumber => {
                    self.current_page_number != other.current_page_number
                }
                StateField::SelectedPages => self.selected_pages != other.selected_pages,
                StateField::ProcessingPages => self.processing_pages != other.processing_pages,
                StateField::ProcessedDocuments => {
                    self.processed_documents != other.processed_documents
                }
                StateField::FinishedDocuments => {
                    self.finished_documents != other.finished_documents
                }
            })
            .collect()
    }

    fn processing_index(&self, id: &str) -> Result<usize, StoreError> {
        self.processing_pages
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}

/// Versioned, serializable copy of the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStateSnapshot {
    pub version: u32,
    pub revision: u64,
    #[serde(flatten)]
    pub state: DocumentState,
}

struct Inner {
    state: DocumentState,
    revision: u64,
}

/// Observable store for page selection and processing progress.
///
/// Plain accessors replace whole properties (last writer wins). The
/// explicit operations (`select_page`, `begin_processing`, `complete`, ...)
/// read and write under one lock so concurrent handlers cannot lose each
/// other's updates.
pub struct DocumentStore {
    inner: RwLock<Inner>,
    sender: broadcast::Sender<StateEvent>,
}

impl DocumentStore {
    /// Creates an empty store with the given event channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self::with_state(DocumentState::default(), capacity)
    }

    /// Creates a store seeded with existing state.
    pub fn with_state(state: DocumentState, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: RwLock::new(Inner { state, revision: 0 }),
            sender,
        }
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Document store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Document store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Bumps the revision and notifies subscribers, one event per field.
    /// Must be called with the write guard held so events stay ordered.
    fn publish(&self, inner: &mut Inner, fields: &[StateField]) {
        for field in fields {
            inner.revision += 1;
            // No active receivers is fine
            let _ = self.sender.send(StateEvent::new(*field, inner.revision));
        }
    }

    /// Runs `f` against the state under the write lock and publishes an
    /// event for every property it changed.
    pub fn update<R>(&self, f: impl FnOnce(&mut DocumentState) -> R) -> R {
        let mut inner = self.write();
        let before = inner.state.clone();
        let result = f(&mut inner.state);
        let changed = before.changed_fields(&inner.state);
        self.publish(&mut inner, &changed);
        result
    }

    /// Like [`update`](Self::update) but leaves the state untouched when
    /// `f` fails.
    fn try_mutate<R>(
        &self,
        fields: &[StateField],
        f: impl FnOnce(&mut DocumentState) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut inner = self.write();
        let mut draft = inner.state.clone();
        let result = f(&mut draft)?;
        inner.state = draft;
        self.publish(&mut inner, fields);
        Ok(result)
    }

    fn set(&self, field: StateField, f: impl FnOnce(&mut DocumentState)) {
        let mut inner = self.write();
        f(&mut inner.state);
        self.publish(&mut inner, &[field]);
    }

    /// Current store revision; increases by one per published event.
    pub fn revision(&self) -> u64 {
        self.read().revision
    }

    /// Versioned copy of the whole state.
    pub fn snapshot(&self) -> DocumentStateSnapshot {
        let inner = self.read();
        DocumentStateSnapshot {
            version: SCHEMA_VERSION,
            revision: inner.revision,
            state: inner.state.clone(),
        }
    }

    // ─── Property accessors ─────────────────────────────────────────────

    pub fn current_page_number(&self) -> u32 {
        self.read().state.current_page_number
    }

    pub fn set_current_page_number(&self, value: u32) {
        self.set(StateField::CurrentPageNumber, |s| {
            s.current_page_number = value
        });
    }

    pub fn selected_pages(&self) -> Vec<u32> {
        self.read().state.selected_pages.clone()
    }

    /// Replaces the selection verbatim, duplicates included.
    pub fn set_selected_pages(&self, value: Vec<u32>) {
        self.set(StateField::SelectedPages, |s| s.selected_pages = value);
    }

    pub fn processing_pages(&self) -> Vec<ProcessingPage> {
        self.read().state.processing_pages.clone()
    }

    pub fn set_processing_pages(&self, value: Vec<ProcessingPage>) {
        self.set(StateField::ProcessingPages, |s| s.processing_pages = value);
    }

    pub fn processed_documents(&self) -> Vec<ProcessedDocument> {
        self.read().state.processed_documents.clone()
    }

    pub fn set_processed_documents(&self, value: Vec<ProcessedDocument>) {
        self.set(StateField::ProcessedDocuments, |s| {
            s.processed_documents = value
        });
    }

    pub fn finished_documents(&self) -> Vec<ProcessedDocument> {
        self.read().state.finished_documents.clone()
    }

    pub fn set_finished_documents(&self, value: Vec<ProcessedDocument>) {
        self.set(StateField::FinishedDocuments, |s| {
            s.finished_documents = value
        });
    }

    // ─── Selection ──────────────────────────────────────────────────────

    /// Adds a page to the selection. Returns false if it was already there.
    pub fn select_page(&self, page: u32) -> bool {
        self.update(|s| {
            if s.selected_pages.contains(&page) {
                false
            } else {
                s.selected_pages.push(page);
                true
            }
        })
    }

    /// Removes every occurrence of a page. Returns false if it was absent.
    pub fn deselect_page(&self, page: u32) -> bool {
        self.update(|s| {
            let before = s.selected_pages.len();
            s.selected_pages.retain(|p| *p != page);
            s.selected_pages.len() != before
        })
    }

    /// Flips a page's selection. Returns whether it is selected afterwards.
    pub fn toggle_page(&self, page: u32) -> bool {
        self.update(|s| {
            if s.selected_pages.contains(&page) {
                s.selected_pages.retain(|p| *p != page);
                false
            } else {
                s.selected_pages.push(page);
                true
            }
        })
    }

    pub fn clear_selection(&self) {
        self.update(|s| s.selected_pages.clear());
    }

    /// Returns the selection and clears it in one step.
    pub fn take_selection(&self) -> Vec<u32> {
        self.update(|s| std::mem::take(&mut s.selected_pages))
    }

    // ─── Processing lifecycle ───────────────────────────────────────────

    /// Appends a pending job for the given pages and returns a copy of it.
    pub fn begin_processing(
        &self,
        pages: Vec<u32>,
        pages_paths: Vec<String>,
    ) -> Result<ProcessingPage, StoreError> {
        if pages.is_empty() {
            return Err(StoreError::EmptyGroup);
        }
        let page = ProcessingPage::new(pages, pages_paths, Utc::now());
        let mut inner = self.write();
        inner.state.processing_pages.push(page.clone());
        self.publish(&mut inner, &[StateField::ProcessingPages]);
        Ok(page)
    }

    /// Returns a copy of a job still in the processing list.
    pub fn processing_page(&self, id: &str) -> Option<ProcessingPage> {
        self.read()
            .state
            .processing_pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// pending -> processing.
    pub fn mark_processing(&self, id: &str) -> Result<ProcessingPage, StoreError> {
        self.try_mutate(&[StateField::ProcessingPages], |s| {
            let idx = s.processing_index(id)?;
            let page = &mut s.processing_pages[idx];
            page.start()?;
            Ok(page.clone())
        })
    }

    /// processing -> completed; moves the job into the processed list.
    pub fn complete(&self, id: &str, info: DocumentInfo) -> Result<ProcessedDocument, StoreError> {
        self.try_mutate(
            &[StateField::ProcessingPages, StateField::ProcessedDocuments],
            |s| {
                let idx = s.processing_index(id)?;
                let mut page = s.processing_pages.remove(idx);
                page.complete(Utc::now())?;
                let document = ProcessedDocument::from_completed(page, info)?;
                s.processed_documents.push(document.clone());
                Ok(document)
            },
        )
    }

    /// pending/processing -> error. The job stays in the processing list
    /// until it is removed.
    pub fn fail(&self, id: &str, message: &str) -> Result<ProcessingPage, StoreError> {
        self.try_mutate(&[StateField::ProcessingPages], |s| {
            let idx = s.processing_index(id)?;
            let page = &mut s.processing_pages[idx];
            page.fail(Utc::now(), message)?;
            Ok(page.clone())
        })
    }

    /// Drops a job from the processing list, e.g. after the user dismisses
    /// an error.
    pub fn remove_processing(&self, id: &str) -> Result<ProcessingPage, StoreError> {
        self.try_mutate(&[StateField::ProcessingPages], |s| {
            let idx = s.processing_index(id)?;
            Ok(s.processing_pages.remove(idx))
        })
    }

    /// Returns a processed or finished document by id.
    /// Looks up a document that has not been finished yet.
    pub fn processed_document(&self, id: &str) -> Option<ProcessedDocument> {
        self.read()
            .state
            .processed_documents
            .iter()
            .find(|d| d.id() == id)
            .cloned()
    }

    pub fn document(&self, id: &str) -> Option<ProcessedDocument> {
        let inner = self.read();
        inner
            .state
            .processed_documents
            .iter()
            .chain(inner.state.finished_documents.iter())
            .find(|d| d.id() == id)
            .cloned()
    }

    /// Renames a processed or finished document.
    pub fn rename_document(&self, id: &str, name: &str) -> Result<ProcessedDocument, StoreError> {
        let mut inner = self.write();
        let state = &mut inner.state;

        let (field, document) = if let Some(d) = state
            .processed_documents
            .iter_mut()
            .find(|d| d.id() == id)
        {
            (StateField::ProcessedDocuments, d)
        } else if let Some(d) = state.finished_documents.iter_mut().find(|d| d.id() == id) {
            (StateField::FinishedDocuments, d)
        } else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };

        let changed = document.rename(name);
        let document = document.clone();
        if changed {
            self.publish(&mut inner, &[field]);
        }
        Ok(document)
    }

    /// Moves a processed document into the finished list.
    pub fn finish(&self, id: &str) -> Result<ProcessedDocument, StoreError> {
        self.try_mutate(
            &[StateField::ProcessedDocuments, StateField::FinishedDocuments],
            |s| {
                let idx = s
                    .processed_documents
                    .iter()
                    .position(|d| d.id() == id)
                    .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
                let document = s.processed_documents.remove(idx);
                s.finished_documents.push(document.clone());
                Ok(document)
            },
        )
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
