use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::document::{
    validate_file_name, DocumentInfo, PageContent, ProcessedDocument, ProcessingPage,
};
use crate::export::Exporter;
use crate::llm::{LlmClient, Model};
use crate::sanitize;
use crate::state::{DocumentStore, StoreError};
use crate::storage::{self, Sidecar};

use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter};

/// Rendered image path of a page inside a scan's data directory.
pub fn page_image_path(data_dir: &Path, page: u32) -> PathBuf {
    data_dir.join(format!("page-{}.webp", page))
}

/// Result of finishing a document.
#[derive(Debug, Clone)]
pub struct FinishOutcome {
    pub document: ProcessedDocument,
    /// Exported PDF, when export is enabled.
    pub export_path: Option<PathBuf>,
}

/// Drives page groups through the store, the LLM and the sidecar cache.
pub struct DocumentPipeline {
    store: Arc<DocumentStore>,
    client: LlmClient,
    exporter: Exporter,
    model: Model,
}

impl DocumentPipeline {
    pub fn new(store: Arc<DocumentStore>, client: LlmClient, exporter: Exporter) -> Self {
        let model = client.default_model();
        Self {
            store,
            client,
            exporter,
            model,
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Consumes the current selection and processes it as one document.
    ///
    /// Page images are expected at `<data_dir>/page-<N>.webp`. The selection
    /// is cleared even when processing fails.
    pub async fn process_selection(
        &self,
        data_dir: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<ProcessedDocument, PipelineError> {
        let pages = self.store.take_selection();
        if pages.is_empty() {
            return Err(PipelineError::EmptySelection);
        }
        let paths = pages
            .iter()
            .map(|&p| page_image_path(data_dir, p).to_string_lossy().into_owned())
            .collect();
        self.process(pages, paths, progress).await
    }

    /// Processes a page group: creates a pending entry, moves it to
    /// processing, then completes it with the generated name or fails it
    /// with the error message.
    pub async fn process(
        &self,
        pages: Vec<u32>,
        pages_paths: Vec<String>,
        progress: &dyn ProgressReporter,
    ) -> Result<ProcessedDocument, PipelineError> {
        if pages.len() != pages_paths.len() {
            return Err(PipelineError::PageCountMismatch {
                pages: pages.len(),
                paths: pages_paths.len(),
            });
        }

        let entry = self.store.begin_processing(pages, pages_paths)?;
        let span = info_span!("pipeline",
            job_id = %entry.id,
            pages = %sanitize::redact_pages(&entry.pages_paths),
            model = %self.model,
        );

        self.run_entry(&entry.id, progress).instrument(span).await
    }

    async fn run_entry(
        &self,
        id: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<ProcessedDocument, PipelineError> {
        let entry = self.store.mark_processing(id)?;

        match self.name_document(&entry, progress).await {
            Ok(info) => {
                let document = self.store.complete(id, info)?;
                info!(
                    file_name = %document.file_name,
                    elapsed_ms = ?document.page.elapsed,
                    "Document named"
                );
                progress.report(ProgressEvent::Completed {
                    id: id.to_string(),
                    file_name: document.file_name.clone(),
                });
                Ok(document)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Processing failed");
                self.store.fail(id, &message)?;
                progress.report(ProgressEvent::Failed {
                    id: id.to_string(),
                    error: message,
                });
                Err(e)
            }
        }
    }

    async fn name_document(
        &self,
        entry: &ProcessingPage,
        progress: &dyn ProgressReporter,
    ) -> Result<DocumentInfo, PipelineError> {
        let sidecar = Sidecar::for_pages(&entry.pages_paths)?;
        let cached_transcript = sidecar.read_transcript()?;

        if cached_transcript.is_some() {
            if let Some(info) = sidecar.read_info()? {
                debug!(
                    sidecar = %sanitize::redact_path(sidecar.json_path()),
                    "Using cached document info"
                );
                progress.report(ProgressEvent::CacheHit {
                    id: entry.id.clone(),
                });
                return Ok(info);
            }
        }

        let transcript = match cached_transcript {
            Some(xml) => {
                progress.report(ProgressEvent::TranscriptReused {
                    id: entry.id.clone(),
                });
                xml
            }
            None => {
                let xml = self.transcribe(entry, progress).await?;
                sidecar.write_transcript(&xml)?;
                xml
            }
        };

        progress.report(ProgressEvent::GeneratingFileName {
            id: entry.id.clone(),
        });
        let mut info = self
            .client
            .generate_file_name(self.model, &transcript)
            .instrument(info_span!("generate_file_name"))
            .await?;
        info.pages_paths = entry.pages_paths.clone();
        info.json_file_path = sidecar.json_path().to_string_lossy().into_owned();
        sidecar.write_info(&info)?;

        Ok(info)
    }

    async fn transcribe(
        &self,
        entry: &ProcessingPage,
        progress: &dyn ProgressReporter,
    ) -> Result<String, PipelineError> {
        let total = entry.pages_paths.len();
        let mut fragments = Vec::with_capacity(total);

        for (index, path) in entry.pages_paths.iter().enumerate() {
            let path = Path::new(path);
            let page = PageContent::load_image(path).await?;
            progress.report(ProgressEvent::Transcribing {
                id: entry.id.clone(),
                page: page.page_number.clone(),
                index,
                total,
            });

            let span = info_span!("transcribe_page", file = %sanitize::redact_path(path));
            let fragment = self
                .client
                .transcribe_page(self.model, &page)
                .instrument(span)
                .await?;
            fragments.push(fragment);
        }

        Ok(storage::format_xml(&storage::combine_pages(&fragments))?)
    }

    /// Renames a processed or finished document and its JSON sidecar.
    pub fn rename(&self, id: &str, name: &str) -> Result<ProcessedDocument, PipelineError> {
        validate_file_name(name)?;
        let document = self
            .store
            .document(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if !document.debug.json_file_path.is_empty() {
            storage::update_file_name(Path::new(&document.debug.json_file_path), name)?;
        }
        Ok(self.store.rename_document(id, name)?)
    }

    /// Exports a processed document (when enabled) and moves it to the
    /// finished list. A failed export leaves the document in the processed
    /// list. Finished documents are rejected before anything is exported.
    pub async fn finish(&self, id: &str) -> Result<FinishOutcome, PipelineError> {
        let document = self
            .store
            .processed_document(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let export_path = if self.exporter.is_enabled() {
            Some(self.exporter.export(&document.debug).await?)
        } else {
            None
        };

        let document = self.store.finish(id)?;
        info!(job_id = %id, exported = export_path.is_some(), "Document finished");
        Ok(FinishOutcome {
            document,
            export_path,
        })
    }
}
