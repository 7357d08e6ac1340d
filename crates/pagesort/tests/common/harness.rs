//! Test harness for pipeline integration tests.
//!
//! `TestHarness` owns a temporary `<scan>-data` directory with rendered page
//! images, a document store, and a scripted LLM transport that answers
//! transcription and naming requests without a network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use pagesort::config::ExportConfig;
use pagesort::document::ProcessingStatus;
use pagesort::export::Exporter;
use pagesort::llm::{
    ContentBlock, LlmClient, LlmError, MessagesRequest, MessagesResponse, MessagesTransport,
    Model, Role,
};
use pagesort::pipeline::{page_image_path, DocumentPipeline, ProgressEvent, ProgressReporter};
use pagesort::state::DocumentStore;

use super::builders::file_name_reply;

/// Scripted Messages API.
///
/// Transcription requests (prefilled with `<page ...>`) get a short page body;
/// naming requests (prefilled with `{`) get the configured reply.
pub struct FakeTransport {
    naming_reply: Mutex<String>,
    network_down: AtomicBool,
    requests: Mutex<Vec<MessagesRequest>>,
    watched_store: Mutex<Option<Arc<DocumentStore>>>,
    observed_statuses: Mutex<Vec<ProcessingStatus>>,
}

impl FakeTransport {
    pub fn naming(file_name: &str) -> Arc<Self> {
        Arc::new(Self {
            naming_reply: Mutex::new(file_name_reply(file_name)),
            network_down: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            watched_store: Mutex::new(None),
            observed_statuses: Mutex::new(Vec::new()),
        })
    }

    pub fn set_naming_reply(&self, reply: String) {
        *self.naming_reply.lock().unwrap() = reply;
    }

    pub fn set_network_down(&self, down: bool) {
        self.network_down.store(down, Ordering::SeqCst);
    }

    /// Records the status of every processing entry at each request.
    pub fn watch(&self, store: Arc<DocumentStore>) {
        *self.watched_store.lock().unwrap() = Some(store);
    }

    pub fn observed_statuses(&self) -> Vec<ProcessingStatus> {
        self.observed_statuses.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<MessagesRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn transcription_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| prefill(r).is_some_and(|p| p.starts_with("<page")))
            .count()
    }

    pub fn naming_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| prefill(r) == Some("{"))
            .count()
    }
}

fn prefill(request: &MessagesRequest) -> Option<&str> {
    let last = request.messages.last()?;
    if last.role != Role::Assistant {
        return None;
    }
    match last.content.first()? {
        ContentBlock::Text { text } => Some(text.as_str()),
        _ => None,
    }
}

fn text_response(text: &str) -> MessagesResponse {
    serde_json::from_value(serde_json::json!({
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 1200, "output_tokens": 80}
    }))
    .expect("valid response")
}

#[async_trait]
impl MessagesTransport for FakeTransport {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(store) = self.watched_store.lock().unwrap().as_ref() {
            let entries = store.processing_pages();
            self.observed_statuses
                .lock()
                .unwrap()
                .extend(entries.iter().map(|p| p.status));
        }

        if self.network_down.load(Ordering::SeqCst) {
            return Err(LlmError::Transport("error sending request: connection refused".into()));
        }

        match prefill(request) {
            Some("{") => Ok(text_response(&self.naming_reply.lock().unwrap())),
            Some(_) => Ok(text_response(
                "<heading>EDP Comercial</heading><paragraph>Total: 42,10 EUR</paragraph></page>",
            )),
            None => Err(LlmError::MalformedResponse("request without prefill".into())),
        }
    }
}

/// Collects progress events.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Isolated environment for pipeline tests.
pub struct TestHarness {
    temp_dir: TempDir,
    /// Page image directory, `<tmp>/scan-data`.
    pub data_dir: PathBuf,
    pub store: Arc<DocumentStore>,
    pub transport: Arc<FakeTransport>,
}

impl TestHarness {
    /// Creates a harness whose model names every document `file_name`.
    pub fn new(file_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let data_dir = temp_dir.path().join("scan-data");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            data_dir,
            store: Arc::new(DocumentStore::default()),
            transport: FakeTransport::naming(file_name),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes placeholder page images and returns their paths.
    pub fn write_pages(&self, pages: &[u32]) -> Vec<String> {
        pages
            .iter()
            .map(|&page| {
                let path = page_image_path(&self.data_dir, page);
                std::fs::write(&path, b"RIFF\0\0\0\0WEBPVP8 ").expect("Failed to write page");
                path.to_string_lossy().into_owned()
            })
            .collect()
    }

    /// Pipeline using the fake transport, with export disabled.
    pub fn pipeline(&self) -> DocumentPipeline {
        let client = LlmClient::new(self.transport.clone(), Model::Haiku);
        let exporter = Exporter::new(ExportConfig {
            enabled: false,
            ..Default::default()
        });
        DocumentPipeline::new(self.store.clone(), client, exporter)
    }

    /// Pipeline with export enabled and no-op export tools.
    pub fn exporting_pipeline(&self) -> DocumentPipeline {
        let client = LlmClient::new(self.transport.clone(), Model::Haiku);
        let exporter = Exporter::new(ExportConfig {
            enabled: true,
            qpdf_path: "true".into(),
            ocrmypdf_path: "true".into(),
            ..Default::default()
        });
        DocumentPipeline::new(self.store.clone(), client, exporter)
    }

    pub fn sidecar_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", stem, extension))
    }
}
