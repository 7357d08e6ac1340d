pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod llm;
pub mod pipeline;
pub mod sanitize;
pub mod secrets;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use config::{load_config, Config};
pub use document::{
    DocumentInfo, FileNameGeneration, PageContent, ProcessedDocument, ProcessingPage,
    ProcessingStatus, SCHEMA_VERSION,
};
pub use error::{ConfigError, ExportError, PagesortError, Result, StorageError};
pub use export::{ExportPlan, Exporter};
pub use llm::{LlmClient, LlmError, Model, Remedy, DECODING};
pub use pipeline::{DocumentPipeline, PipelineError, ProgressEvent, ProgressReporter};
pub use secrets::{resolve_secret, SecretError};
pub use state::{DocumentStore, StateEvent, StateField, StoreError};
pub use telemetry::{init_tracing, TelemetryError};
