//! Orchestration of one page group: selection, transcription, naming and
//! the final export.

pub mod error;
pub mod progress;
pub mod runner;

pub use error::PipelineError;
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter, TracingProgress};
pub use runner::{page_image_path, DocumentPipeline, FinishOutcome};
