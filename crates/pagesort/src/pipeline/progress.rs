/// Steps reported while a page group is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Both sidecars existed; the cached document info is used.
    CacheHit { id: String },
    /// A cached transcript was found; only the file-name step runs.
    TranscriptReused { id: String },
    Transcribing {
        id: String,
        page: String,
        index: usize,
        total: usize,
    },
    GeneratingFileName { id: String },
    Completed { id: String, file_name: String },
    Failed { id: String, error: String },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events to the tracing subscriber.
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Failed { id, error } => {
                tracing::warn!(job_id = %id, %error, "Processing failed")
            }
            other => tracing::debug!(event = ?other, "Progress"),
        }
    }
}
