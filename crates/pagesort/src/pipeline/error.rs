use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No pages selected")]
    EmptySelection,

    #[error("Got {paths} page images for {pages} pages")]
    PageCountMismatch { pages: usize, paths: usize },

    #[error(transparent)]
    InvalidFileName(#[from] crate::document::InvalidFileName),

    #[error(transparent)]
    State(#[from] crate::state::StoreError),

    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),

    #[error(transparent)]
    Storage(#[from] crate::error::StorageError),

    #[error(transparent)]
    Export(#[from] crate::error::ExportError),
}
