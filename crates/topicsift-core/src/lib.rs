use thiserror::Error;

pub mod config;
pub mod config_file;
pub mod extractor;
pub mod llm;
pub mod merge;
pub mod prompt;
pub mod source;
pub mod step;
pub mod store;
pub mod topic;

// Re-export for convenience
pub use config::{ExtractionSettings, LlmConfig};
pub use extractor::{ExtractionState, LoopState, TopicExtractor};
pub use llm::{CompletionRequest, LlmBackend, LlmError, OpenAiChat};
pub use merge::{MERGE_THRESHOLD, merge_pages};
pub use source::{PageSource, SourceError, TextFileSource};
pub use store::{TopicStore, Upsert};
pub use topic::{Importance, Topic, sort_by_importance};

/// Progress events emitted while the extraction loop runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    ChunkStarted {
        index: usize,
        total: usize,
    },
    ChunkFinished {
        index: usize,
        total: usize,
        /// Topics created by this chunk.
        inserted: usize,
        /// Candidates folded into an existing topic.
        merged: usize,
    },
    Finished {
        topics: usize,
        content_items: usize,
    },
}

/// Broad failure category of an [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceUnreadable,
    ModelInvocationFailure,
    LoopInvariantViolation,
}

/// Why an extraction request failed. Extraction is all-or-nothing: no topics
/// are returned alongside an error.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("could not read document: {0}")]
    SourceUnreadable(#[from] SourceError),
    #[error("model call failed on chunk {chunk_index}: {source}")]
    ModelInvocation {
        chunk_index: usize,
        source: LlmError,
    },
    #[error("extraction loop exceeded its limit of {limit} transitions after {steps} steps")]
    LoopInvariant { steps: usize, limit: usize },
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::SourceUnreadable(_) => ErrorKind::SourceUnreadable,
            ExtractError::ModelInvocation { .. } => ErrorKind::ModelInvocationFailure,
            ExtractError::LoopInvariant { .. } => ErrorKind::LoopInvariantViolation,
        }
    }
}
