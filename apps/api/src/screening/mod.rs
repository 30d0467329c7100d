// Candidate screening: résumé upload → text → features → score → one persisted record.
// Storage backends live behind the traits in `store`; everything else is pure
// CPU work that the orchestrator runs off the async workers.

pub mod archive;
pub mod detectors;
pub mod document;
pub mod features;
pub mod handlers;
pub mod pipeline;
pub mod postgres;
pub mod scoring;
pub mod skills;
pub mod store;

#[cfg(test)]
mod memory;

use thiserror::Error;
use uuid::Uuid;

/// Failures a screening run can end in. Nothing is persisted for any of them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document could not be parsed: {0}")]
    ParseFailure(String),

    #[error("No text could be extracted from the document")]
    EmptyExtraction,

    #[error("Job opening {0} not found")]
    OpeningNotFound(Uuid),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl PipelineError {
    /// Only infrastructure failures are worth retrying with the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::PersistenceFailure(_))
    }
}
