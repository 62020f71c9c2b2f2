//! Errors that abort a stage run.

use super::error_code::{self, Nl2GraphErrorCode};
use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Generator failures are not captured per record; they stop the run.
    #[error("Generation failed for {record_id}: {message}")]
    Generation { record_id: String, message: String },

    #[error("No {role} configured for this run")]
    MissingCollaborator { role: &'static str },

    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkers(usize),

    #[error("Worker thread panicked")]
    WorkerPanicked,

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Nl2GraphErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Generation { .. } => error_code::GENERATION_FAILED,
            Self::MissingCollaborator { .. } => error_code::MISSING_COLLABORATOR,
            Self::InvalidWorkers(_) => error_code::INVALID_WORKERS,
            Self::WorkerPanicked | Self::WorkerSpawn(_) => error_code::WORKER_FAILED,
            Self::Storage(e) => e.error_code(),
        }
    }
}
