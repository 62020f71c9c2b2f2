//! Error types for every layer of the pipeline.
//! Each enum maps its variants to a stable string code via `Nl2GraphErrorCode`.

pub mod collaborator_error;
pub mod config_error;
pub mod error_code;
pub mod pipeline_error;
pub mod storage_error;

pub use collaborator_error::CollaboratorError;
pub use config_error::ConfigError;
pub use pipeline_error::PipelineError;
pub use storage_error::StorageError;
