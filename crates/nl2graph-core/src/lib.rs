//! # nl2graph-core
//!
//! Foundation crate for the nl2graph experiment pipeline.
//! Defines the record and result types, storage and collaborator traits,
//! errors, config and tracing setup. Every other crate in the workspace
//! depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::Nl2GraphConfig;
pub use errors::error_code::Nl2GraphErrorCode;
pub use types::key::{Method, ResultKey, RunConfig};
pub use types::record::{Record, RecordFilter};
pub use types::results::{
    EvaluationResult, ExecutionResult, GenerationResult, Metrics, ResultRow, StageState,
};
pub use types::schema::Schema;
pub use types::stage::{IfExists, Stage};
