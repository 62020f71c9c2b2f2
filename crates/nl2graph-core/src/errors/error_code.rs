//! Stable error codes surfaced to the CLI and in structured logs.

/// Maps an error to a machine-readable code.
pub trait Nl2GraphErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const IO_ERROR: &str = "IO_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

pub const GENERATION_FAILED: &str = "GENERATION_FAILED";
pub const MISSING_COLLABORATOR: &str = "MISSING_COLLABORATOR";
pub const INVALID_WORKERS: &str = "INVALID_WORKERS";
pub const WORKER_FAILED: &str = "WORKER_FAILED";

pub const COLLABORATOR_ERROR: &str = "COLLABORATOR_ERROR";
pub const COLLABORATOR_TIMEOUT: &str = "COLLABORATOR_TIMEOUT";
