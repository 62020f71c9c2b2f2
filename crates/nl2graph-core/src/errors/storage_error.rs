//! Storage-layer errors for SQLite operations.

use super::error_code::{self, Nl2GraphErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    /// A stored document no longer decodes into its stage type.
    #[error("Database corrupt: {details}")]
    DbCorrupt { details: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Nl2GraphErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbCorrupt { .. } => error_code::DB_CORRUPT,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::Io { .. } => error_code::IO_ERROR,
            Self::Serialization { .. } => error_code::SERIALIZATION_ERROR,
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
        }
    }
}
