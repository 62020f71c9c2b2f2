//! Configuration and argument errors. These abort a run before any work starts.

use super::error_code::{self, Nl2GraphErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown dataset: {0}")]
    MissingDataset(String),

    #[error("Missing config key: {0}")]
    MissingKey(String),

    #[error("Unknown method '{0}' (expected llm or seq2seq)")]
    UnknownMethod(String),

    #[error("Unknown stage '{0}' (expected gen, exec or eval)")]
    UnknownStage(String),

    #[error("Unknown if-exists policy '{0}' (expected skip or override)")]
    UnknownPolicy(String),
}

impl Nl2GraphErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
