//! Failures reported by generators and executors.

use std::time::Duration;

use super::error_code::{self, Nl2GraphErrorCode};

/// Error raised by an external collaborator.
///
/// `Display` renders the backend's own message for `Backend`, so an executor
/// failure stored in an `ExecutionResult` reads exactly as the backend said it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Backend(String),

    #[error("Timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl Nl2GraphErrorCode for CollaboratorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::COLLABORATOR_TIMEOUT,
            _ => error_code::COLLABORATOR_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_displays_verbatim() {
        let err = CollaboratorError::Backend("Connection refused".into());
        assert_eq!(err.to_string(), "Connection refused");
        assert_eq!(err.error_code(), "COLLABORATOR_ERROR");
    }
}
