use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// Nothing in the calibration core surfaces these to the message sender: every
/// stage falls back to a neutral default and the worst observable outcome is an
/// unmodified response.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents configuration-related errors (e.g., an alignment invariant
    /// violation or an unparsable environment variable).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents an internal classification failure. Classifiers catch these
    /// and fall back to neutral defaults rather than propagating them.
    #[error("Classification error: {0}")]
    Classification(String),

    /// Represents an inaccessible shared store (preference store or domain
    /// cache). Recording is skipped; response generation continues.
    #[error("Store unavailable: {0}")]
    Store(String),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Represents errors from the transport collaborator.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Classification(s) => AppError::Classification(s.clone()),
            AppError::Store(s) => AppError::Store(s.clone()),
            AppError::Validation(s) => AppError::Validation(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Timeout(s) => AppError::Timeout(s.clone()),
            AppError::Transport(s) => AppError::Transport(s.clone()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Validation(format!("Date parse error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID error: {}", err))
    }
}
