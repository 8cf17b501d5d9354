//! Core error kinds shared by every domain operation.

use thiserror::Error;

/// Domain-level failure. `NotFound` and `Conflict` reflect business-rule
/// checks and are non-retryable; `Validation` is a field-level rejection
/// raised before any mutation; `Storage` wraps persistence failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Error::Conflict(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        Error::Validation(what.into())
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Storage(e.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(e.into())
    }
}
