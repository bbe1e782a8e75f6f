//! Application error types.

use thiserror::Error;

use crate::source::SourceError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl AppError {
    /// Whether the requested story does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Source(SourceError::NotFound(_)))
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
