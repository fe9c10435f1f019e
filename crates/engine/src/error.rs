//! Error types for the engine crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The operation needs an index and none has been built yet
    #[error("Precondition failed: {0}")]
    PreconditionFailed(&'static str),

    /// An item key is not in the corpus
    #[error("Item not found: {key}")]
    NotFound { key: String },

    /// A request parameter is outside its declared range
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Failed to load config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("Ranking failed: {0}")]
    Ranking(#[from] anyhow::Error),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
