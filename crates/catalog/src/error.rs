//! Error types for the catalog crate.
//!
//! Feed loading can fail on I/O, on malformed JSON, or on a field that
//! parses but carries an unsupported value.

use thiserror::Error;

/// Errors that can occur while loading or parsing catalog data
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a feed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A feed line could not be decoded
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
