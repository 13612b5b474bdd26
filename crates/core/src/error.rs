//! Error types for the subword tokenizer libraries.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer libraries.
///
/// Tokenization, encoding and decoding are total and never produce one of
/// these; errors only come out of training validation and the I/O boundaries.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Invalid configuration, rejected before any state is touched
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Regex pre-tokenization pattern that does not compile
    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Persisted data that does not describe a valid tokenizer
    #[error("Malformed tokenizer data: {0}")]
    Format(String),

    /// Save error
    #[error("Save error: {0}")]
    Save(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Vocabulary overflow
    #[error("Vocabulary size exceeded maximum of {max} (tried to add {tried})")]
    VocabularyOverflow { max: usize, tried: usize },
}

impl TokenizerError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
