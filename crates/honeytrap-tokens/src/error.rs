//! Token store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while managing decoy files.
#[derive(Debug, Error)]
pub enum TokenError {
    /// A filesystem operation on a decoy failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A name that is not one of the managed decoys.
    #[error("unknown honey-token: {0}")]
    UnknownToken(String),

    /// The store cannot answer right now.
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

impl TokenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for token store operations.
pub type TokenResult<T> = Result<T, TokenError>;
