//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur with the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A persisted collection exists but cannot be decoded.
    #[error("corrupt audit data in {location}: {reason}")]
    Corrupt {
        /// File or backend holding the bad data.
        location: String,
        /// Decoder message.
        reason: String,
    },

    /// An attack identifier did not match the `ATK_<n>` form.
    #[error("invalid attack id: {0}")]
    InvalidId(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Whether this error means persisted data is malformed rather than
    /// unreachable.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
