//! Monitor error types.

use std::path::PathBuf;

use honeytrap_audit::AuditError;
use honeytrap_tokens::TokenError;
use thiserror::Error;

/// How a failure should be treated by whoever sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The environment is set up wrong; retrying will not help.
    Configuration,
    /// IO hiccup or a watch that died; a later attempt may succeed.
    Transient,
    /// Persisted data is malformed.
    Corruption,
    /// Supervision has given up and needs external intervention.
    Fatal,
}

/// Errors raised by the supervisor lifecycle.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Some honey-tokens are still missing after recreation.
    #[error("failed to recreate honey-tokens: {}", .missing.join(", "))]
    TokensMissing {
        /// Names of the files that could not be recreated.
        missing: Vec<String>,
    },

    /// The token store returned an empty path list.
    #[error("no honey-token paths found")]
    NoProtectedPaths,

    /// The watch root does not exist.
    #[error("watch directory does not exist: {}", .0.display())]
    WatchRootMissing(PathBuf),

    /// The watch root exists but cannot be listed.
    #[error("watch directory is not readable: {}: {reason}", .path.display())]
    WatchRootUnreadable {
        /// The watch root.
        path: PathBuf,
        /// Underlying error message.
        reason: String,
    },

    /// The token store failed outright.
    #[error("token store error: {0}")]
    TokenStore(#[from] TokenError),

    /// The filesystem watcher could not be created or attached.
    #[error("filesystem watch error: {0}")]
    Watch(String),

    /// The watch task exited within the start grace period.
    #[error("file watch failed to start properly")]
    WatchDiedDuringStartup,

    /// Too many restarts without a stable run in between.
    #[error("maximum restart attempts ({max_restarts}) reached, manual intervention required")]
    RestartBudgetExhausted {
        /// The configured budget.
        max_restarts: u32,
    },

    /// Shutdown was signaled while the operation was waiting.
    #[error("operation cancelled by shutdown")]
    Cancelled,
}

impl SupervisorError {
    /// Classify this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NoProtectedPaths | Self::WatchRootMissing(_) | Self::WatchRootUnreadable { .. } => {
                ErrorClass::Configuration
            },
            Self::RestartBudgetExhausted { .. } => ErrorClass::Fatal,
            Self::TokensMissing { .. }
            | Self::TokenStore(_)
            | Self::Watch(_)
            | Self::WatchDiedDuringStartup
            | Self::Cancelled => ErrorClass::Transient,
        }
    }
}

impl From<notify::Error> for SupervisorError {
    fn from(e: notify::Error) -> Self {
        Self::Watch(e.to_string())
    }
}

/// Result type for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Errors raised by the application context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Audit trail failure.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Token store failure.
    #[error(transparent)]
    Tokens(#[from] TokenError),

    /// Supervisor failure.
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// The simulated attack could not touch the decoy.
    #[error("attack simulation failed on {}: {source}", .path.display())]
    Simulation {
        /// The decoy being attacked.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ContextError {
    /// Classify this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Audit(e) if e.is_corruption() => ErrorClass::Corruption,
            Self::Supervisor(e) => e.class(),
            Self::Tokens(TokenError::UnknownToken(_)) => ErrorClass::Configuration,
            Self::Audit(_) | Self::Tokens(_) | Self::Simulation { .. } => ErrorClass::Transient,
        }
    }
}

/// Result type for application context operations.
pub type ContextResult<T> = Result<T, ContextError>;
