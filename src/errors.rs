//! Structured error types for idlebell
//!
//! Uses thiserror for ergonomic error definitions with automatic Display
//! and Error trait implementations. None of these are fatal: callers log
//! them and fall back to a boolean or an exit code.

use std::time::Duration;

use thiserror::Error;

/// All possible errors in idlebell
#[derive(Error, Debug)]
pub enum IdlebellError {
    /// Flag file, status file or process I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Status file or hook payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary or service behind a mechanism is missing on this host
    #[error("{mechanism} is not available on this host")]
    Unavailable { mechanism: &'static str },

    /// Mechanism ran but reported failure
    #[error("{mechanism} failed: {reason}")]
    Failed {
        mechanism: &'static str,
        reason: String,
    },

    /// Mechanism did not finish within its time bound
    #[error("{mechanism} timed out after {after:?}")]
    Timeout {
        mechanism: &'static str,
        after: Duration,
    },

    /// Every mechanism in the chain failed
    #[error("All {attempted} notification mechanisms failed")]
    Exhausted { attempted: usize },

    /// No mechanism list exists for this operating system
    #[error("Notifications are not supported on '{0}'")]
    Unsupported(String),
}

/// Convenience Result type using IdlebellError
pub type Result<T> = std::result::Result<T, IdlebellError>;
