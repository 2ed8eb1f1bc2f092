//! Error classification shared by the coordinator crates
//!
//! Each layer keeps its own error enum and implements
//! [`ErrorClassification`] on it:
//!
//! ```rust,ignore
//! impl ErrorClassification for CoordinatorError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Timeout { .. } | Self::Offline)
//!     }
//!     // ...
//! }
//! ```
//!
//! Nothing in the presence/sync subsystem is fatal to a session; severity is
//! used purely to pick between `warn!` and `error!`.

use std::fmt;

/// Standard interface for classifying errors
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: a later natural trigger (timer tick,
    /// reconnect, queue mutation) may succeed where this attempt failed.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
