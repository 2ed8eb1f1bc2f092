//! Errors surfaced by coordinator entry points
//!
//! Coordinators swallow and log collaborator failures on their automatic
//! paths. These errors only reach callers of explicit operations such as a
//! manual sync.

use std::time::Duration;

use livesync_common::error::{ErrorClassification, ErrorSeverity};
use livesync_domain::LiveSyncError;
use thiserror::Error;

/// Coordinator operation errors
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("{operation} timed out after {duration:?}")]
    Timeout { operation: &'static str, duration: Duration },

    #[error("transport is offline")]
    Offline,

    #[error("a flush is already in flight")]
    FlushInProgress,

    #[error("coordinator for session {0} has shut down")]
    Closed(String),

    #[error("no active session")]
    NoSession,

    #[error(transparent)]
    Port(#[from] LiveSyncError),
}

impl CoordinatorError {
    pub const fn timeout(operation: &'static str, duration: Duration) -> Self {
        Self::Timeout { operation, duration }
    }
}

impl From<CoordinatorError> for LiveSyncError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::Port(inner) => inner,
            CoordinatorError::Timeout { .. } => Self::Timeout(err.to_string()),
            CoordinatorError::Offline => Self::Network(err.to_string()),
            CoordinatorError::FlushInProgress | CoordinatorError::Closed(_) | CoordinatorError::NoSession => {
                Self::Sync(err.to_string())
            }
        }
    }
}

impl ErrorClassification for CoordinatorError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Offline | Self::FlushInProgress => true,
            Self::Closed(_) | Self::NoSession => false,
            Self::Port(inner) => inner.is_transient(),
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Offline | Self::FlushInProgress | Self::Closed(_) => ErrorSeverity::Info,
            Self::Timeout { .. } | Self::NoSession => ErrorSeverity::Warning,
            Self::Port(inner) if inner.is_transient() => ErrorSeverity::Warning,
            Self::Port(LiveSyncError::Internal(_)) => ErrorSeverity::Critical,
            Self::Port(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;
