//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for LiveSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LiveSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Presence error: {0}")]
    Presence(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Preference error: {0}")]
    Preference(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LiveSyncError {
    /// Whether the failure is expected to clear on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_) | Self::Sync(_))
    }
}

impl From<serde_json::Error> for LiveSyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for LiveSync operations
pub type Result<T> = std::result::Result<T, LiveSyncError>;
