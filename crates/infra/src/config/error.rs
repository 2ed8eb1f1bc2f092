//! Configuration loader errors

use std::path::PathBuf;

use livesync_domain::LiveSyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no LIVESYNC_* configuration variables are set")]
    EnvironmentUnset,

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue { key: &'static str, value: String, reason: String },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {format} in {}: {message}", path.display())]
    Parse { format: &'static str, path: PathBuf, message: String },

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Invalid(#[from] LiveSyncError),
}

impl From<ConfigError> for LiveSyncError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(inner) => inner,
            other => Self::Config(other.to_string()),
        }
    }
}
