use livesync_common::error::{ErrorClassification, ErrorSeverity};
use livesync_core::CoordinatorError;
use livesync_domain::{FlushOutcome, LiveSyncError};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Selects JSON output when set to `json`
pub const LOG_FORMAT_ENV: &str = "LIVESYNC_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let result = if json {
        fmt().with_env_filter(filter).json().with_current_span(true).try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    if result.is_ok() {
        info!(json, "tracing initialised");
    }
}

/// Convert a `LiveSyncError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &LiveSyncError) -> &'static str {
    match error {
        LiveSyncError::Config(_) => "config",
        LiveSyncError::Presence(_) => "presence",
        LiveSyncError::Sync(_) => "sync",
        LiveSyncError::Network(_) => "network",
        LiveSyncError::Host(_) => "host",
        LiveSyncError::Preference(_) => "preference",
        LiveSyncError::Timeout(_) => "timeout",
        LiveSyncError::InvalidInput(_) => "invalid_input",
        LiveSyncError::Internal(_) => "internal",
    }
}

/// Log the outcome of a manual sync with structured fields.
///
/// The log level follows the error's severity.
pub fn log_manual_sync(result: &Result<FlushOutcome, CoordinatorError>) {
    let err = match result {
        Ok(outcome) => {
            info!(synced = outcome.synced, failed = outcome.failed, "manual_sync_completed");
            return;
        }
        Err(err) => err,
    };

    let error_type = match err {
        CoordinatorError::Port(inner) => error_label(inner),
        _ => "coordinator",
    };
    let retryable = err.is_retryable();
    match err.severity() {
        ErrorSeverity::Info => info!(error_type, retryable, error = %err, "manual_sync_rejected"),
        ErrorSeverity::Warning => warn!(error_type, retryable, error = %err, "manual_sync_failed"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(error_type, retryable, error = %err, "manual_sync_failed");
        }
    }
}
