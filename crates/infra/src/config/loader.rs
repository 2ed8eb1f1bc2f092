//! Configuration loader
//!
//! Loads coordinator configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If any `LIVESYNC_*` variable is set, the environment wins: unset
//!    variables keep their defaults
//! 2. Otherwise probes multiple paths for a config file (JSON or TOML)
//! 3. With neither present, the built-in defaults apply
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `LIVESYNC_IDLE_THRESHOLD_SECS`: Seconds without interaction before `idle`
//! - `LIVESYNC_INTERACTION_THROTTLE_MS`: Minimum gap between handled interactions
//! - `LIVESYNC_PRESENCE_WRITE_TIMEOUT_SECS`: Upper bound on one presence write
//! - `LIVESYNC_SYNC_DEBOUNCE_MS`: Quiet period after the last queue mutation
//! - `LIVESYNC_SYNC_PERIODIC_SECS`: Periodic flush interval while online
//! - `LIVESYNC_BACKGROUND_WAKEUP_SECS`: Interval requested from the host
//! - `LIVESYNC_MANUAL_SYNC_TIMEOUT_SECS`: Deadline for a manual sync
//! - `LIVESYNC_PREFERENCES_PATH`: JSON preference file
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./livesync.json` or `./livesync.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../livesync.{json,toml}` and `../../livesync.{json,toml}`
//! 4. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use livesync_domain::Config;

use super::error::ConfigError;

pub const ENV_IDLE_THRESHOLD_SECS: &str = "LIVESYNC_IDLE_THRESHOLD_SECS";
pub const ENV_INTERACTION_THROTTLE_MS: &str = "LIVESYNC_INTERACTION_THROTTLE_MS";
pub const ENV_PRESENCE_WRITE_TIMEOUT_SECS: &str = "LIVESYNC_PRESENCE_WRITE_TIMEOUT_SECS";
pub const ENV_SYNC_DEBOUNCE_MS: &str = "LIVESYNC_SYNC_DEBOUNCE_MS";
pub const ENV_SYNC_PERIODIC_SECS: &str = "LIVESYNC_SYNC_PERIODIC_SECS";
pub const ENV_BACKGROUND_WAKEUP_SECS: &str = "LIVESYNC_BACKGROUND_WAKEUP_SECS";
pub const ENV_MANUAL_SYNC_TIMEOUT_SECS: &str = "LIVESYNC_MANUAL_SYNC_TIMEOUT_SECS";
pub const ENV_PREFERENCES_PATH: &str = "LIVESYNC_PREFERENCES_PATH";

const ENV_KEYS: [&str; 8] = [
    ENV_IDLE_THRESHOLD_SECS,
    ENV_INTERACTION_THROTTLE_MS,
    ENV_PRESENCE_WRITE_TIMEOUT_SECS,
    ENV_SYNC_DEBOUNCE_MS,
    ENV_SYNC_PERIODIC_SECS,
    ENV_BACKGROUND_WAKEUP_SECS,
    ENV_MANUAL_SYNC_TIMEOUT_SECS,
    ENV_PREFERENCES_PATH,
];

const FILE_STEMS: [&str; 2] = ["livesync", "config"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns a [`ConfigError`] if the chosen source is malformed or the
/// resulting configuration fails validation.
pub fn load() -> Result<Config, ConfigError> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigError::EnvironmentUnset) => match probe_config_paths() {
            Some(path) => load_from_file(Some(path)),
            None => {
                tracing::info!("No configuration found; using defaults");
                Ok(Config::default())
            }
        },
        Err(err) => Err(err),
    }
}

/// Load configuration from `LIVESYNC_*` environment variables
///
/// Unset variables keep their default values.
///
/// # Errors
/// Returns [`ConfigError::EnvironmentUnset`] when no variable is set, and
/// [`ConfigError::InvalidValue`] when one does not parse.
pub fn load_from_env() -> Result<Config, ConfigError> {
    if !ENV_KEYS.iter().any(|key| std::env::var_os(key).is_some()) {
        return Err(ConfigError::EnvironmentUnset);
    }

    let mut config = Config::default();
    override_from_env(&mut config.presence.idle_threshold_secs, ENV_IDLE_THRESHOLD_SECS)?;
    override_from_env(&mut config.presence.interaction_throttle_ms, ENV_INTERACTION_THROTTLE_MS)?;
    override_from_env(&mut config.presence.write_timeout_secs, ENV_PRESENCE_WRITE_TIMEOUT_SECS)?;
    override_from_env(&mut config.sync.debounce_ms, ENV_SYNC_DEBOUNCE_MS)?;
    override_from_env(&mut config.sync.periodic_interval_secs, ENV_SYNC_PERIODIC_SECS)?;
    override_from_env(&mut config.sync.background_wakeup_interval_secs, ENV_BACKGROUND_WAKEUP_SECS)?;
    override_from_env(&mut config.sync.manual_timeout_secs, ENV_MANUAL_SYNC_TIMEOUT_SECS)?;
    if let Some(path) = std::env::var_os(ENV_PREFERENCES_PATH).filter(|path| !path.is_empty()) {
        config.preferences.path = Some(PathBuf::from(path));
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns a [`ConfigError`] if the file is missing, unreadable, malformed
/// or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(path) if path.exists() => path,
        Some(path) => return Err(ConfigError::NotFound(path)),
        None => probe_config_paths().ok_or_else(|| ConfigError::NotFound(PathBuf::from("livesync.{json,toml}")))?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Format is detected by file extension (`.json` or `.toml`)
fn parse_config(contents: &str, path: &Path) -> Result<Config, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "TOML",
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        "json" => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
            format: "JSON",
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots.iter().flat_map(|root| candidates_in(root)).find(|path| path.exists())
}

fn candidates_in(root: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for stem in FILE_STEMS {
        candidates.push(root.join(format!("{stem}.json")));
        candidates.push(root.join(format!("{stem}.toml")));
    }
    for parent in ["..", "../.."] {
        candidates.push(root.join(parent).join("livesync.json"));
        candidates.push(root.join(parent).join("livesync.toml"));
    }
    candidates
}

fn override_from_env<T>(target: &mut T, key: &'static str) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(raw) = std::env::var(key) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}
