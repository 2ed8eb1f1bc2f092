//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKGROUND_WAKEUP_SECS, DEFAULT_IDLE_THRESHOLD_SECS, DEFAULT_INTERACTION_THROTTLE_MS,
    DEFAULT_MANUAL_SYNC_TIMEOUT_SECS, DEFAULT_PERIODIC_SYNC_SECS, DEFAULT_PRESENCE_WRITE_TIMEOUT_SECS,
    DEFAULT_SYNC_DEBOUNCE_MS,
};
use crate::errors::{LiveSyncError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub presence: PresenceConfig,
    pub sync: SyncConfig,
    pub preferences: PreferencesConfig,
}

/// Presence coordinator timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub idle_threshold_secs: u64,
    pub interaction_throttle_ms: u64,
    /// Upper bound on a single presence write or disconnect registration
    pub write_timeout_secs: u64,
}

/// Sync coordinator timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub periodic_interval_secs: u64,
    pub background_wakeup_interval_secs: u64,
    pub manual_timeout_secs: u64,
}

/// Where user preferences are read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// JSON preference file; `None` keeps preferences in memory
    pub path: Option<PathBuf>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: DEFAULT_IDLE_THRESHOLD_SECS,
            interaction_throttle_ms: DEFAULT_INTERACTION_THROTTLE_MS,
            write_timeout_secs: DEFAULT_PRESENCE_WRITE_TIMEOUT_SECS,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_SYNC_DEBOUNCE_MS,
            periodic_interval_secs: DEFAULT_PERIODIC_SYNC_SECS,
            background_wakeup_interval_secs: DEFAULT_BACKGROUND_WAKEUP_SECS,
            manual_timeout_secs: DEFAULT_MANUAL_SYNC_TIMEOUT_SECS,
        }
    }
}

impl PresenceConfig {
    pub const fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    pub const fn interaction_throttle(&self) -> Duration {
        Duration::from_millis(self.interaction_throttle_ms)
    }

    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl SyncConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn periodic_interval(&self) -> Duration {
        Duration::from_secs(self.periodic_interval_secs)
    }

    pub const fn background_wakeup_interval(&self) -> Duration {
        Duration::from_secs(self.background_wakeup_interval_secs)
    }

    pub const fn manual_timeout(&self) -> Duration {
        Duration::from_secs(self.manual_timeout_secs)
    }
}

impl Config {
    /// Reject configurations that would disable a timer by setting it to zero
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("presence.idle_threshold_secs", self.presence.idle_threshold_secs),
            ("presence.interaction_throttle_ms", self.presence.interaction_throttle_ms),
            ("presence.write_timeout_secs", self.presence.write_timeout_secs),
            ("sync.debounce_ms", self.sync.debounce_ms),
            ("sync.periodic_interval_secs", self.sync.periodic_interval_secs),
            ("sync.background_wakeup_interval_secs", self.sync.background_wakeup_interval_secs),
            ("sync.manual_timeout_secs", self.sync.manual_timeout_secs),
        ];

        match durations.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(LiveSyncError::Config(format!("{field} must be greater than zero"))),
            None => Ok(()),
        }
    }
}
