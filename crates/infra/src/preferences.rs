//! User preference sources
//!
//! The sync coordinator reads the notification toggle after every flush, so
//! both sources answer from current state on each call.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use livesync_core::PreferenceSource;
use livesync_domain::{LiveSyncError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// On-disk preference document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub show_sync_notifications: bool,
}

/// JSON preference file, re-read on every query
///
/// A missing or unreadable file means every preference is off.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Preferences> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(err) => Err(LiveSyncError::Preference(format!("failed to read {}: {err}", self.path.display()))),
        }
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        let contents = serde_json::to_string_pretty(preferences)?;
        std::fs::write(&self.path, contents)
            .map_err(|err| LiveSyncError::Preference(format!("failed to write {}: {err}", self.path.display())))
    }

    pub fn set_show_sync_notifications(&self, enabled: bool) -> Result<()> {
        let mut preferences = self.load().unwrap_or_default();
        preferences.show_sync_notifications = enabled;
        self.save(&preferences)
    }
}

impl PreferenceSource for FilePreferenceStore {
    fn show_sync_notifications(&self) -> bool {
        match self.load() {
            Ok(preferences) => preferences.show_sync_notifications,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "preference file unreadable; notifications off");
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    show_sync_notifications: AtomicBool,
}

impl MemoryPreferences {
    pub fn new(show_sync_notifications: bool) -> Self {
        Self { show_sync_notifications: AtomicBool::new(show_sync_notifications) }
    }

    pub fn set_show_sync_notifications(&self, enabled: bool) {
        self.show_sync_notifications.store(enabled, Ordering::SeqCst);
    }
}

impl PreferenceSource for MemoryPreferences {
    fn show_sync_notifications(&self) -> bool {
        self.show_sync_notifications.load(Ordering::SeqCst)
    }
}
