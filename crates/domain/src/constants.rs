//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Presence
pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_INTERACTION_THROTTLE_MS: u64 = 2_000;
pub const DEFAULT_PRESENCE_WRITE_TIMEOUT_SECS: u64 = 10;

// Sync
pub const DEFAULT_SYNC_DEBOUNCE_MS: u64 = 2_000;
pub const DEFAULT_PERIODIC_SYNC_SECS: u64 = 300;
pub const DEFAULT_BACKGROUND_WAKEUP_SECS: u64 = 300;
pub const DEFAULT_MANUAL_SYNC_TIMEOUT_SECS: u64 = 120;

// Event channels
pub const EVENT_SYNC_COMPLETED: &str = "sync-completed";
pub const EVENT_BUS_CAPACITY: usize = 64;

// Preferences
pub const PREF_SHOW_SYNC_NOTIFICATIONS: &str = "show_sync_notifications";
