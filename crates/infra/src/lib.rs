//! # LiveSync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (environment and JSON/TOML files)
//! - An in-memory presence store with disconnect-action semantics
//! - An in-memory host environment
//! - An in-memory offline queue implementing the flush primitive
//! - Preference sources and the sync notification bus
//!
//! ## Architecture
//! - Implements traits defined in `livesync-core`
//! - Contains all "impure" code (files, environment, simulated transports)

pub mod config;
pub mod host;
pub mod notifier;
pub mod preferences;
pub mod presence;
pub mod queue;

// Re-export commonly used items
pub use config::ConfigError;
pub use host::{InMemoryHost, WakeupRegistration};
pub use notifier::BusNotifier;
pub use preferences::{FilePreferenceStore, MemoryPreferences, Preferences};
pub use presence::InMemoryPresenceStore;
pub use queue::{InMemoryActionSink, InMemoryOfflineQueue, RemoteActionSink};
