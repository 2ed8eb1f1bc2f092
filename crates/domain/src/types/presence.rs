//! Presence record types
//!
//! A session's liveness is a single [`PresenceRecord`] in the remote store.
//! Clients never send a timestamp; they send [`ServerTimestamp`] and the
//! store substitutes its own commit time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LiveSyncError, Result};
use crate::impl_wire_name_conversions;

/// Identifier of the authenticated entity owning a presence record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Build a session id, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(LiveSyncError::InvalidInput("session id must not be empty".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Three-state liveness signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Online,
    Idle,
    #[default]
    Offline,
}

impl_wire_name_conversions!(PresenceState {
    Online => "online",
    Idle => "idle",
    Offline => "offline",
});

/// Placeholder resolved to the remote store's commit time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerTimestamp {
    #[serde(rename = ".sv")]
    marker: ServerValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ServerValue {
    #[default]
    Timestamp,
}

impl ServerTimestamp {
    pub const fn now() -> Self {
        Self { marker: ServerValue::Timestamp }
    }
}

/// Payload sent to the presence path, for both direct writes and the
/// disconnect action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceWrite {
    pub state: PresenceState,
    pub last_changed: ServerTimestamp,
}

impl PresenceWrite {
    pub const fn new(state: PresenceState) -> Self {
        Self { state, last_changed: ServerTimestamp::now() }
    }

    pub const fn online() -> Self {
        Self::new(PresenceState::Online)
    }

    pub const fn idle() -> Self {
        Self::new(PresenceState::Idle)
    }

    pub const fn offline() -> Self {
        Self::new(PresenceState::Offline)
    }
}

/// Committed presence fact as held by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub session_id: SessionId,
    pub state: PresenceState,
    pub last_changed: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_rejects_blank() {
        assert!(SessionId::new("  ").is_err());
        assert_eq!(SessionId::new(" user-1 ").unwrap().as_str(), "user-1");
    }

    #[test]
    fn presence_write_serializes_server_timestamp_sentinel() {
        let json = serde_json::to_value(PresenceWrite::online()).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "online", "lastChanged": { ".sv": "timestamp" } }));
    }

    #[test]
    fn presence_state_wire_names() {
        assert_eq!(PresenceState::Idle.to_string(), "idle");
        assert_eq!("OFFLINE".parse::<PresenceState>(), Ok(PresenceState::Offline));
        assert_eq!(PresenceState::default(), PresenceState::Offline);
    }
}
