//! Offline queue types

use std::ops::AddAssign;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One buffered action awaiting acknowledgment by the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineQueueEntry {
    pub id: Uuid, // UUIDv7, orders entries by enqueue time
    /// Semantic identity of the action; repeated attempts share it
    pub dedup_key: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    pub attempt_count: u32,
}

impl OfflineQueueEntry {
    pub fn new(dedup_key: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            dedup_key: dedup_key.into(),
            payload,
            enqueued_at: Utc::now(),
            attempt_count: 0,
        }
    }
}

/// Result of one flush call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushOutcome {
    pub synced: u32,
    pub failed: u32,
}

impl FlushOutcome {
    pub const fn new(synced: u32, failed: u32) -> Self {
        Self { synced, failed }
    }

    pub const fn is_empty(&self) -> bool {
        self.synced == 0 && self.failed == 0
    }

    /// Some entries synced and some failed
    pub const fn is_partial(&self) -> bool {
        self.synced > 0 && self.failed > 0
    }
}

impl AddAssign for FlushOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.synced += rhs.synced;
        self.failed += rhs.failed;
    }
}

/// Counts-only notification emitted after a flush that synced something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub synced: u32,
    pub failed: u32,
}

impl From<FlushOutcome> for SyncSummary {
    fn from(outcome: FlushOutcome) -> Self {
        Self { synced: outcome.synced, failed: outcome.failed }
    }
}
