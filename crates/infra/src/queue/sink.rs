//! Remote delivery port for queued actions

use std::collections::HashSet;

use async_trait::async_trait;
use livesync_domain::{LiveSyncError, OfflineQueueEntry, Result, SessionId};
use parking_lot::Mutex;

/// Delivers one queued action to the remote store
///
/// `Ok` means the store acknowledged the action and it may be removed.
#[async_trait]
pub trait RemoteActionSink: Send + Sync {
    async fn deliver(&self, session: &SessionId, entry: &OfflineQueueEntry) -> Result<()>;
}

/// Sink that acknowledges everything except keys marked as failing
#[derive(Debug, Default)]
pub struct InMemoryActionSink {
    delivered: Mutex<Vec<(SessionId, OfflineQueueEntry)>>,
    failing_keys: Mutex<HashSet<String>>,
}

impl InMemoryActionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_key(&self, dedup_key: impl Into<String>) {
        self.failing_keys.lock().insert(dedup_key.into());
    }

    pub fn recover_key(&self, dedup_key: &str) {
        self.failing_keys.lock().remove(dedup_key);
    }

    pub fn delivered(&self) -> Vec<OfflineQueueEntry> {
        self.delivered.lock().iter().map(|(_, entry)| entry.clone()).collect()
    }

    pub fn delivered_keys(&self) -> Vec<String> {
        self.delivered.lock().iter().map(|(_, entry)| entry.dedup_key.clone()).collect()
    }
}

#[async_trait]
impl RemoteActionSink for InMemoryActionSink {
    async fn deliver(&self, session: &SessionId, entry: &OfflineQueueEntry) -> Result<()> {
        if self.failing_keys.lock().contains(&entry.dedup_key) {
            return Err(LiveSyncError::Network(format!("remote store rejected {}", entry.dedup_key)));
        }
        self.delivered.lock().push((session.clone(), entry.clone()));
        Ok(())
    }
}
