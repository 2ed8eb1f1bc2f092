//! In-memory offline queue

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use livesync_core::QueueFlusher;
use livesync_domain::{FlushOutcome, LiveSyncError, OfflineQueueEntry, Result, SessionId};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::sink::RemoteActionSink;

/// Pending entries kept per session before enqueue is refused
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

type MutationHook = Arc<dyn Fn() + Send + Sync>;

pub struct InMemoryOfflineQueue {
    entries: Mutex<HashMap<SessionId, Vec<OfflineQueueEntry>>>,
    sink: Arc<dyn RemoteActionSink>,
    capacity: usize,
    on_mutation: Option<MutationHook>,
}

impl InMemoryOfflineQueue {
    pub fn new(sink: Arc<dyn RemoteActionSink>) -> Self {
        Self { entries: Mutex::new(HashMap::new()), sink, capacity: DEFAULT_QUEUE_CAPACITY, on_mutation: None }
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Called after every enqueue that changed the queue
    #[must_use]
    pub fn with_mutation_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_mutation = Some(Arc::new(hook));
        self
    }

    /// Buffer an action for `session`
    ///
    /// Re-enqueueing a pending action with the same key and payload returns
    /// the existing entry's id and leaves the queue unchanged.
    ///
    /// # Errors
    /// Returns `LiveSyncError::Sync` when the session's queue is full.
    pub fn enqueue(&self, session: &SessionId, dedup_key: &str, payload: serde_json::Value) -> Result<Uuid> {
        let id = {
            let mut entries = self.entries.lock();
            let pending = entries.entry(session.clone()).or_default();

            if let Some(existing) =
                pending.iter().find(|entry| entry.dedup_key == dedup_key && entry.payload == payload)
            {
                debug!(session = %session, dedup_key, "identical action already queued");
                return Ok(existing.id);
            }
            if pending.len() >= self.capacity {
                return Err(LiveSyncError::Sync(format!(
                    "offline queue full ({} entries); flush before enqueueing more",
                    self.capacity
                )));
            }

            let entry = OfflineQueueEntry::new(dedup_key, payload);
            let id = entry.id;
            pending.push(entry);
            id
        };

        if let Some(hook) = &self.on_mutation {
            hook();
        }
        Ok(id)
    }

    pub fn pending(&self, session: &SessionId) -> Vec<OfflineQueueEntry> {
        self.entries.lock().get(session).cloned().unwrap_or_default()
    }

    pub fn len(&self, session: &SessionId) -> usize {
        self.entries.lock().get(session).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, session: &SessionId) -> bool {
        self.len(session) == 0
    }

    /// Pending entries across every session
    pub fn total_pending(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for InMemoryOfflineQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryOfflineQueue")
            .field("sessions", &self.entries.lock().len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueueFlusher for InMemoryOfflineQueue {
    /// Deliver pending entries in enqueue order
    ///
    /// A failed entry keeps its place and blocks later entries with the same
    /// key until the next flush. Entries enqueued while the flush runs wait
    /// for the next one.
    #[instrument(skip(self, session), fields(session = %session))]
    async fn flush(&self, session: &SessionId) -> Result<FlushOutcome> {
        let snapshot = self.pending(session);
        if snapshot.is_empty() {
            return Ok(FlushOutcome::default());
        }

        let mut acked = HashSet::new();
        let mut failed = HashSet::new();
        let mut blocked_keys = HashSet::new();

        for entry in &snapshot {
            if blocked_keys.contains(entry.dedup_key.as_str()) {
                debug!(entry_id = %entry.id, dedup_key = %entry.dedup_key, "skipped behind failed entry");
                continue;
            }
            match self.sink.deliver(session, entry).await {
                Ok(()) => {
                    acked.insert(entry.id);
                }
                Err(err) => {
                    warn!(
                        entry_id = %entry.id,
                        dedup_key = %entry.dedup_key,
                        attempt = entry.attempt_count + 1,
                        error = %err,
                        "queued action delivery failed"
                    );
                    failed.insert(entry.id);
                    blocked_keys.insert(entry.dedup_key.as_str());
                }
            }
        }

        {
            let mut entries = self.entries.lock();
            if let Some(pending) = entries.get_mut(session) {
                pending.retain(|entry| !acked.contains(&entry.id));
                for entry in pending.iter_mut().filter(|entry| failed.contains(&entry.id)) {
                    entry.attempt_count += 1;
                }
            }
        }

        let outcome = FlushOutcome::new(count(&acked), count(&failed));
        info!(synced = outcome.synced, failed = outcome.failed, remaining = self.len(session), "queue flushed");
        Ok(outcome)
    }
}

fn count(ids: &HashSet<Uuid>) -> u32 {
    u32::try_from(ids.len()).unwrap_or(u32::MAX)
}
