//! In-memory presence store
//!
//! Reference [`PresencePath`] with the remote store's semantics: the server
//! stamps every commit, stamps never go backwards for a key, and disconnect
//! actions registered by a client run when its transport drops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use livesync_core::PresencePath;
use livesync_domain::{LiveSyncError, PresenceRecord, PresenceWrite, Result, SessionId};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Default)]
struct StoreState {
    records: HashMap<SessionId, PresenceRecord>,
    disconnect_actions: HashMap<SessionId, PresenceWrite>,
    log: Vec<PresenceRecord>,
}

impl StoreState {
    /// Resolve the server timestamp and commit
    fn commit(&mut self, session: &SessionId, update: PresenceWrite) -> PresenceRecord {
        let now = Utc::now();
        let last_changed = match self.records.get(session) {
            Some(previous) if previous.last_changed >= now => previous.last_changed + ChronoDuration::milliseconds(1),
            _ => now,
        };

        let record = PresenceRecord { session_id: session.clone(), state: update.state, last_changed };
        self.records.insert(session.clone(), record.clone());
        self.log.push(record.clone());
        record
    }
}

pub struct InMemoryPresenceStore {
    state: Mutex<StoreState>,
    connected: watch::Sender<bool>,
    fail_writes: AtomicBool,
}

impl InMemoryPresenceStore {
    pub fn new() -> Self {
        let (connected, _) = watch::channel(false);
        Self { state: Mutex::new(StoreState::default()), connected, fail_writes: AtomicBool::new(false) }
    }

    /// Simulate the client transport connecting or dropping
    ///
    /// Dropping runs every registered disconnect action on the server side.
    pub fn set_connected(&self, connected: bool) {
        if !connected {
            let mut state = self.state.lock();
            let actions: Vec<_> = state.disconnect_actions.drain().collect();
            for (session, update) in actions {
                let record = state.commit(&session, update);
                info!(session = %session, state = %record.state, "disconnect action executed");
            }
        }
        self.connected.send_replace(connected);
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Reject subsequent writes and registrations
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn record(&self, session: &SessionId) -> Option<PresenceRecord> {
        self.state.lock().records.get(session).cloned()
    }

    /// Every commit in order, including executed disconnect actions
    pub fn write_log(&self) -> Vec<PresenceRecord> {
        self.state.lock().log.clone()
    }

    pub fn disconnect_action(&self, session: &SessionId) -> Option<PresenceWrite> {
        self.state.lock().disconnect_actions.get(session).copied()
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LiveSyncError::Presence("presence store rejected the request".into()));
        }
        if !self.is_connected() {
            return Err(LiveSyncError::Network("presence transport is disconnected".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryPresenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryPresenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("InMemoryPresenceStore")
            .field("connected", &self.is_connected())
            .field("records", &state.records.len())
            .field("pending_disconnect_actions", &state.disconnect_actions.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PresencePath for InMemoryPresenceStore {
    async fn write(&self, session: &SessionId, update: PresenceWrite) -> Result<()> {
        self.check_available()?;
        let record = self.state.lock().commit(session, update);
        debug!(session = %session, state = %record.state, "presence committed");
        Ok(())
    }

    async fn register_disconnect_action(&self, session: &SessionId, update: PresenceWrite) -> Result<()> {
        self.check_available()?;
        self.state.lock().disconnect_actions.insert(session.clone(), update);
        debug!(session = %session, state = %update.state, "disconnect action registered");
        Ok(())
    }

    fn connectivity(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }
}

/// Stamp ordering for one key, oldest first
pub fn is_monotonic(records: &[PresenceRecord]) -> bool {
    let mut last: HashMap<&SessionId, DateTime<Utc>> = HashMap::new();
    records.iter().all(|record| {
        let ordered = last.get(&record.session_id).map_or(true, |previous| record.last_changed > *previous);
        last.insert(&record.session_id, record.last_changed);
        ordered
    })
}
