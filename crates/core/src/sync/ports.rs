//! Port interfaces for sync operations

use async_trait::async_trait;
use livesync_domain::{FlushOutcome, Result, SessionId, SyncSummary};

/// Flush primitive supplied by the offline-queue collaborator
#[async_trait]
pub trait QueueFlusher: Send + Sync {
    /// Attempt delivery of every pending entry for `session`
    ///
    /// An empty queue yields `FlushOutcome { synced: 0, failed: 0 }`.
    /// Per-entry failures are reported in `failed`; `Err` is reserved for
    /// failures of the flush call itself.
    async fn flush(&self, session: &SessionId) -> Result<FlushOutcome>;
}

/// User preferences consulted after each flush
pub trait PreferenceSource: Send + Sync {
    /// Read on every call, never cached
    fn show_sync_notifications(&self) -> bool;
}

/// Sink for sync completion summaries
pub trait SyncNotifier: Send + Sync {
    fn notify(&self, summary: SyncSummary);
}
