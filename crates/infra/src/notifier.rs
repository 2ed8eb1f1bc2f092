//! Sync completion notifier backed by the event bus

use livesync_common::bus::EventBus;
use livesync_core::SyncNotifier;
use livesync_domain::constants::{EVENT_BUS_CAPACITY, EVENT_SYNC_COMPLETED};
use livesync_domain::SyncSummary;
use tokio::sync::broadcast;
use tracing::info;

/// Publishes each summary on the `sync-completed` channel
#[derive(Debug, Clone)]
pub struct BusNotifier {
    bus: EventBus<SyncSummary>,
}

impl BusNotifier {
    pub fn new() -> Self {
        Self { bus: EventBus::new(EVENT_BUS_CAPACITY) }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncSummary> {
        self.bus.subscribe()
    }
}

impl Default for BusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncNotifier for BusNotifier {
    fn notify(&self, summary: SyncSummary) {
        let receivers = self.bus.publish(summary);
        info!(
            event = EVENT_SYNC_COMPLETED,
            synced = summary.synced,
            failed = summary.failed,
            receivers,
            "sync summary published"
        );
    }
}
