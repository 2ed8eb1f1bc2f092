//! Sync trigger and flush counters

use std::sync::atomic::{AtomicU64, Ordering};

use livesync_domain::FlushOutcome;
use serde::Serialize;

/// Counters for triggers, flush calls and their outcomes
#[derive(Debug, Default)]
pub struct SyncMetrics {
    triggers: AtomicU64,
    flush_calls: AtomicU64,
    dropped_in_flight: AtomicU64,
    ignored_offline: AtomicU64,
    flush_failures: AtomicU64,
    synced_entries: AtomicU64,
    failed_entries: AtomicU64,
    notifications: AtomicU64,
    wakeup_failures: AtomicU64,
}

/// Point-in-time copy of [`SyncMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncMetricsSnapshot {
    pub triggers: u64,
    pub flush_calls: u64,
    pub dropped_in_flight: u64,
    pub ignored_offline: u64,
    pub flush_failures: u64,
    pub synced_entries: u64,
    pub failed_entries: u64,
    pub notifications: u64,
    pub wakeup_failures: u64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_trigger(&self) {
        self.triggers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush_call(&self) {
        self.flush_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped_in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ignored_offline(&self) {
        self.ignored_offline.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush_failure(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_outcome(&self, outcome: FlushOutcome) {
        self.synced_entries.fetch_add(u64::from(outcome.synced), Ordering::Relaxed);
        self.failed_entries.fetch_add(u64::from(outcome.failed), Ordering::Relaxed);
    }

    pub(crate) fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_wakeup_failure(&self) {
        self.wakeup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            triggers: self.triggers.load(Ordering::Relaxed),
            flush_calls: self.flush_calls.load(Ordering::Relaxed),
            dropped_in_flight: self.dropped_in_flight.load(Ordering::Relaxed),
            ignored_offline: self.ignored_offline.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
            synced_entries: self.synced_entries.load(Ordering::Relaxed),
            failed_entries: self.failed_entries.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            wakeup_failures: self.wakeup_failures.load(Ordering::Relaxed),
        }
    }
}
