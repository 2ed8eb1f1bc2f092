//! Presence write counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for presence writes and registrations
#[derive(Debug, Default)]
pub struct PresenceMetrics {
    writes: AtomicU64,
    write_failures: AtomicU64,
    suppressed_writes: AtomicU64,
    registration_failures: AtomicU64,
    throttled_interactions: AtomicU64,
}

/// Point-in-time copy of [`PresenceMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PresenceMetricsSnapshot {
    pub writes: u64,
    pub write_failures: u64,
    pub suppressed_writes: u64,
    pub registration_failures: u64,
    pub throttled_interactions: u64,
}

impl PresenceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.suppressed_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_registration_failure(&self) {
        self.registration_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_throttled(&self) {
        self.throttled_interactions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PresenceMetricsSnapshot {
        PresenceMetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            suppressed_writes: self.suppressed_writes.load(Ordering::Relaxed),
            registration_failures: self.registration_failures.load(Ordering::Relaxed),
            throttled_interactions: self.throttled_interactions.load(Ordering::Relaxed),
        }
    }
}
