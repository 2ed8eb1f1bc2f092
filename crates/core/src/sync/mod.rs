//! Offline queue synchronization triggers

pub mod coordinator;
pub mod metrics;
pub mod ports;

pub use coordinator::{SyncCoordinator, SyncPorts};
pub use metrics::{SyncMetrics, SyncMetricsSnapshot};
