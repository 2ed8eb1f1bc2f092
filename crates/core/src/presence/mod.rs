//! Session presence: the online/idle/offline state machine

pub mod coordinator;
pub mod metrics;
pub mod ports;

pub use coordinator::PresenceCoordinator;
pub use metrics::{PresenceMetrics, PresenceMetricsSnapshot};
