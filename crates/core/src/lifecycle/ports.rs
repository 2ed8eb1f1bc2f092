//! Port interfaces for the host environment

use std::time::Duration;

use async_trait::async_trait;
use livesync_domain::{HostSignal, InteractionEvent, Result, SessionId};
use tokio::sync::broadcast;

/// Host process signals and background-execution facility
#[async_trait]
pub trait HostEnvironment: Send + Sync {
    /// Current transport state as reported by the host
    fn is_online(&self) -> bool;

    /// Transport edges, queue mutations and external wake-ups
    ///
    /// `TransportOnline` and `TransportOffline` are delivered once per edge.
    fn signals(&self) -> broadcast::Receiver<HostSignal>;

    /// Low-level user activity
    fn interactions(&self) -> broadcast::Receiver<InteractionEvent>;

    /// Ask the host to deliver `HostSignal::ExternalWake` roughly every
    /// `interval`, even after the process has been suspended
    async fn register_background_wakeup(&self, session: &SessionId, interval: Duration) -> Result<()>;
}
