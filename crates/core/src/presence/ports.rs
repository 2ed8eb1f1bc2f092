//! Port interfaces for the presence path

use async_trait::async_trait;
use livesync_domain::{PresenceWrite, Result, SessionId};
use tokio::sync::watch;

/// Per-session presence location in the remote store
#[async_trait]
pub trait PresencePath: Send + Sync {
    /// Write the session's presence state
    async fn write(&self, session: &SessionId, update: PresenceWrite) -> Result<()>;

    /// Register the write the remote side applies when this client's
    /// transport link is torn down
    ///
    /// Resolves once the remote store has acknowledged the registration.
    async fn register_disconnect_action(&self, session: &SessionId, update: PresenceWrite) -> Result<()>;

    /// Transport connectivity as seen by the presence store
    fn connectivity(&self) -> watch::Receiver<bool>;
}
