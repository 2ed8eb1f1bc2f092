//! Per-session coordinator state owned by the lifecycle bridge

use livesync_common::bus::{Subscription, SubscriptionSet};
use livesync_domain::SessionId;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::presence::PresenceCoordinator;
use crate::sync::SyncCoordinator;

/// Everything a running session owns: both coordinators, their timers and
/// every listener registered at start
///
/// Built fresh on each session start and consumed by [`Self::teardown`], so
/// nothing survives into the next session.
#[derive(Debug)]
pub struct CoordinatorRuntimeState {
    session_id: SessionId,
    presence: PresenceCoordinator,
    sync: SyncCoordinator,
    subscriptions: SubscriptionSet,
    started_at: Instant,
}

impl CoordinatorRuntimeState {
    pub(crate) fn new(session_id: SessionId, presence: PresenceCoordinator, sync: SyncCoordinator) -> Self {
        Self { session_id, presence, sync, subscriptions: SubscriptionSet::new(), started_at: Instant::now() }
    }

    pub(crate) fn subscribe(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn presence(&self) -> &PresenceCoordinator {
        &self.presence
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn is_flush_in_flight(&self) -> bool {
        self.sync.is_flush_in_flight()
    }

    /// Idle timer, periodic sync timer and pending debounce that are armed
    pub fn active_timer_count(&self) -> usize {
        [self.presence.is_idle_timer_active(), self.sync.is_periodic_active(), self.sync.is_debounce_pending()]
            .into_iter()
            .filter(|active| *active)
            .count()
    }

    pub fn active_listener_count(&self) -> usize {
        self.subscriptions.active_count()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Unsubscribe every listener and cancel all timers without writing
    pub(crate) fn abandon(mut self) {
        self.subscriptions.teardown();
        self.sync.shutdown();
        self.presence.shutdown();
    }

    /// Unsubscribe every listener, cancel all timers and write `offline`
    pub(crate) async fn teardown(mut self) {
        self.subscriptions.teardown();
        self.sync.shutdown();
        self.presence.end_session().await;
        debug!(
            session = %self.session_id,
            uptime_secs = self.uptime().as_secs(),
            "coordinator runtime state cleared"
        );
    }
}
