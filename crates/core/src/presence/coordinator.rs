//! Presence coordinator
//!
//! Drives one session's presence record through `online`, `idle` and
//! `offline`:
//!
//! - On every connectivity edge to `true` the coordinator registers the
//!   offline disconnect action and only then writes `online`. Both steps run
//!   sequentially inside the connectivity listener, so a later edge is never
//!   handled before the current attach has resolved.
//! - Qualifying interactions pass a leading-edge throttle, re-arm the idle
//!   timer and restore `online` from `idle`.
//! - The idle timer moves `online` to `idle` after the configured threshold.
//!   It is armed at start and re-armed after each attach that writes `online`.
//! - [`PresenceCoordinator::end_session`] writes `offline` directly.
//!
//! Every write goes through a check-and-set on the recorded state, so a write
//! that would not change the state is never sent. Writes are serialized by
//! `write_lock`, which is held across the remote call; once `closed` is set
//! the session-end `offline` write is the last one to reach the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use livesync_common::bus::Subscription;
use livesync_common::time::{schedule, Throttle, TimerHandle};
use livesync_domain::{InteractionEvent, PresenceConfig, PresenceState, PresenceWrite, SessionId};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::metrics::{PresenceMetrics, PresenceMetricsSnapshot};
use super::ports::PresencePath;

/// Presence state machine for a single session
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct PresenceCoordinator {
    inner: Arc<PresenceInner>,
}

struct PresenceInner {
    session_id: SessionId,
    path: Arc<dyn PresencePath>,
    config: PresenceConfig,
    /// Last state this coordinator wrote, or assumed after a detach
    state: Mutex<PresenceState>,
    connected: AtomicBool,
    closed: AtomicBool,
    write_lock: tokio::sync::Mutex<()>,
    throttle: Throttle,
    idle_timer: Mutex<Option<TimerHandle>>,
    metrics: PresenceMetrics,
}

impl PresenceCoordinator {
    pub fn new(session_id: SessionId, path: Arc<dyn PresencePath>, config: &PresenceConfig) -> Self {
        let inner = PresenceInner {
            session_id,
            path,
            config: config.clone(),
            state: Mutex::new(PresenceState::Offline),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            write_lock: tokio::sync::Mutex::new(()),
            throttle: Throttle::new(config.interaction_throttle()),
            idle_timer: Mutex::new(None),
            metrics: PresenceMetrics::new(),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    /// Recorded presence state
    pub fn state(&self) -> PresenceState {
        *self.inner.state.lock()
    }

    pub fn is_idle_timer_active(&self) -> bool {
        self.inner.idle_timer.lock().as_ref().is_some_and(TimerHandle::is_active)
    }

    pub fn metrics(&self) -> PresenceMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Arm the idle timer and follow the presence path's connectivity
    ///
    /// The returned subscription owns the connectivity listener.
    #[instrument(skip(self), fields(session = %self.inner.session_id))]
    pub fn start(&self) -> Subscription {
        PresenceInner::arm_idle_timer(&self.inner);

        let coordinator = self.clone();
        Subscription::watch("presence-connectivity", self.inner.path.connectivity(), move |connected| {
            let coordinator = coordinator.clone();
            async move { coordinator.handle_connectivity(connected).await }
        })
    }

    /// React to a connectivity value from the presence path
    pub async fn handle_connectivity(&self, connected: bool) {
        let was_connected = self.inner.connected.swap(connected, Ordering::SeqCst);
        match (was_connected, connected) {
            (false, true) => self.inner.attach().await,
            (true, false) => {
                // The registered disconnect action owns the remote offline write.
                *self.inner.state.lock() = PresenceState::Offline;
                info!(session = %self.inner.session_id, "presence transport detached");
            }
            _ => {}
        }
    }

    /// React to a user interaction reported by the host
    pub async fn handle_interaction(&self, event: InteractionEvent) {
        if !event.is_qualifying() {
            debug!(session = %self.inner.session_id, event = %event, "ignoring non-qualifying interaction");
            return;
        }
        if self.inner.is_closed() {
            return;
        }
        if !self.inner.throttle.try_acquire() {
            self.inner.metrics.record_throttled();
            return;
        }

        PresenceInner::arm_idle_timer(&self.inner);
        self.inner.transition(PresenceState::Idle, PresenceState::Online).await;
    }

    /// Graceful transition to `offline` on session end
    ///
    /// Cancels the idle timer and writes `offline` whatever the recorded
    /// state. No further writes are made afterwards.
    #[instrument(skip(self), fields(session = %self.inner.session_id))]
    pub async fn end_session(&self) {
        self.shutdown();

        // Waits out any write already in flight.
        let _write = self.inner.write_lock.lock().await;
        *self.inner.state.lock() = PresenceState::Offline;
        if self.inner.write(PresenceState::Offline).await {
            info!("presence marked offline on session end");
        }
    }

    /// Stop making writes and cancel the idle timer without writing
    /// `offline`
    ///
    /// The remote disconnect action remains the only offline signal.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.cancel_idle_timer();
    }
}

impl PresenceInner {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Register the deadman switch, then write `online`
    async fn attach(self: &Arc<Self>) {
        if self.is_closed() {
            return;
        }

        let registration = tokio::time::timeout(
            self.config.write_timeout(),
            self.path.register_disconnect_action(&self.session_id, PresenceWrite::offline()),
        )
        .await;

        match registration {
            Ok(Ok(())) => {
                debug!(session = %self.session_id, "disconnect action registered");
                self.transition(PresenceState::Offline, PresenceState::Online).await;
                if *self.state.lock() == PresenceState::Online {
                    Self::arm_idle_timer(self);
                }
            }
            Ok(Err(err)) => {
                self.metrics.record_registration_failure();
                warn!(
                    session = %self.session_id,
                    error = %err,
                    "disconnect action registration failed; presence stays offline for this attach"
                );
            }
            Err(_) => {
                self.metrics.record_registration_failure();
                warn!(
                    session = %self.session_id,
                    timeout_secs = self.config.write_timeout_secs,
                    "disconnect action registration timed out; presence stays offline for this attach"
                );
            }
        }
    }

    /// Move from `from` to `to`, writing only if the recorded state changes
    async fn transition(&self, from: PresenceState, to: PresenceState) {
        let _write = self.write_lock.lock().await;
        {
            let mut state = self.state.lock();
            if *state == to {
                self.metrics.record_suppressed();
                debug!(session = %self.session_id, state = %to, "presence write suppressed");
                return;
            }
            if *state != from || self.is_closed() {
                return;
            }
            *state = to;
        }

        if !self.write(to).await {
            // Let the next natural trigger attempt the transition again.
            let mut state = self.state.lock();
            if *state == to {
                *state = from;
            }
        }
    }

    async fn write(&self, target: PresenceState) -> bool {
        self.metrics.record_write();
        let result = tokio::time::timeout(
            self.config.write_timeout(),
            self.path.write(&self.session_id, PresenceWrite::new(target)),
        )
        .await;

        match result {
            Ok(Ok(())) => {
                debug!(session = %self.session_id, state = %target, "presence written");
                true
            }
            Ok(Err(err)) => {
                self.metrics.record_write_failure();
                error!(session = %self.session_id, state = %target, error = %err, "presence write failed");
                false
            }
            Err(_) => {
                self.metrics.record_write_failure();
                error!(
                    session = %self.session_id,
                    state = %target,
                    timeout_secs = self.config.write_timeout_secs,
                    "presence write timed out"
                );
                false
            }
        }
    }

    /// Replace the idle timer with a fresh one
    ///
    /// A no-op once closed. `closed` is read under the timer lock, which
    /// `shutdown` takes after setting it.
    fn arm_idle_timer(inner: &Arc<Self>) {
        let mut slot = inner.idle_timer.lock();
        if inner.is_closed() {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(inner);
        let timer = schedule(inner.config.idle_threshold(), async move {
            if let Some(inner) = weak.upgrade() {
                inner.on_idle_timeout().await;
            }
        });

        if let Some(previous) = slot.replace(timer) {
            previous.cancel();
        }
    }

    fn cancel_idle_timer(&self) {
        if let Some(timer) = self.idle_timer.lock().take() {
            timer.cancel();
        }
    }

    async fn on_idle_timeout(&self) {
        if self.is_closed() {
            return;
        }
        debug!(
            session = %self.session_id,
            threshold_secs = self.config.idle_threshold_secs,
            "no interaction within idle threshold"
        );
        self.transition(PresenceState::Online, PresenceState::Idle).await;
    }
}

impl std::fmt::Debug for PresenceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceCoordinator")
            .field("session_id", &self.inner.session_id)
            .field("state", &self.state())
            .field("closed", &self.inner.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use livesync_common::testing::settle;
    use livesync_domain::{LiveSyncError, Result};
    use tokio::sync::watch;

    use super::*;

    #[derive(Default)]
    struct LogPath {
        log: Mutex<Vec<(&'static str, PresenceState)>>,
        fail_registration: AtomicBool,
        fail_writes: AtomicBool,
        connectivity: Mutex<Option<watch::Receiver<bool>>>,
    }

    #[async_trait]
    impl PresencePath for LogPath {
        async fn write(&self, _: &SessionId, update: PresenceWrite) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(LiveSyncError::Network("unreachable".into()));
            }
            self.log.lock().push(("write", update.state));
            Ok(())
        }

        async fn register_disconnect_action(&self, _: &SessionId, update: PresenceWrite) -> Result<()> {
            if self.fail_registration.load(Ordering::SeqCst) {
                return Err(LiveSyncError::Presence("rejected".into()));
            }
            self.log.lock().push(("register", update.state));
            Ok(())
        }

        fn connectivity(&self) -> watch::Receiver<bool> {
            self.connectivity.lock().clone().unwrap_or_else(|| watch::channel(false).1)
        }
    }

    fn coordinator(path: &Arc<LogPath>) -> PresenceCoordinator {
        let session = SessionId::new("user-1").unwrap();
        PresenceCoordinator::new(session, Arc::clone(path) as Arc<dyn PresencePath>, &PresenceConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn attach_registers_before_online_write() {
        let path = Arc::new(LogPath::default());
        let presence = coordinator(&path);

        presence.handle_connectivity(true).await;

        assert_eq!(
            *path.log.lock(),
            vec![("register", PresenceState::Offline), ("write", PresenceState::Online)]
        );
        assert_eq!(presence.state(), PresenceState::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_registration_skips_online_write() {
        let path = Arc::new(LogPath::default());
        path.fail_registration.store(true, Ordering::SeqCst);
        let presence = coordinator(&path);

        presence.handle_connectivity(true).await;

        assert!(path.log.lock().is_empty());
        assert_eq!(presence.state(), PresenceState::Offline);
        assert_eq!(presence.metrics().registration_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_connected_value_is_not_an_edge() {
        let path = Arc::new(LogPath::default());
        let presence = coordinator(&path);

        presence.handle_connectivity(true).await;
        presence.handle_connectivity(true).await;

        assert_eq!(path.log.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_reverts_recorded_state() {
        let path = Arc::new(LogPath::default());
        let presence = coordinator(&path);
        presence.handle_connectivity(true).await;

        path.fail_writes.store(true, Ordering::SeqCst);
        presence.inner.on_idle_timeout().await;
        assert_eq!(presence.state(), PresenceState::Online);
        assert_eq!(presence.metrics().write_failures, 1);

        path.fail_writes.store(false, Ordering::SeqCst);
        presence.inner.on_idle_timeout().await;
        assert_eq!(presence.state(), PresenceState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn non_qualifying_event_does_not_rearm_idle_timer() {
        let path = Arc::new(LogPath::default());
        let presence = coordinator(&path);
        assert!(!presence.is_idle_timer_active());

        presence.handle_interaction(InteractionEvent::WindowBlur).await;
        assert!(!presence.is_idle_timer_active());

        presence.handle_interaction(InteractionEvent::KeyDown).await;
        assert!(presence.is_idle_timer_active());
    }

    #[tokio::test(start_paused = true)]
    async fn end_session_writes_offline_and_cancels_timer() {
        let path = Arc::new(LogPath::default());
        let presence = coordinator(&path);
        let _sub = presence.start();
        settle().await;
        assert!(presence.is_idle_timer_active());

        presence.end_session().await;
        assert!(!presence.is_idle_timer_active());
        assert_eq!(path.log.lock().last(), Some(&("write", PresenceState::Offline)));

        // Late attach after shutdown never writes online.
        presence.handle_connectivity(true).await;
        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert!(!path.log.lock().contains(&("write", PresenceState::Online)));
    }

    /// Holds every `online` write until a permit is released
    struct GatedPath {
        log: Mutex<Vec<PresenceState>>,
        gate: tokio::sync::Semaphore,
    }

    #[async_trait]
    impl PresencePath for GatedPath {
        async fn write(&self, _: &SessionId, update: PresenceWrite) -> Result<()> {
            if update.state == PresenceState::Online {
                let permit = self.gate.acquire().await.map_err(|err| LiveSyncError::Internal(err.to_string()))?;
                permit.forget();
            }
            self.log.lock().push(update.state);
            Ok(())
        }

        async fn register_disconnect_action(&self, _: &SessionId, _: PresenceWrite) -> Result<()> {
            Ok(())
        }

        fn connectivity(&self) -> watch::Receiver<bool> {
            watch::channel(false).1
        }
    }

    #[tokio::test(start_paused = true)]
    async fn offline_lands_after_write_in_flight_at_session_end() {
        let path = Arc::new(GatedPath { log: Mutex::new(Vec::new()), gate: tokio::sync::Semaphore::new(0) });
        let session = SessionId::new("user-1").unwrap();
        let presence =
            PresenceCoordinator::new(session, Arc::clone(&path) as Arc<dyn PresencePath>, &PresenceConfig::default());

        let attaching = presence.clone();
        let attach = tokio::spawn(async move { attaching.handle_connectivity(true).await });
        settle().await;

        let ending = presence.clone();
        let end = tokio::spawn(async move { ending.end_session().await });
        settle().await;
        assert!(path.log.lock().is_empty());

        path.gate.add_permits(1);
        attach.await.unwrap();
        end.await.unwrap();

        assert_eq!(*path.log.lock(), vec![PresenceState::Online, PresenceState::Offline]);
        assert_eq!(presence.state(), PresenceState::Offline);
        assert!(!presence.is_idle_timer_active());
    }
}
