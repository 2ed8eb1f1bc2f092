//! Sync coordinator
//!
//! Turns four independent trigger sources into flush calls with at most one
//! flush in flight:
//!
//! 1. transport-online edges
//! 2. queue mutations, debounced
//! 3. a periodic tick while the transport is online
//! 4. external wake-ups from the background-execution facility
//!
//! A trigger that finds a flush in flight is dropped, not queued. Dispatched
//! flushes run on their own task and are never cancelled; shutting the
//! coordinator down only prevents new ones.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use livesync_common::time::{recurring, Debounce, TimerHandle};
use livesync_domain::{FlushOutcome, LiveSyncError, SessionId, SyncConfig, SyncSummary, SyncTrigger};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::metrics::{SyncMetrics, SyncMetricsSnapshot};
use super::ports::{PreferenceSource, QueueFlusher, SyncNotifier};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::lifecycle::ports::HostEnvironment;

/// Collaborators used by [`SyncCoordinator`]
#[derive(Clone)]
pub struct SyncPorts {
    pub flusher: Arc<dyn QueueFlusher>,
    pub host: Arc<dyn HostEnvironment>,
    pub preferences: Arc<dyn PreferenceSource>,
    pub notifier: Arc<dyn SyncNotifier>,
}

/// Flush trigger coordinator for a single session
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    session_id: SessionId,
    ports: SyncPorts,
    config: SyncConfig,
    transport_online: AtomicBool,
    in_flight: AtomicBool,
    closed: AtomicBool,
    debounce: Debounce,
    periodic: Mutex<Option<TimerHandle>>,
    metrics: SyncMetrics,
}

impl SyncCoordinator {
    pub fn new(session_id: SessionId, ports: SyncPorts, config: &SyncConfig) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<SyncInner>| {
            let weak = weak.clone();
            let debounce = Debounce::new(config.debounce(), move || {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch(SyncTrigger::QueueMutated);
                    }
                }
            });

            SyncInner {
                session_id,
                ports,
                config: config.clone(),
                transport_online: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                debounce,
                periodic: Mutex::new(None),
                metrics: SyncMetrics::new(),
            }
        });
        Self { inner }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    /// Record the initial transport state and start the periodic timer if
    /// online
    #[instrument(skip(self), fields(session = %self.inner.session_id))]
    pub fn start(&self, transport_online: bool) {
        self.inner.transport_online.store(transport_online, Ordering::SeqCst);
        if transport_online {
            self.inner.ensure_periodic();
        }
        debug!(transport_online, "sync coordinator started");
    }

    /// Transport-online edge: flush and resume the periodic timer
    pub fn on_transport_online(&self) {
        self.inner.transport_online.store(true, Ordering::SeqCst);
        self.inner.ensure_periodic();
        self.inner.dispatch(SyncTrigger::OnlineEdge);
    }

    /// Transport-offline edge: stop polling until the next online edge
    pub fn on_transport_offline(&self) {
        self.inner.transport_online.store(false, Ordering::SeqCst);
        self.inner.stop_periodic();
        info!(session = %self.inner.session_id, "transport offline; periodic sync stopped");
    }

    /// Queue append: schedule a debounced flush if online
    pub fn on_queue_mutated(&self) {
        if !self.is_online() {
            self.inner.metrics.record_ignored_offline();
            debug!(session = %self.inner.session_id, "queue mutated while offline; flush deferred");
            return;
        }
        self.inner.debounce.call();
    }

    /// External wake-up: handled like an online edge when the host reports
    /// connectivity
    pub fn on_external_wake(&self) {
        if !self.inner.ports.host.is_online() {
            self.inner.metrics.record_ignored_offline();
            debug!(session = %self.inner.session_id, "external wake while offline ignored");
            return;
        }
        self.inner.transport_online.store(true, Ordering::SeqCst);
        self.inner.ensure_periodic();
        self.inner.dispatch(SyncTrigger::ExternalWake);
    }

    /// Request a flush for `trigger`, returning whether one was dispatched
    pub fn trigger(&self, trigger: SyncTrigger) -> bool {
        self.inner.dispatch(trigger)
    }

    /// Flush now and wait for the outcome
    ///
    /// Fails fast with [`CoordinatorError::Offline`] or
    /// [`CoordinatorError::FlushInProgress`]. On timeout the flush keeps
    /// running in the background.
    #[instrument(skip(self), fields(session = %self.inner.session_id))]
    pub async fn sync_now(&self) -> CoordinatorResult<FlushOutcome> {
        self.inner.metrics.record_trigger();
        let handle = self.inner.try_dispatch(SyncTrigger::Manual)?;
        let timeout = self.inner.config.manual_timeout();

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(LiveSyncError::Internal(format!("flush task failed: {join_err}")).into()),
            Err(_) => Err(CoordinatorError::timeout("manual sync", timeout)),
        }
    }

    /// Stop accepting triggers and cancel the debounce and periodic timers
    ///
    /// A flush already in flight is left to complete.
    #[instrument(skip(self), fields(session = %self.inner.session_id))]
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.debounce.cancel();
        self.inner.stop_periodic();
        debug!(in_flight = self.is_flush_in_flight(), "sync coordinator shut down");
    }

    pub fn is_online(&self) -> bool {
        self.inner.transport_online.load(Ordering::SeqCst)
    }

    pub fn is_flush_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_periodic_active(&self) -> bool {
        self.inner.periodic.lock().as_ref().is_some_and(TimerHandle::is_active)
    }

    pub fn is_debounce_pending(&self) -> bool {
        self.inner.debounce.is_pending()
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}

impl SyncInner {
    fn dispatch(self: &Arc<Self>, trigger: SyncTrigger) -> bool {
        self.metrics.record_trigger();
        match self.try_dispatch(trigger) {
            Ok(_task) => true,
            Err(CoordinatorError::FlushInProgress) => {
                self.metrics.record_dropped();
                debug!(session = %self.session_id, trigger = %trigger, "flush already in flight; trigger dropped");
                false
            }
            Err(CoordinatorError::Offline) => {
                self.metrics.record_ignored_offline();
                debug!(session = %self.session_id, trigger = %trigger, "transport offline; trigger ignored");
                false
            }
            Err(err) => {
                debug!(session = %self.session_id, trigger = %trigger, error = %err, "trigger ignored");
                false
            }
        }
    }

    /// Claim the in-flight guard and spawn the flush
    fn try_dispatch(self: &Arc<Self>, trigger: SyncTrigger) -> CoordinatorResult<JoinHandle<CoordinatorResult<FlushOutcome>>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Closed(self.session_id.to_string()));
        }
        if !self.transport_online.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Offline);
        }
        if self.in_flight.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return Err(CoordinatorError::FlushInProgress);
        }

        let inner = Arc::clone(self);
        Ok(tokio::spawn(async move { inner.run_flush(trigger).await }))
    }

    async fn run_flush(&self, trigger: SyncTrigger) -> CoordinatorResult<FlushOutcome> {
        let guard = InFlightGuard(&self.in_flight);
        self.metrics.record_flush_call();
        debug!(session = %self.session_id, trigger = %trigger, "flush started");

        let result = self.ports.flusher.flush(&self.session_id).await;
        drop(guard);

        let result = match result {
            Ok(outcome) => {
                self.metrics.record_outcome(outcome);
                if outcome.failed > 0 {
                    warn!(
                        session = %self.session_id,
                        trigger = %trigger,
                        synced = outcome.synced,
                        failed = outcome.failed,
                        "flush left entries pending"
                    );
                } else if outcome.synced > 0 {
                    info!(session = %self.session_id, trigger = %trigger, synced = outcome.synced, "flush completed");
                }
                if outcome.synced > 0 {
                    self.notify(outcome);
                }
                Ok(outcome)
            }
            Err(err) => {
                self.metrics.record_flush_failure();
                error!(session = %self.session_id, trigger = %trigger, error = %err, "flush failed");
                Err(err.into())
            }
        };

        if matches!(trigger, SyncTrigger::OnlineEdge | SyncTrigger::ExternalWake) {
            self.rearm_background_wakeup().await;
        }
        result
    }

    fn notify(&self, outcome: FlushOutcome) {
        if self.ports.preferences.show_sync_notifications() {
            self.ports.notifier.notify(SyncSummary::from(outcome));
            self.metrics.record_notification();
        } else {
            debug!(session = %self.session_id, "sync notifications disabled");
        }
    }

    async fn rearm_background_wakeup(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let interval = self.config.background_wakeup_interval();
        if let Err(err) = self.ports.host.register_background_wakeup(&self.session_id, interval).await {
            self.metrics.record_wakeup_failure();
            warn!(session = %self.session_id, error = %err, "background wake-up re-registration failed");
        }
    }

    fn ensure_periodic(self: &Arc<Self>) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let mut periodic = self.periodic.lock();
        if periodic.as_ref().is_some_and(TimerHandle::is_active) {
            return;
        }

        let weak = Arc::downgrade(self);
        *periodic = Some(recurring(self.config.periodic_interval(), move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(SyncTrigger::Periodic);
                }
            }
        }));
        debug!(
            session = %self.session_id,
            interval_secs = self.config.periodic_interval_secs,
            "periodic sync scheduled"
        );
    }

    fn stop_periodic(&self) {
        if let Some(timer) = self.periodic.lock().take() {
            timer.cancel();
        }
    }
}

/// Releases the in-flight flag when the flush ends, including by panic
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("session_id", &self.inner.session_id)
            .field("online", &self.is_online())
            .field("in_flight", &self.is_flush_in_flight())
            .finish_non_exhaustive()
    }
}
