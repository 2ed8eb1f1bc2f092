//! Lifecycle bridge
//!
//! Binds the presence and sync coordinators to session identity. A session
//! start builds a fresh [`CoordinatorRuntimeState`]; a session end tears it
//! down and writes `offline`. At most one session is active per bridge.

use std::sync::Arc;

use livesync_common::bus::Subscription;
use livesync_domain::{AuthEvent, Config, FlushOutcome, HostSignal, PresenceState, SessionId};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::ports::HostEnvironment;
use super::state::CoordinatorRuntimeState;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::presence::ports::PresencePath;
use crate::presence::PresenceCoordinator;
use crate::sync::coordinator::SyncPorts;
use crate::sync::ports::{PreferenceSource, QueueFlusher, SyncNotifier};
use crate::sync::SyncCoordinator;

/// External collaborators shared by every session
#[derive(Clone)]
pub struct BridgeDependencies {
    pub presence_path: Arc<dyn PresencePath>,
    pub flusher: Arc<dyn QueueFlusher>,
    pub host: Arc<dyn HostEnvironment>,
    pub preferences: Arc<dyn PreferenceSource>,
    pub notifier: Arc<dyn SyncNotifier>,
}

impl BridgeDependencies {
    fn sync_ports(&self) -> SyncPorts {
        SyncPorts {
            flusher: Arc::clone(&self.flusher),
            host: Arc::clone(&self.host),
            preferences: Arc::clone(&self.preferences),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

/// Session-scoped owner of both coordinators
pub struct LifecycleBridge {
    deps: BridgeDependencies,
    config: Config,
    state: Mutex<Option<CoordinatorRuntimeState>>,
}

impl LifecycleBridge {
    pub fn new(deps: BridgeDependencies, config: Config) -> Self {
        Self { deps, config, state: Mutex::new(None) }
    }

    /// Start coordinating for `session_id`
    ///
    /// Returns `false` when that session is already running. Starting a
    /// different session ends the current one first.
    #[instrument(skip(self), fields(session = %session_id))]
    pub async fn start_session(&self, session_id: SessionId) -> bool {
        let mut guard = self.state.lock().await;

        if let Some(current) = guard.as_ref() {
            if current.session_id() == &session_id {
                debug!("session already initialized; start ignored");
                return false;
            }
            info!(previous = %current.session_id(), "switching session");
        }
        if let Some(previous) = guard.take() {
            previous.teardown().await;
        }

        *guard = Some(self.build_session(session_id).await);
        info!("session started");
        true
    }

    /// End the active session, writing `offline` for it
    ///
    /// Returns `false` when no session was active.
    #[instrument(skip(self))]
    pub async fn end_session(&self) -> bool {
        let Some(state) = self.state.lock().await.take() else {
            debug!("no active session to end");
            return false;
        };

        let session = state.session_id().clone();
        state.teardown().await;
        info!(session = %session, "session ended");
        true
    }

    /// Drive sessions from authentication events until cancelled or the
    /// event source closes, then end any active session
    pub async fn run(&self, mut auth_events: mpsc::Receiver<AuthEvent>, cancel: CancellationToken) {
        info!("lifecycle bridge running");

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("lifecycle bridge cancelled");
                    break;
                }
                event = auth_events.recv() => event,
            };

            match event {
                Some(AuthEvent::SignedIn(session_id)) => {
                    self.start_session(session_id).await;
                }
                Some(AuthEvent::SignedOut) => {
                    self.end_session().await;
                }
                None => {
                    debug!("auth event source closed");
                    break;
                }
            }
        }

        self.end_session().await;
    }

    pub async fn current_session(&self) -> Option<SessionId> {
        self.state.lock().await.as_ref().map(|state| state.session_id().clone())
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Armed timers of the active session; zero when none is active
    pub async fn active_timer_count(&self) -> usize {
        self.state.lock().await.as_ref().map_or(0, CoordinatorRuntimeState::active_timer_count)
    }

    pub async fn presence_state(&self) -> Option<PresenceState> {
        self.presence().await.map(|presence| presence.state())
    }

    pub async fn presence(&self) -> Option<PresenceCoordinator> {
        self.state.lock().await.as_ref().map(|state| state.presence().clone())
    }

    pub async fn sync(&self) -> Option<SyncCoordinator> {
        self.state.lock().await.as_ref().map(|state| state.sync().clone())
    }

    /// Manual flush for the active session
    pub async fn sync_now(&self) -> CoordinatorResult<FlushOutcome> {
        let sync = self.sync().await.ok_or(CoordinatorError::NoSession)?;
        sync.sync_now().await
    }

    async fn build_session(&self, session_id: SessionId) -> CoordinatorRuntimeState {
        let host = &self.deps.host;
        let presence =
            PresenceCoordinator::new(session_id.clone(), Arc::clone(&self.deps.presence_path), &self.config.presence);
        let sync = SyncCoordinator::new(session_id.clone(), self.deps.sync_ports(), &self.config.sync);
        let mut state = CoordinatorRuntimeState::new(session_id.clone(), presence.clone(), sync.clone());

        // Subscribe before sampling the transport state so no edge falls in between.
        let signals = host.signals();
        let interactions = host.interactions();

        let wakeup_interval = self.config.sync.background_wakeup_interval();
        if let Err(err) = host.register_background_wakeup(&session_id, wakeup_interval).await {
            warn!(
                session = %session_id,
                error = %err,
                "background wake-up registration failed; relying on in-process periodic sync"
            );
        }

        state.subscribe(presence.start());
        sync.start(host.is_online());

        let signal_sync = sync.clone();
        state.subscribe(Subscription::listen("host-signals", signals, move |signal| {
            let sync = signal_sync.clone();
            async move {
                match signal {
                    HostSignal::TransportOnline => sync.on_transport_online(),
                    HostSignal::TransportOffline => sync.on_transport_offline(),
                    HostSignal::QueueMutated => sync.on_queue_mutated(),
                    HostSignal::ExternalWake => sync.on_external_wake(),
                }
            }
        }));

        state.subscribe(Subscription::listen("interactions", interactions, move |event| {
            let presence = presence.clone();
            async move { presence.handle_interaction(event).await }
        }));

        state
    }
}

impl Drop for LifecycleBridge {
    fn drop(&mut self) {
        if let Some(state) = self.state.get_mut().take() {
            warn!(
                session = %state.session_id(),
                "LifecycleBridge dropped with an active session; leaving offline to the disconnect action"
            );
            state.abandon();
        }
    }
}
