//! Application context - dependency injection container

use std::sync::Arc;

use livesync_core::{
    BridgeDependencies, CoordinatorError, HostEnvironment, LifecycleBridge, PreferenceSource, PresencePath,
    QueueFlusher, SyncNotifier,
};
use livesync_domain::{AuthEvent, Config, FlushOutcome, PresenceState, Result, SessionId, SyncSummary};
use livesync_infra::{
    BusNotifier, FilePreferenceStore, InMemoryActionSink, InMemoryHost, InMemoryOfflineQueue,
    InMemoryPresenceStore, MemoryPreferences, RemoteActionSink,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Type alias for preference source port trait object
type DynPreferenceSource = dyn PreferenceSource;

/// Type alias for remote action sink port trait object
type DynRemoteActionSink = dyn RemoteActionSink;

const AUTH_CHANNEL_CAPACITY: usize = 16;

/// Point-in-time view of the running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStatus {
    pub session: Option<SessionId>,
    pub presence: Option<PresenceState>,
    pub active_timers: usize,
    pub flush_in_flight: bool,
    pub host_online: bool,
}

/// Application context - holds all adapters and the lifecycle bridge
pub struct AppContext {
    pub config: Config,
    pub presence_store: Arc<InMemoryPresenceStore>,
    pub host: Arc<InMemoryHost>,
    pub sink: Arc<InMemoryActionSink>,
    pub queue: Arc<InMemoryOfflineQueue>,
    pub preferences: Arc<DynPreferenceSource>,
    pub notifier: Arc<BusNotifier>,
    pub bridge: Arc<LifecycleBridge>,
    cancel: CancellationToken,
}

impl AppContext {
    /// Create a new application context with default configuration
    pub fn new() -> Result<Self> {
        Self::new_with_config(Config::default())
    }

    /// Create a new application context with custom configuration
    ///
    /// # Errors
    /// Returns `LiveSyncError::Config` when the configuration is invalid.
    pub fn new_with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let presence_store = Arc::new(InMemoryPresenceStore::new());
        let host = Arc::new(InMemoryHost::new(true));
        let sink = Arc::new(InMemoryActionSink::new());

        let mutation_host = Arc::clone(&host);
        let queue = Arc::new(
            InMemoryOfflineQueue::new(Arc::clone(&sink) as Arc<DynRemoteActionSink>)
                .with_mutation_hook(move || mutation_host.notify_queue_mutated()),
        );

        let preferences: Arc<DynPreferenceSource> = match &config.preferences.path {
            Some(path) => {
                info!(path = %path.display(), "reading preferences from file");
                Arc::new(FilePreferenceStore::new(path.clone()))
            }
            None => Arc::new(MemoryPreferences::default()),
        };
        let notifier = Arc::new(BusNotifier::new());

        let deps = BridgeDependencies {
            presence_path: Arc::clone(&presence_store) as Arc<dyn PresencePath>,
            flusher: Arc::clone(&queue) as Arc<dyn QueueFlusher>,
            host: Arc::clone(&host) as Arc<dyn HostEnvironment>,
            preferences: Arc::clone(&preferences),
            notifier: Arc::clone(&notifier) as Arc<dyn SyncNotifier>,
        };
        let bridge = Arc::new(LifecycleBridge::new(deps, config.clone()));

        info!("application context initialised");
        Ok(Self {
            config,
            presence_store,
            host,
            sink,
            queue,
            preferences,
            notifier,
            bridge,
            cancel: CancellationToken::new(),
        })
    }

    /// Start coordinating for `session_id`
    ///
    /// Returns `false` when that session is already active.
    pub async fn start_session(&self, session_id: &str) -> Result<bool> {
        let session = SessionId::new(session_id)?;
        Ok(self.bridge.start_session(session).await)
    }

    pub async fn end_session(&self) -> bool {
        self.bridge.end_session().await
    }

    /// Bring the transport up or down for both the presence store and the host
    ///
    /// The presence store flips first so its disconnect actions run before
    /// the host reports the offline edge.
    pub fn set_transport(&self, online: bool) {
        info!(online, "transport state changed");
        self.presence_store.set_connected(online);
        self.host.set_online(online);
    }

    /// Follow authentication events on a spawned task until shutdown
    pub fn drive_auth_events(&self) -> (mpsc::Sender<AuthEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(AUTH_CHANNEL_CAPACITY);
        let bridge = Arc::clone(&self.bridge);
        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(async move { bridge.run(rx, cancel).await });
        (tx, handle)
    }

    /// Buffer an action for the active session
    ///
    /// # Errors
    /// Fails when no session is active or the queue is full.
    pub async fn enqueue(&self, dedup_key: &str, payload: serde_json::Value) -> Result<Uuid> {
        let session = self.bridge.current_session().await.ok_or(CoordinatorError::NoSession)?;
        self.queue.enqueue(&session, dedup_key, payload)
    }

    /// Flush the active session's queue now
    pub async fn sync_now(&self) -> std::result::Result<FlushOutcome, CoordinatorError> {
        self.bridge.sync_now().await
    }

    pub fn subscribe_sync_summaries(&self) -> broadcast::Receiver<SyncSummary> {
        self.notifier.subscribe()
    }

    pub async fn status(&self) -> ContextStatus {
        let sync = self.bridge.sync().await;
        ContextStatus {
            session: self.bridge.current_session().await,
            presence: self.bridge.presence_state().await,
            active_timers: self.bridge.active_timer_count().await,
            flush_in_flight: sync.is_some_and(|sync| sync.is_flush_in_flight()),
            host_online: self.host.is_online(),
        }
    }

    /// Stop auth-event driving and end the active session
    ///
    /// Idempotent; a second call finds no session to end.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");
        self.cancel.cancel();

        if self.bridge.end_session().await {
            info!("active session ended during shutdown");
        }
        let pending = self.queue.total_pending();
        if pending > 0 {
            warn!(pending, "offline queue still holds actions at shutdown");
        }
        Ok(())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("host", &self.host)
            .field("presence_store", &self.presence_store)
            .finish_non_exhaustive()
    }
}
