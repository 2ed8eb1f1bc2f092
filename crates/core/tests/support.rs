//! Shared recording fakes for coordinator integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use livesync_core::{
    BridgeDependencies, HostEnvironment, LifecycleBridge, PreferenceSource, PresencePath, QueueFlusher,
    SyncNotifier, SyncPorts,
};
use livesync_domain::{
    Config, FlushOutcome, HostSignal, InteractionEvent, LiveSyncError, PresenceState, PresenceWrite, Result,
    SessionId, SyncSummary,
};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch, Semaphore};
use tokio::time::Instant;

pub fn session(id: &str) -> SessionId {
    SessionId::new(id).expect("valid session id")
}

// ============================================================================
// Presence path
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    Register(PresenceState),
    Write(PresenceState),
}

/// Presence path that records every resolved operation in order
pub struct RecordingPath {
    ops: Mutex<Vec<(String, PathOp)>>,
    connectivity: watch::Sender<bool>,
    fail_registration: AtomicBool,
    fail_writes: AtomicBool,
    hold_registration: AtomicBool,
    registration_gate: Semaphore,
    registrations_started: AtomicU32,
}

impl RecordingPath {
    pub fn new() -> Arc<Self> {
        let (connectivity, _) = watch::channel(false);
        Arc::new(Self {
            ops: Mutex::new(Vec::new()),
            connectivity,
            fail_registration: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            hold_registration: AtomicBool::new(false),
            registration_gate: Semaphore::new(0),
            registrations_started: AtomicU32::new(0),
        })
    }

    pub fn set_connected(&self, connected: bool) {
        self.connectivity.send_replace(connected);
    }

    pub fn fail_registration(&self, fail: bool) {
        self.fail_registration.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Keep registrations pending until [`Self::release_registration`]
    pub fn hold_registrations(&self) {
        self.hold_registration.store(true, Ordering::SeqCst);
    }

    pub fn release_registration(&self) {
        self.registration_gate.add_permits(1);
    }

    pub fn registrations_started(&self) -> u32 {
        self.registrations_started.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<PathOp> {
        self.ops.lock().iter().map(|(_, op)| *op).collect()
    }

    pub fn ops_for(&self, session: &str) -> Vec<PathOp> {
        self.ops.lock().iter().filter(|(id, _)| id == session).map(|(_, op)| *op).collect()
    }

    pub fn writes(&self) -> Vec<PresenceState> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                PathOp::Write(state) => Some(state),
                PathOp::Register(_) => None,
            })
            .collect()
    }

    pub fn write_count(&self, state: PresenceState) -> usize {
        self.writes().into_iter().filter(|written| *written == state).count()
    }
}

#[async_trait]
impl PresencePath for RecordingPath {
    async fn write(&self, session: &SessionId, update: PresenceWrite) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LiveSyncError::Network("presence store unreachable".into()));
        }
        self.ops.lock().push((session.to_string(), PathOp::Write(update.state)));
        Ok(())
    }

    async fn register_disconnect_action(&self, session: &SessionId, update: PresenceWrite) -> Result<()> {
        self.registrations_started.fetch_add(1, Ordering::SeqCst);
        if self.hold_registration.load(Ordering::SeqCst) {
            let permit =
                self.registration_gate.acquire().await.map_err(|err| LiveSyncError::Internal(err.to_string()))?;
            permit.forget();
        }
        if self.fail_registration.load(Ordering::SeqCst) {
            return Err(LiveSyncError::Presence("disconnect registration rejected".into()));
        }
        self.ops.lock().push((session.to_string(), PathOp::Register(update.state)));
        Ok(())
    }

    fn connectivity(&self) -> watch::Receiver<bool> {
        self.connectivity.subscribe()
    }
}

/// Every `online` write must follow a registration made since the previous
/// `online` write
pub fn assert_online_preceded_by_registration(ops: &[PathOp]) {
    let mut registered = false;
    for (index, op) in ops.iter().enumerate() {
        match op {
            PathOp::Register(_) => registered = true,
            PathOp::Write(PresenceState::Online) => {
                assert!(registered, "online write at {index} without a prior registration: {ops:?}");
                registered = false;
            }
            PathOp::Write(_) => {}
        }
    }
}

// ============================================================================
// Queue flusher
// ============================================================================

/// Flusher that counts calls and can hold each flush until released
pub struct RecordingFlusher {
    calls: AtomicU32,
    completed: AtomicU32,
    hold: AtomicBool,
    gate: Semaphore,
    outcome: Mutex<Result<FlushOutcome>>,
    call_times: Mutex<Vec<Instant>>,
}

impl RecordingFlusher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            completed: AtomicU32::new(0),
            hold: AtomicBool::new(false),
            gate: Semaphore::new(0),
            outcome: Mutex::new(Ok(FlushOutcome::default())),
            call_times: Mutex::new(Vec::new()),
        })
    }

    pub fn respond_with(&self, outcome: Result<FlushOutcome>) {
        *self.outcome.lock() = outcome;
    }

    pub fn hold(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().clone()
    }
}

#[async_trait]
impl QueueFlusher for RecordingFlusher {
    async fn flush(&self, _session: &SessionId) -> Result<FlushOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().push(Instant::now());
        if self.hold.load(Ordering::SeqCst) {
            let permit = self.gate.acquire().await.map_err(|err| LiveSyncError::Internal(err.to_string()))?;
            permit.forget();
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().clone()
    }
}

// ============================================================================
// Host environment
// ============================================================================

/// Host whose signals are pushed by the test
pub struct FakeHost {
    online: AtomicBool,
    signals: broadcast::Sender<HostSignal>,
    interactions: broadcast::Sender<InteractionEvent>,
    wakeup_registrations: AtomicU32,
    fail_wakeup: AtomicBool,
}

impl FakeHost {
    pub fn new(online: bool) -> Arc<Self> {
        let (signals, _) = broadcast::channel(256);
        let (interactions, _) = broadcast::channel(256);
        Arc::new(Self {
            online: AtomicBool::new(online),
            signals,
            interactions,
            wakeup_registrations: AtomicU32::new(0),
            fail_wakeup: AtomicBool::new(false),
        })
    }

    pub fn go_online(&self) {
        self.online.store(true, Ordering::SeqCst);
        let _ = self.signals.send(HostSignal::TransportOnline);
    }

    pub fn go_offline(&self) {
        self.online.store(false, Ordering::SeqCst);
        let _ = self.signals.send(HostSignal::TransportOffline);
    }

    pub fn queue_mutated(&self) {
        let _ = self.signals.send(HostSignal::QueueMutated);
    }

    pub fn external_wake(&self) {
        let _ = self.signals.send(HostSignal::ExternalWake);
    }

    pub fn interact(&self, event: InteractionEvent) {
        let _ = self.interactions.send(event);
    }

    pub fn fail_wakeup(&self, fail: bool) {
        self.fail_wakeup.store(fail, Ordering::SeqCst);
    }

    pub fn wakeup_registrations(&self) -> u32 {
        self.wakeup_registrations.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.signals.receiver_count() + self.interactions.receiver_count()
    }
}

#[async_trait]
impl HostEnvironment for FakeHost {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn signals(&self) -> broadcast::Receiver<HostSignal> {
        self.signals.subscribe()
    }

    fn interactions(&self) -> broadcast::Receiver<InteractionEvent> {
        self.interactions.subscribe()
    }

    async fn register_background_wakeup(&self, _session: &SessionId, _interval: Duration) -> Result<()> {
        self.wakeup_registrations.fetch_add(1, Ordering::SeqCst);
        if self.fail_wakeup.load(Ordering::SeqCst) {
            return Err(LiveSyncError::Host("background execution unavailable".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Preferences and notifications
// ============================================================================

#[derive(Default)]
pub struct TogglePreference(AtomicBool);

impl TogglePreference {
    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

impl PreferenceSource for TogglePreference {
    fn show_sync_notifications(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<SyncSummary>>);

impl RecordingNotifier {
    pub fn summaries(&self) -> Vec<SyncSummary> {
        self.0.lock().clone()
    }
}

impl SyncNotifier for RecordingNotifier {
    fn notify(&self, summary: SyncSummary) {
        self.0.lock().push(summary);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub path: Arc<RecordingPath>,
    pub flusher: Arc<RecordingFlusher>,
    pub host: Arc<FakeHost>,
    pub preferences: Arc<TogglePreference>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(host_online: bool) -> Self {
        Self {
            path: RecordingPath::new(),
            flusher: RecordingFlusher::new(),
            host: FakeHost::new(host_online),
            preferences: Arc::new(TogglePreference::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn sync_ports(&self) -> SyncPorts {
        SyncPorts {
            flusher: Arc::clone(&self.flusher) as Arc<dyn QueueFlusher>,
            host: Arc::clone(&self.host) as Arc<dyn HostEnvironment>,
            preferences: Arc::clone(&self.preferences) as Arc<dyn PreferenceSource>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn SyncNotifier>,
        }
    }

    pub fn dependencies(&self) -> BridgeDependencies {
        BridgeDependencies {
            presence_path: Arc::clone(&self.path) as Arc<dyn PresencePath>,
            flusher: Arc::clone(&self.flusher) as Arc<dyn QueueFlusher>,
            host: Arc::clone(&self.host) as Arc<dyn HostEnvironment>,
            preferences: Arc::clone(&self.preferences) as Arc<dyn PreferenceSource>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn SyncNotifier>,
        }
    }

    pub fn bridge(&self) -> LifecycleBridge {
        LifecycleBridge::new(self.dependencies(), Config::default())
    }
}
