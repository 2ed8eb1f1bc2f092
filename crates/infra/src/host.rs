//! In-memory host environment
//!
//! Stands in for the process host: transport edges, queue mutations, user
//! interactions and background wake-up registration are all driven by the
//! embedding code.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use livesync_common::bus::EventBus;
use livesync_core::HostEnvironment;
use livesync_domain::constants::EVENT_BUS_CAPACITY;
use livesync_domain::{HostSignal, InteractionEvent, LiveSyncError, Result, SessionId};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// One accepted background wake-up registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeupRegistration {
    pub session: SessionId,
    pub interval: Duration,
}

#[derive(Debug)]
pub struct InMemoryHost {
    online: AtomicBool,
    background_supported: AtomicBool,
    signals: EventBus<HostSignal>,
    interactions: EventBus<InteractionEvent>,
    wakeups: Mutex<Vec<WakeupRegistration>>,
}

impl InMemoryHost {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            background_supported: AtomicBool::new(true),
            signals: EventBus::new(EVENT_BUS_CAPACITY),
            interactions: EventBus::new(EVENT_BUS_CAPACITY),
            wakeups: Mutex::new(Vec::new()),
        }
    }

    /// Change the transport state, publishing one signal per actual edge
    pub fn set_online(&self, online: bool) {
        if self.online.swap(online, Ordering::SeqCst) == online {
            return;
        }
        info!(online, "host transport changed");
        let signal = if online { HostSignal::TransportOnline } else { HostSignal::TransportOffline };
        self.signals.publish(signal);
    }

    /// Announce that the offline queue changed
    pub fn notify_queue_mutated(&self) {
        self.signals.publish(HostSignal::QueueMutated);
    }

    /// Deliver a background wake-up to the running process
    pub fn wake(&self) {
        self.signals.publish(HostSignal::ExternalWake);
    }

    pub fn interact(&self, event: InteractionEvent) {
        self.interactions.publish(event);
    }

    pub fn set_background_supported(&self, supported: bool) {
        self.background_supported.store(supported, Ordering::SeqCst);
    }

    pub fn wakeup_registrations(&self) -> Vec<WakeupRegistration> {
        self.wakeups.lock().clone()
    }

    /// Listeners currently attached to either channel
    pub fn listener_count(&self) -> usize {
        self.signals.receiver_count() + self.interactions.receiver_count()
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl HostEnvironment for InMemoryHost {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn signals(&self) -> broadcast::Receiver<HostSignal> {
        self.signals.subscribe()
    }

    fn interactions(&self) -> broadcast::Receiver<InteractionEvent> {
        self.interactions.subscribe()
    }

    async fn register_background_wakeup(&self, session: &SessionId, interval: Duration) -> Result<()> {
        if !self.background_supported.load(Ordering::SeqCst) {
            return Err(LiveSyncError::Host("background execution is not available".into()));
        }
        debug!(session = %session, interval_secs = interval.as_secs(), "background wake-up registered");
        self.wakeups.lock().push(WakeupRegistration { session: session.clone(), interval });
        Ok(())
    }
}
