//! Trailing-edge debounce
//!
//! Each [`Debounce::call`] cancels the pending run and schedules a new one, so
//! the action runs once, `delay` after the last call of a burst.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use super::timer::{schedule, TimerHandle};

type DebouncedAction = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Collapses bursts of calls into a single delayed action
///
/// Must be called from within a tokio runtime. Dropping the debounce cancels
/// any pending run.
pub struct Debounce {
    delay: Duration,
    action: DebouncedAction,
    pending: Mutex<Option<TimerHandle>>,
}

impl Debounce {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: DebouncedAction = Arc::new(move || Box::pin(action()));
        Self { delay, action, pending: Mutex::new(None) }
    }

    /// Restart the delay, replacing any pending run
    pub fn call(&self) {
        let action = Arc::clone(&self.action);
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        *pending = Some(schedule(self.delay, async move { action().await }));
    }

    /// Drop the pending run, if any
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(TimerHandle::is_active)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Debounce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}
