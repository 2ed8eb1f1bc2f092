//! One-shot and recurring timers
//!
//! Timers run as spawned tokio tasks and are controlled through a
//! [`TimerHandle`]. Cancelling a handle ends the task immediately; a callback
//! that has already started is allowed to finish.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A timer handle that can be used to cancel a timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl TimerHandle {
    fn new() -> Self {
        Self { token: CancellationToken::new(), fired: Arc::new(AtomicBool::new(false)) }
    }

    /// Cancel the timer
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the timer is still waiting to fire
    ///
    /// A one-shot timer stops being active once its callback starts; a
    /// recurring timer stays active until cancelled.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && !self.fired.load(Ordering::SeqCst)
    }
}

/// Run `task` once after `duration` unless the returned handle is cancelled
///
/// The deadline is fixed when this is called, not when the task first runs.
///
/// ```no_run
/// use std::time::Duration;
///
/// use livesync_common::time::timer::schedule;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = schedule(Duration::from_secs(5), async {
///         println!("Timeout!");
///     });
///     handle.cancel();
/// }
/// ```
pub fn schedule<F>(duration: Duration, task: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = TimerHandle::new();
    let token = handle.token.clone();
    let fired = Arc::clone(&handle.fired);
    let deadline = Instant::now() + duration;

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = sleep_until(deadline) => {
                fired.store(true, Ordering::SeqCst);
                task.await;
            }
        }
    });

    handle
}

/// Create a recurring timer
///
/// The first invocation happens one full `period` after creation. Each
/// invocation is awaited before the next tick is considered, so slow
/// callbacks never overlap.
pub fn recurring<F, Fut>(period: Duration, mut callback: F) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = TimerHandle::new();
    let token = handle.token.clone();
    let first = Instant::now() + period;

    tokio::spawn(async move {
        let mut interval = interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => callback().await,
            }
        }
    });

    handle
}
