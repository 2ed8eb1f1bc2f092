//! Async testing utilities
//!
//! Helpers for driving spawned coordinator tasks from tests that run on a
//! paused tokio clock.

#![allow(clippy::missing_errors_doc)]

use std::future::Future;
use std::time::Duration;

/// Number of cooperative yields performed by [`settle`].
const SETTLE_YIELDS: usize = 64;

/// Assert that a condition eventually becomes true within a timeout
///
/// The predicate is polled every 10ms of (possibly virtual) time.
///
/// ```no_run
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[tokio::test(start_paused = true)]
/// async fn test_eventually() {
///     let flag = Arc::new(AtomicBool::new(false));
///     let flag_clone = flag.clone();
///
///     tokio::spawn(async move {
///         tokio::time::sleep(Duration::from_millis(100)).await;
///         flag_clone.store(true, Ordering::SeqCst);
///     });
///
///     livesync_common::assert_eventually_async!(Duration::from_secs(1), async {
///         flag.load(Ordering::SeqCst)
///     });
/// }
/// ```
#[macro_export]
macro_rules! assert_eventually_async {
    ($timeout:expr, $fut:expr) => {{
        let timeout_duration = $timeout;
        let result = tokio::time::timeout(timeout_duration, async {
            loop {
                if $fut.await {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await;

        assert!(result.is_ok(), "Condition did not become true within {:?}", timeout_duration);
    }};
}

/// Wait for a future to complete with a timeout, returning a Result
pub async fn timeout_ok<F, T>(duration: Duration, fut: F) -> Result<T, tokio::time::error::Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut).await
}

/// Let every runnable task make progress without advancing the clock
///
/// Spawned listeners and timer tasks only run when the test task yields.
/// On a paused clock this drains all work that is ready "now" while keeping
/// virtual time fixed, so timing windows stay exact.
pub async fn settle() {
    for _ in 0..SETTLE_YIELDS {
        tokio::task::yield_now().await;
    }
}
