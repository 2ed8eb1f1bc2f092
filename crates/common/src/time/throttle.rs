//! Leading-edge throttle
//!
//! The first call passes immediately; further calls are dropped until the
//! interval has elapsed since the last call that passed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{Clock, RuntimeClock};

/// Rate gate that admits at most one call per interval
pub struct Throttle {
    interval: Duration,
    clock: Arc<dyn Clock>,
    last_passed: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Create a throttle timed by [`RuntimeClock`]
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(RuntimeClock))
    }

    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { interval, clock, last_passed: Mutex::new(None) }
    }

    /// Admit the call if the interval has elapsed, recording it as passed
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut last = self.last_passed.lock();
        match *last {
            Some(at) if now.saturating_duration_since(at) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Run `f` if the throttle admits the call
    pub fn call<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        self.try_acquire().then(f)
    }

    /// Forget the last admitted call so the next one passes
    pub fn reset(&self) {
        *self.last_passed.lock() = None;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("interval", &self.interval)
            .field("last_passed", &*self.last_passed.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for time::throttle.
    use super::*;
    use crate::testing::MockClock;

    fn throttle_with_mock(interval: Duration) -> (Throttle, MockClock) {
        let clock = MockClock::new();
        (Throttle::with_clock(interval, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn first_call_passes_immediately() {
        let (throttle, _clock) = throttle_with_mock(Duration::from_secs(2));
        assert_eq!(throttle.call(|| 7), Some(7));
    }

    #[test]
    fn calls_inside_interval_are_dropped() {
        let (throttle, clock) = throttle_with_mock(Duration::from_secs(2));
        assert!(throttle.try_acquire());

        clock.advance(Duration::from_millis(1999));
        assert!(!throttle.try_acquire());

        clock.advance(Duration::from_millis(1));
        assert!(throttle.try_acquire());
    }

    #[test]
    fn dropped_calls_do_not_extend_the_window() {
        let (throttle, clock) = throttle_with_mock(Duration::from_secs(2));
        assert!(throttle.try_acquire());

        for _ in 0..3 {
            clock.advance(Duration::from_millis(500));
            assert!(!throttle.try_acquire());
        }

        clock.advance(Duration::from_millis(500));
        assert!(throttle.try_acquire());
    }

    #[test]
    fn reset_admits_next_call() {
        let (throttle, _clock) = throttle_with_mock(Duration::from_secs(2));
        assert!(throttle.try_acquire());
        throttle.reset();
        assert!(throttle.try_acquire());
    }
}
