//! Time utilities for coordinator tasks
//!
//! - **[`timer`]**: One-shot and recurring timers with cancellable handles
//! - **[`debounce`]**: Trailing-edge debounce built on [`timer::schedule`]
//! - **[`throttle`]**: Leading-edge throttle gated on a [`Clock`]
//! - **[`RuntimeClock`]**: Clock that follows tokio time, including a paused
//!   test clock
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use livesync_common::time::Throttle;
//!
//! let throttle = Throttle::new(Duration::from_secs(2));
//! assert!(throttle.try_acquire());
//! assert!(!throttle.try_acquire());
//! ```

pub mod debounce;
pub mod throttle;
pub mod timer;

use std::time::{Instant, SystemTime};

pub use debounce::Debounce;
pub use throttle::Throttle;
pub use timer::{recurring, schedule, TimerHandle};

// Re-export Clock abstractions from testing module
pub use crate::testing::time::{Clock, MockClock, SystemClock};

/// Clock backed by `tokio::time::Instant`
///
/// Outside a runtime this reads the system clock. Inside a runtime with a
/// paused clock it advances only when tokio time is advanced.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeClock;

impl Clock for RuntimeClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}
