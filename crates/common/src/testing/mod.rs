//! Testing utilities and helpers
//!
//! - **[`time`]**: Clock abstraction with a mock clock for deterministic tests
//! - **[`async_utils`]**: Async assertions (runtime tier only)

#[cfg(feature = "runtime")]
pub mod async_utils;
pub mod time;

#[cfg(feature = "runtime")]
pub use async_utils::{settle, timeout_ok};
pub use time::{Clock, MockClock, SystemClock};
