//! Modular common utilities shared across LiveSync crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors and the clock abstraction
//! - `runtime`: async infrastructure (timers, debounce/throttle, event bus)
//! - `observability`: optional tracing (pulled in by `runtime`)
//! - `test-utils`: mock clock and async assertions for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod bus;
#[cfg(feature = "runtime")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use bus::{EventBus, Subscription, SubscriptionSet};
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "foundation")]
pub use testing::time::{Clock, MockClock, SystemClock};
#[cfg(feature = "runtime")]
pub use time::{Debounce, RuntimeClock, Throttle, TimerHandle};
