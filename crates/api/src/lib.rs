//! # LiveSync App
//!
//! Application layer: dependency wiring and the `livesync` binary.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Tracing initialisation and log helpers
//! - Main entry point
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires infrastructure adapters into the lifecycle bridge

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::*;
