//! # LiveSync Domain
//!
//! Domain types for the presence and offline-sync coordinators.
//!
//! This crate contains:
//! - Presence and offline-queue data types
//! - Host, interaction and auth signals consumed by the coordinators
//! - Configuration structures with defaults
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other LiveSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
