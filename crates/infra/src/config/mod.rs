//! Configuration loading and management
//!
//! This module provides utilities for loading coordinator configuration
//! from environment variables and files.

pub mod error;
pub mod loader;

// Re-export commonly used items
pub use error::ConfigError;
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
