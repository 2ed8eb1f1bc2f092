//! Presence store adapters

pub mod store;

pub use store::InMemoryPresenceStore;
