//! Offline action queue
//!
//! [`InMemoryOfflineQueue`] buffers actions per session and implements the
//! flush primitive the sync coordinator drives. Delivery goes through a
//! [`RemoteActionSink`].

pub mod memory;
pub mod sink;

pub use memory::{InMemoryOfflineQueue, DEFAULT_QUEUE_CAPACITY};
pub use sink::{InMemoryActionSink, RemoteActionSink};
