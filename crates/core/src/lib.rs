//! # LiveSync Core
//!
//! Presence and offline-sync coordination against port traits.
//!
//! This crate contains:
//! - Port/adapter interfaces for the presence path, queue flush primitive,
//!   host environment, preferences and notifications
//! - [`PresenceCoordinator`]: online/idle/offline state machine for one session
//! - [`SyncCoordinator`]: trigger de-duplication around the flush primitive
//! - [`LifecycleBridge`]: binds both coordinators to session start and end
//!
//! ## Architecture Principles
//! - Only depends on `livesync-common` and `livesync-domain`
//! - No storage, network or platform code
//! - All external collaborators via traits

pub mod error;
pub mod lifecycle;
pub mod presence;
pub mod sync;

pub use error::{CoordinatorError, CoordinatorResult};
pub use lifecycle::ports::HostEnvironment;
pub use lifecycle::{BridgeDependencies, CoordinatorRuntimeState, LifecycleBridge};
pub use presence::ports::PresencePath;
pub use presence::{PresenceCoordinator, PresenceMetrics, PresenceMetricsSnapshot};
pub use sync::ports::{PreferenceSource, QueueFlusher, SyncNotifier};
pub use sync::{SyncCoordinator, SyncMetrics, SyncMetricsSnapshot, SyncPorts};
