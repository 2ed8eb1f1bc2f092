//! Session lifecycle: binds both coordinators to session start and end

pub mod bridge;
pub mod ports;
pub mod state;

pub use bridge::{BridgeDependencies, LifecycleBridge};
pub use state::CoordinatorRuntimeState;
