//! Domain types and models

pub mod events;
pub mod presence;
pub mod queue;

pub use events::{AuthEvent, HostSignal, InteractionEvent, SyncTrigger};
pub use presence::{PresenceRecord, PresenceState, PresenceWrite, ServerTimestamp, SessionId};
pub use queue::{FlushOutcome, OfflineQueueEntry, SyncSummary};
