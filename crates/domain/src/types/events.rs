//! Signals consumed by the coordinators

use serde::{Deserialize, Serialize};

use crate::impl_wire_name_conversions;
use crate::types::presence::SessionId;

/// Low-level user activity reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionEvent {
    PointerDown,
    KeyDown,
    TouchStart,
    Scroll,
    VisibilityRestored,
    WindowFocus,
    VisibilityHidden,
    WindowBlur,
}

impl_wire_name_conversions!(InteractionEvent {
    PointerDown => "pointer_down",
    KeyDown => "key_down",
    TouchStart => "touch_start",
    Scroll => "scroll",
    VisibilityRestored => "visibility_restored",
    WindowFocus => "window_focus",
    VisibilityHidden => "visibility_hidden",
    WindowBlur => "window_blur",
});

impl InteractionEvent {
    /// Events that count as user activity for idle detection
    pub const fn is_qualifying(&self) -> bool {
        !matches!(self, Self::VisibilityHidden | Self::WindowBlur)
    }
}

/// Host lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSignal {
    TransportOnline,
    TransportOffline,
    /// Fired by the queue producer after every append
    QueueMutated,
    /// Fired by the background-execution facility when the host resumes
    ExternalWake,
}

/// Authentication lifecycle, consumed not produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    SignedIn(SessionId),
    SignedOut,
}

/// Why a flush was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    OnlineEdge,
    QueueMutated,
    Periodic,
    ExternalWake,
    Manual,
}

impl_wire_name_conversions!(SyncTrigger {
    OnlineEdge => "online_edge",
    QueueMutated => "queue_mutated",
    Periodic => "periodic",
    ExternalWake => "external_wake",
    Manual => "manual",
});
