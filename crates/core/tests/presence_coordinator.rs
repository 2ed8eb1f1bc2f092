//! Integration tests for `PresenceCoordinator`.
//!
//! Time is paused: idle thresholds and throttle windows are crossed with
//! `tokio::time::advance`, and `settle` drains spawned listeners without
//! moving the clock.

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use livesync_common::testing::settle;
use livesync_core::{PresenceCoordinator, PresencePath};
use livesync_domain::{InteractionEvent, PresenceConfig, PresenceState};
use support::{assert_online_preceded_by_registration, session, PathOp, RecordingPath};

const IDLE: Duration = Duration::from_secs(300);

fn presence(path: &Arc<RecordingPath>) -> PresenceCoordinator {
    PresenceCoordinator::new(session("user-1"), Arc::clone(path) as Arc<dyn PresencePath>, &PresenceConfig::default())
}

async fn attached(path: &Arc<RecordingPath>) -> (PresenceCoordinator, livesync_common::Subscription) {
    let presence = presence(path);
    let subscription = presence.start();
    path.set_connected(true);
    settle().await;
    (presence, subscription)
}

// ============================================================================
// Attach ordering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn attach_with_successful_registration_writes_online_once() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    assert_eq!(path.ops(), vec![PathOp::Register(PresenceState::Offline), PathOp::Write(PresenceState::Online)]);
    assert_eq!(presence.state(), PresenceState::Online);
}

#[tokio::test(start_paused = true)]
async fn attach_with_failed_registration_writes_nothing_and_warns_once() {
    let path = RecordingPath::new();
    path.fail_registration(true);
    let (presence, _sub) = attached(&path).await;

    assert_eq!(path.write_count(PresenceState::Online), 0);
    assert_eq!(presence.metrics().registration_failures, 1);
    assert_eq!(presence.state(), PresenceState::Offline);
}

#[tokio::test(start_paused = true)]
async fn online_write_waits_for_pending_registration() {
    let path = RecordingPath::new();
    path.hold_registrations();
    let (presence, _sub) = attached(&path).await;

    assert_eq!(path.registrations_started(), 1);
    assert!(path.writes().is_empty());
    assert_eq!(presence.state(), PresenceState::Offline);

    path.release_registration();
    settle().await;

    assert_eq!(path.ops(), vec![PathOp::Register(PresenceState::Offline), PathOp::Write(PresenceState::Online)]);
}

#[tokio::test(start_paused = true)]
async fn registration_timeout_counts_as_failure() {
    let path = RecordingPath::new();
    path.hold_registrations();
    let (presence, _sub) = attached(&path).await;

    tokio::time::advance(PresenceConfig::default().write_timeout() + Duration::from_millis(1)).await;
    settle().await;

    assert_eq!(presence.metrics().registration_failures, 1);
    assert!(path.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn attach_detach_sequences_never_write_online_before_registration() {
    let path = RecordingPath::new();
    let presence = presence(&path);
    let _sub = presence.start();
    settle().await;

    // Third attach has its registration rejected.
    let failures = [false, false, true, false, false];
    for fail in failures {
        path.fail_registration(fail);
        path.set_connected(true);
        settle().await;
        path.set_connected(false);
        settle().await;
    }

    let ops = path.ops();
    assert_online_preceded_by_registration(&ops);
    assert_eq!(path.write_count(PresenceState::Online), 4);
    assert_eq!(presence.metrics().registration_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn detach_marks_offline_locally_without_writing() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    path.set_connected(false);
    settle().await;

    assert_eq!(presence.state(), PresenceState::Offline);
    assert_eq!(path.write_count(PresenceState::Offline), 0);

    path.set_connected(true);
    settle().await;
    assert_eq!(path.write_count(PresenceState::Online), 2);
    assert_eq!(presence.state(), PresenceState::Online);
}

// ============================================================================
// Idle detection
// ============================================================================

#[tokio::test(start_paused = true)]
async fn idle_written_once_after_threshold_without_interaction() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    tokio::time::advance(IDLE - Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(path.write_count(PresenceState::Idle), 0);

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(path.write_count(PresenceState::Idle), 1);
    assert_eq!(presence.state(), PresenceState::Idle);

    tokio::time::advance(IDLE * 6).await;
    settle().await;
    assert_eq!(path.writes(), vec![PresenceState::Online, PresenceState::Idle]);
}

#[tokio::test(start_paused = true)]
async fn interactions_keep_session_online() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(180)).await;
        settle().await;
        presence.handle_interaction(InteractionEvent::PointerDown).await;
    }
    assert_eq!(path.writes(), vec![PresenceState::Online]);

    tokio::time::advance(IDLE).await;
    settle().await;
    assert_eq!(path.writes(), vec![PresenceState::Online, PresenceState::Idle]);
}

#[tokio::test(start_paused = true)]
async fn interaction_restores_online_from_idle() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    tokio::time::advance(IDLE).await;
    settle().await;
    presence.handle_interaction(InteractionEvent::KeyDown).await;

    assert_eq!(path.writes(), vec![PresenceState::Online, PresenceState::Idle, PresenceState::Online]);
    assert!(presence.is_idle_timer_active());
}

#[tokio::test(start_paused = true)]
async fn non_qualifying_signals_do_not_restore_online() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    tokio::time::advance(IDLE).await;
    settle().await;
    presence.handle_interaction(InteractionEvent::VisibilityHidden).await;
    presence.handle_interaction(InteractionEvent::WindowBlur).await;

    assert_eq!(presence.state(), PresenceState::Idle);
    assert_eq!(path.write_count(PresenceState::Online), 1);
}

// ============================================================================
// Write suppression and throttling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn repeated_online_is_never_written_twice() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    for _ in 0..3 {
        tokio::time::advance(Duration::from_secs(3)).await;
        presence.handle_interaction(InteractionEvent::Scroll).await;
    }

    assert_eq!(path.writes(), vec![PresenceState::Online]);
    assert_eq!(presence.metrics().suppressed_writes, 3);
    assert_eq!(presence.metrics().writes, 1);
}

#[tokio::test(start_paused = true)]
async fn scroll_burst_is_throttled() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;
    tokio::time::advance(IDLE).await;
    settle().await;

    for _ in 0..100 {
        presence.handle_interaction(InteractionEvent::Scroll).await;
        tokio::time::advance(Duration::from_millis(10)).await;
    }

    assert_eq!(path.writes(), vec![PresenceState::Online, PresenceState::Idle, PresenceState::Online]);
    assert_eq!(presence.metrics().throttled_interactions, 99);
}

#[tokio::test(start_paused = true)]
async fn failed_write_is_not_retried_until_next_trigger() {
    let path = RecordingPath::new();
    let (presence, _sub) = attached(&path).await;

    path.fail_writes(true);
    tokio::time::advance(IDLE).await;
    settle().await;
    assert_eq!(presence.metrics().write_failures, 1);
    assert_eq!(presence.state(), PresenceState::Online);

    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(presence.metrics().writes, 2);

    path.fail_writes(false);
    presence.handle_interaction(InteractionEvent::TouchStart).await;
    tokio::time::advance(IDLE).await;
    settle().await;
    assert_eq!(path.writes(), vec![PresenceState::Online, PresenceState::Idle]);
}

// ============================================================================
// Session end
// ============================================================================

#[tokio::test(start_paused = true)]
async fn end_session_writes_offline_from_any_state() {
    for idle_first in [false, true] {
        let path = RecordingPath::new();
        let (presence, sub) = attached(&path).await;
        if idle_first {
            tokio::time::advance(IDLE).await;
            settle().await;
        }

        sub.cancel();
        presence.end_session().await;

        assert_eq!(path.writes().last(), Some(&PresenceState::Offline));
        assert!(!presence.is_idle_timer_active());
    }
}

#[tokio::test(start_paused = true)]
async fn end_session_before_attach_still_writes_offline() {
    let path = RecordingPath::new();
    let presence = presence(&path);
    let _sub = presence.start();
    settle().await;

    presence.end_session().await;
    assert_eq!(path.writes(), vec![PresenceState::Offline]);

    presence.handle_interaction(InteractionEvent::KeyDown).await;
    tokio::time::advance(IDLE).await;
    settle().await;
    assert_eq!(path.writes(), vec![PresenceState::Offline]);
}
