use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use route_tracker::{provider_channel, ControlCommand, LocationTracker, MapController, SimulatedProvider, TrackerConfig};
use route_tracker_lib::{LocationFix, PermissionState, TrackerError, ViewMode};
use tokio::sync::mpsc;

fn equator_walk() -> Vec<LocationFix> {
    let start = DateTime::<Utc>::UNIX_EPOCH;
    (0..5)
        .map(|i| LocationFix::from_lat_lon(0., i as f64 * 0.001, 1.1, start + TimeDelta::seconds(i)))
        .collect()
}

struct Outcome {
    summary: Option<route_tracker_lib::SessionSummary>,
    updates: usize,
    notices: Vec<TrackerError>,
    tracked: bool,
}

async fn run_pipeline(initial: PermissionState, grant: PermissionState, commands: Vec<ControlCommand>) -> Outcome {
    let config = TrackerConfig::default();
    let (event_tx, event_rx) = provider_channel();
    let provider = SimulatedProvider::new(equator_walk(), initial, grant, Duration::ZERO, event_tx);
    let mut tracker = LocationTracker::new(provider, &config);

    let fixes = tracker.subscribe_fixes();
    let mut notices = tracker.subscribe_notices();

    let mut controller = MapController::new(config.region_span_m);
    controller.start_session(Utc::now());

    let (command_tx, command_rx) = mpsc::channel(8);
    for command in commands {
        command_tx.send(command).await.unwrap();
    }
    let (update_tx, mut update_rx) = mpsc::channel(64);
    let controller = tokio::spawn(controller.run(fixes, command_rx, update_tx));

    tracker.request_tracking_start();
    let tracked = tracker.provider().is_replaying() || tracker.permission_state() == PermissionState::AuthorizedFull;
    tracker.run(event_rx).await;

    let summary = controller.await.unwrap();
    drop(command_tx);

    let mut updates = 0;
    while update_rx.recv().await.is_some() {
        updates += 1;
    }

    let mut received = Vec::new();
    while let Ok(notice) = notices.recv().await {
        received.push(notice);
    }

    Outcome {
        summary,
        updates,
        notices: received,
        tracked,
    }
}

#[tokio::test]
async fn granted_route_is_fully_accumulated() {
    let outcome = run_pipeline(PermissionState::Undetermined, PermissionState::AuthorizedFull, Vec::new()).await;

    let summary = outcome.summary.unwrap();
    assert_eq!(summary.fix_count, 5);
    assert!((summary.traveled_distance_m - 4. * 111.195).abs() < 0.05, "got {}", summary.traveled_distance_m);
    assert_eq!(outcome.updates, 5);
    assert!(outcome.notices.is_empty());
}

#[tokio::test]
async fn denied_user_never_tracks() {
    let outcome = run_pipeline(PermissionState::Undetermined, PermissionState::Denied, Vec::new()).await;

    assert!(!outcome.tracked);
    assert_eq!(outcome.summary.unwrap().fix_count, 0);
    assert_eq!(outcome.updates, 0);
    assert_eq!(outcome.notices, vec![TrackerError::PermissionDenied]);
}

#[tokio::test]
async fn limited_grant_keeps_tracking_off() {
    let outcome = run_pipeline(PermissionState::AuthorizedLimited, PermissionState::AuthorizedLimited, Vec::new()).await;

    assert_eq!(outcome.summary.unwrap().fix_count, 0);
    assert!(outcome.notices.is_empty());
}

#[tokio::test]
async fn already_authorized_starts_immediately() {
    let outcome = run_pipeline(PermissionState::AuthorizedFull, PermissionState::Denied, Vec::new()).await;

    assert!(outcome.tracked);
    assert_eq!(outcome.summary.unwrap().fix_count, 5);
}

#[tokio::test]
async fn stopping_the_session_discards_later_statistics() {
    let outcome = run_pipeline(
        PermissionState::AuthorizedFull,
        PermissionState::AuthorizedFull,
        vec![ControlCommand::StopSession, ControlCommand::ToggleViewMode],
    )
    .await;

    // The stop command is queued before any fix, so no session is left to summarise
    assert!(outcome.summary.is_none());
    assert_eq!(outcome.updates, 6);
}

#[test]
fn view_mode_defaults_to_follow() {
    assert_eq!(MapController::new(1000.).view_mode(), ViewMode::FollowUser);
}
