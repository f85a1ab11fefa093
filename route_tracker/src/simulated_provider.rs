use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use route_tracker_lib::{geo_util::initial_bearing, LocationFix, PermissionState};
use tokio::task::JoinHandle;

use crate::{Accuracy, LocationProvider, ProviderEvent, ProviderEventSender};

/// A provider that replays a recorded route, standing in for a device.
///
/// The user answers the authorization prompt once with a scripted grant.
/// When tracking cannot start after that answer, or the route has been
/// delivered, the provider drops its event sender so the event stream ends.
pub struct SimulatedProvider {
    route: Vec<LocationFix>,
    permission: PermissionState,
    grant: PermissionState,
    prompt_answered: bool,
    interval: Duration,
    distance_filter_m: f64,
    heading_enabled: Arc<AtomicBool>,
    events: Option<ProviderEventSender>,
    replay: Option<JoinHandle<()>>,
}

impl SimulatedProvider {
    pub fn new(
        route: Vec<LocationFix>,
        initial: PermissionState,
        grant: PermissionState,
        interval: Duration,
        events: ProviderEventSender,
    ) -> Self {
        Self {
            route,
            permission: initial,
            grant,
            prompt_answered: false,
            interval,
            distance_filter_m: 0.,
            heading_enabled: Arc::new(AtomicBool::new(false)),
            events: Some(events),
            replay: None,
        }
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl LocationProvider for SimulatedProvider {
    fn configure(&mut self, accuracy: Accuracy, distance_filter_m: f64) {
        tracing::debug!("Simulated provider configured: accuracy {}, filter {}m", accuracy, distance_filter_m);
        self.distance_filter_m = distance_filter_m;
    }

    fn permission_state(&self) -> PermissionState {
        self.permission
    }

    fn request_full_authorization(&mut self) {
        if self.prompt_answered {
            tracing::debug!("Authorization prompt already answered, ignoring request");
            return;
        }
        self.prompt_answered = true;
        self.permission = self.grant;

        if let Some(events) = &self.events {
            let _ = events.send(ProviderEvent::PermissionChanged(self.grant));
        }
        if !self.grant.allows_tracking() {
            self.events = None;
        }
    }

    fn start_location_updates(&mut self) {
        let Some(events) = self.events.take() else {
            tracing::warn!("Location updates already started");
            return;
        };

        let route = std::mem::take(&mut self.route);
        tracing::info!("Replaying {} recorded fixes", route.len());

        self.replay = Some(tokio::spawn(replay_route(
            route,
            self.distance_filter_m,
            self.interval,
            self.heading_enabled.clone(),
            events,
        )));
    }

    fn supports_heading(&self) -> bool {
        true
    }

    fn start_heading_updates(&mut self) {
        self.heading_enabled.store(true, Ordering::Relaxed);
    }

    fn stop_updates(&mut self) {
        if let Some(replay) = self.replay.take() {
            replay.abort();
        }
        self.heading_enabled.store(false, Ordering::Relaxed);
        self.events = None;
    }
}

async fn replay_route(
    route: Vec<LocationFix>,
    distance_filter_m: f64,
    interval: Duration,
    heading_enabled: Arc<AtomicBool>,
    events: ProviderEventSender,
) {
    let mut last_delivered: Option<LocationFix> = None;
    let mut delivered = 0;

    for fix in route {
        if let Some(last) = last_delivered {
            if last.distance_to(&fix) < distance_filter_m {
                continue;
            }
            if heading_enabled.load(Ordering::Relaxed) {
                let heading = initial_bearing(last.position, fix.position);
                if events.send(ProviderEvent::HeadingReceived(heading)).is_err() {
                    return;
                }
            }
        }

        if events.send(ProviderEvent::FixesReceived(vec![fix])).is_err() {
            tracing::debug!("Tracker went away, ending replay");
            return;
        }
        last_delivered = Some(fix);
        delivered += 1;

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }

    tracing::info!("Replay finished after {} fixes", delivered);
}
