use route_tracker_lib::{tracking_action, LocationFix, PermissionState, TrackerError, TrackingAction};
use tokio::sync::{broadcast, mpsc, watch};

use crate::{LocationProvider, ProviderEvent, ProviderEventReceiver, TrackerConfig};

/// Bridges a [`LocationProvider`] to observers of the current fix.
///
/// All methods run on the task that owns the tracker. Dropping it closes
/// every subscription, which is how consumers learn that tracking ended.
pub struct LocationTracker<P: LocationProvider> {
    provider: P,
    permission: PermissionState,
    tracking: bool,
    heading_updates: bool,

    current_fix: watch::Sender<Option<LocationFix>>,
    heading: watch::Sender<Option<f64>>,
    fix_subscribers: Vec<mpsc::UnboundedSender<LocationFix>>,
    notices: broadcast::Sender<TrackerError>,
}

impl<P: LocationProvider> LocationTracker<P> {
    pub fn new(mut provider: P, config: &TrackerConfig) -> Self {
        provider.configure(config.desired_accuracy, config.distance_filter_m);
        let permission = provider.permission_state();

        let (current_fix, _) = watch::channel(None);
        let (heading, _) = watch::channel(None);
        let (notices, _) = broadcast::channel(16);

        Self {
            provider,
            permission,
            tracking: false,
            heading_updates: config.heading_updates,
            current_fix,
            heading,
            fix_subscribers: Vec::new(),
            notices,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn permission_state(&self) -> PermissionState {
        self.permission
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn current_fix(&self) -> Option<LocationFix> {
        *self.current_fix.borrow()
    }

    /// Latest fix. Like a published property, the value present at
    /// subscription time counts as already seen.
    pub fn subscribe_current(&self) -> watch::Receiver<Option<LocationFix>> {
        self.current_fix.subscribe()
    }

    /// Every published fix, in order. Each subscriber gets its own
    /// unbounded queue so a slow consumer never loses fixes.
    pub fn subscribe_fixes(&mut self) -> mpsc::UnboundedReceiver<LocationFix> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.fix_subscribers.push(tx);
        rx
    }

    pub fn subscribe_heading(&self) -> watch::Receiver<Option<f64>> {
        self.heading.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<TrackerError> {
        self.notices.subscribe()
    }

    /// Decide from the provider's current permission whether to prompt,
    /// give up with a notice, or start tracking.
    pub fn request_tracking_start(&mut self) -> TrackingAction {
        self.permission = self.provider.permission_state();
        self.apply(self.permission)
    }

    pub fn on_permission_changed(&mut self, state: PermissionState) -> TrackingAction {
        tracing::info!("Location permission changed to {}", state);
        self.permission = state;
        self.apply(state)
    }

    fn apply(&mut self, state: PermissionState) -> TrackingAction {
        let action = tracking_action(state);

        match &action {
            TrackingAction::RequestFullAuthorization => {
                tracing::info!("Permission is {}, requesting full authorization", state);
                self.provider.request_full_authorization();
            }
            TrackingAction::Notify(notice) => {
                tracing::warn!("{}", notice);
                self.notify(notice.clone());
            }
            TrackingAction::StartUpdates => {
                if self.tracking {
                    tracing::debug!("Already tracking");
                } else {
                    tracing::info!("Starting location updates");
                    self.provider.start_location_updates();
                    if self.heading_updates && self.provider.supports_heading() {
                        self.provider.start_heading_updates();
                    }
                    self.tracking = true;
                }
            }
        }

        action
    }

    pub fn on_fixes_received(&mut self, fixes: Vec<LocationFix>) {
        let Some(fix) = fixes.into_iter().next() else {
            return;
        };

        tracing::debug!("Updated current location ({}, {})", fix.latitude(), fix.longitude());
        self.current_fix.send_replace(Some(fix));
        self.fix_subscribers.retain(|subscriber| subscriber.send(fix).is_ok());
    }

    pub fn on_heading_received(&mut self, heading: f64) {
        self.heading.send_replace(Some(heading));
    }

    /// Provider failures are reported but tracking carries on, the
    /// provider retries by itself.
    pub fn on_failure(&mut self, message: String) {
        tracing::error!("Location provider failure: {}", message);
        self.notify(TrackerError::ProviderFailure(message));
    }

    fn notify(&self, notice: TrackerError) {
        let _ = self.notices.send(notice);
    }

    pub fn handle_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::PermissionChanged(state) => {
                self.on_permission_changed(state);
            }
            ProviderEvent::FixesReceived(fixes) => self.on_fixes_received(fixes),
            ProviderEvent::HeadingReceived(heading) => self.on_heading_received(heading),
            ProviderEvent::Failure(message) => self.on_failure(message),
        }
    }

    pub fn stop(&mut self) {
        if self.tracking {
            tracing::info!("Stopping location updates");
            self.provider.stop_updates();
            self.tracking = false;
        }
    }

    /// Processes provider events until the provider hangs up, then tears
    /// the tracker down.
    pub async fn run(mut self, mut events: ProviderEventReceiver) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }

        tracing::info!("Location provider closed its event stream");
        self.stop();
    }
}
