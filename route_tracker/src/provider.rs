use route_tracker_lib::{LocationFix, PermissionState};
use tokio::sync::mpsc;

use crate::Accuracy;

/// Callbacks from the platform's location services, delivered over a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    PermissionChanged(PermissionState),
    /// One platform batch. Only the first fix of a batch is published.
    FixesReceived(Vec<LocationFix>),
    /// Degrees clockwise from true north.
    HeadingReceived(f64),
    Failure(String),
}

pub type ProviderEventSender = mpsc::UnboundedSender<ProviderEvent>;
pub type ProviderEventReceiver = mpsc::UnboundedReceiver<ProviderEvent>;

pub fn provider_channel() -> (ProviderEventSender, ProviderEventReceiver) {
    mpsc::unbounded_channel()
}

/// The commands the tracker can issue to a location provider. Requests
/// return immediately, their outcome comes back as a [`ProviderEvent`].
pub trait LocationProvider {
    fn configure(&mut self, accuracy: Accuracy, distance_filter_m: f64);

    fn permission_state(&self) -> PermissionState;

    /// Ask the user for the "always" grant. The answer arrives as
    /// [`ProviderEvent::PermissionChanged`].
    fn request_full_authorization(&mut self);

    fn start_location_updates(&mut self);

    fn supports_heading(&self) -> bool {
        false
    }

    fn start_heading_updates(&mut self) {}

    fn stop_updates(&mut self);
}
