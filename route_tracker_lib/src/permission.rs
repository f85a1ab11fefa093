use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::TrackerError;

/// Authorization state reported by the platform's location services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Undetermined,
    Restricted,
    Denied,
    /// Provisional "while in use" grant.
    AuthorizedLimited,
    /// "Always" grant, the only state in which tracking runs.
    AuthorizedFull,
}

/// What the tracker should do about a given permission state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingAction {
    RequestFullAuthorization,
    Notify(TrackerError),
    StartUpdates,
}

/// The whole permission policy. The result of a `RequestFullAuthorization`
/// arrives later as a new state, which is fed back through this function.
pub fn tracking_action(state: PermissionState) -> TrackingAction {
    match state {
        PermissionState::Undetermined | PermissionState::AuthorizedLimited => TrackingAction::RequestFullAuthorization,
        PermissionState::Restricted => TrackingAction::Notify(TrackerError::PermissionRestricted),
        PermissionState::Denied => TrackingAction::Notify(TrackerError::PermissionDenied),
        PermissionState::AuthorizedFull => TrackingAction::StartUpdates,
    }
}

impl PermissionState {
    pub const ALL: [PermissionState; 5] = [
        PermissionState::Undetermined,
        PermissionState::Restricted,
        PermissionState::Denied,
        PermissionState::AuthorizedLimited,
        PermissionState::AuthorizedFull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Undetermined => "undetermined",
            PermissionState::Restricted => "restricted",
            PermissionState::Denied => "denied",
            PermissionState::AuthorizedLimited => "authorized-limited",
            PermissionState::AuthorizedFull => "authorized-full",
        }
    }

    pub fn allows_tracking(&self) -> bool {
        *self == PermissionState::AuthorizedFull
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission state: {0}")]
pub struct ParsePermissionError(String);

impl FromStr for PermissionState {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}
