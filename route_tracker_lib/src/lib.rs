pub mod error;
pub mod geo_util;
pub mod location_fix;
pub mod permission;
pub mod statistics;
pub mod track_session;
pub mod view_mode;

pub use error::TrackerError;
pub use location_fix::LocationFix;
pub use permission::{tracking_action, ParsePermissionError, PermissionState, TrackingAction};
pub use statistics::{SessionSummary, TripStatistics};
pub use track_session::{SessionUpdate, TrackSession};
pub use view_mode::ViewMode;
