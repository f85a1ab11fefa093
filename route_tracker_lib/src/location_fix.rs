use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::geo_util::haversine_distance;

/// A single observation from a location provider. The position uses the
/// geo-types convention, x is longitude and y is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub position: Point,
    /// Metres per second, negative when the provider could not determine it.
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(position: Point, speed: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            position,
            speed,
            timestamp,
        }
    }

    pub fn from_lat_lon(latitude: f64, longitude: f64, speed: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(Point::new(longitude, latitude), speed, timestamp)
    }

    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }

    pub fn has_valid_speed(&self) -> bool {
        self.speed >= 0.
    }

    /// Distance in metres to another fix.
    pub fn distance_to(&self, other: &LocationFix) -> f64 {
        haversine_distance(self.position, other.position)
    }
}
