use geo::{Bearing, Distance, Haversine, Length};
use geo_types::{LineString, Point};
use serde::{Deserialize, Serialize};

/// Mean radius of the earth in metres, the radius `geo::Haversine` uses.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance in metres between two points (x = longitude, y = latitude).
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    Haversine.distance(p1, p2)
}

/// Initial bearing from `from` towards `to`, in degrees clockwise from true north.
pub fn initial_bearing(from: Point, to: Point) -> f64 {
    Haversine.bearing(from, to).rem_euclid(360.)
}

/// Great-circle length of a path in metres.
pub fn path_length(path: &LineString) -> f64 {
    Haversine.length(path)
}

/// Visible map area, expressed as a center and the spans in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Point,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// A region `span_m` metres tall and wide around `center`.
    pub fn centered_on(center: Point, span_m: f64) -> Self {
        let meters_per_degree = EARTH_RADIUS_M.to_radians();
        let latitude_delta = (span_m / meters_per_degree).min(180.);

        let cos_lat = center.y().to_radians().cos();
        let longitude_delta = if cos_lat <= f64::EPSILON {
            360.
        } else {
            (span_m / (meters_per_degree * cos_lat)).min(360.)
        };

        Self {
            center,
            latitude_delta,
            longitude_delta,
        }
    }
}
