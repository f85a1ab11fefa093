use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Values shown in the speed, time and distance labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripStatistics {
    /// Raw provider speed in m/s. Negative sentinels are passed through.
    pub current_speed: f64,
    pub elapsed_seconds: i64,
    pub distance_meters: i64,
}

impl TripStatistics {
    pub fn compute(current_speed: f64, start_time: DateTime<Utc>, now: DateTime<Utc>, traveled_distance: f64) -> Self {
        Self {
            current_speed,
            elapsed_seconds: elapsed_seconds(start_time, now),
            distance_meters: traveled_distance.round() as i64,
        }
    }

    pub fn speed_label(&self) -> String {
        format!("{}", self.current_speed)
    }

    pub fn time_label(&self) -> String {
        format!("{}s", self.elapsed_seconds)
    }

    pub fn distance_label(&self) -> String {
        format!("{}m", self.distance_meters)
    }
}

impl fmt::Display for TripStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "speed {} | time {} | distance {}", self.speed_label(), self.time_label(), self.distance_label())
    }
}

/// Whole seconds since `start_time`, clamped at zero.
pub(crate) fn elapsed_seconds(start_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start_time).num_seconds().max(0)
}

/// Totals for a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub fix_count: usize,
    pub traveled_distance_m: f64,
    pub elapsed_seconds: i64,
    pub average_speed_mps: f64,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fixes, {:.0}m in {}s (avg {:.2} m/s)",
            self.fix_count, self.traveled_distance_m, self.elapsed_seconds, self.average_speed_mps
        )
    }
}
