use chrono::{DateTime, Utc};
use geo_types::{LineString, Point};
use serde::{Deserialize, Serialize};

use crate::{
    statistics::{elapsed_seconds, SessionSummary, TripStatistics},
    LocationFix,
};

/// Accumulates the fixes of one tracking run into a path and trip totals.
///
/// `visited_fixes` is append-only and `traveled_distance` never decreases.
/// The anchor is the last processed fix, the baseline for the next
/// incremental distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSession {
    start_time: DateTime<Utc>,
    visited_fixes: Vec<LocationFix>,
    traveled_distance: f64,
    anchor: Option<LocationFix>,
}

/// Everything the presentation layer needs after a fix was processed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub statistics: TripStatistics,
    /// Vertex appended to the session path. The full path is [`TrackSession::path`].
    pub new_vertex: Point,
    /// Distance this fix added to the total.
    pub contributed_distance: f64,
}

impl TrackSession {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            visited_fixes: Vec::new(),
            traveled_distance: 0.,
            anchor: None,
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn visited_fixes(&self) -> &[LocationFix] {
        &self.visited_fixes
    }

    pub fn anchor(&self) -> Option<&LocationFix> {
        self.anchor.as_ref()
    }

    /// Metres travelled so far.
    pub fn traveled_distance(&self) -> f64 {
        self.traveled_distance
    }

    pub fn on_fix_received(&mut self, fix: LocationFix, now: DateTime<Utc>) -> SessionUpdate {
        self.visited_fixes.push(fix);

        let contributed_distance = match self.anchor.replace(fix) {
            None => 0.,
            Some(anchor) => {
                let d = anchor.distance_to(&fix);
                if d.is_finite() {
                    d
                } else {
                    tracing::warn!("Ignoring non-finite distance between {:?} and {:?}", anchor.position, fix.position);
                    0.
                }
            }
        };
        self.traveled_distance += contributed_distance;

        tracing::debug!(
            "Fix #{} at ({}, {}), +{:.2}m, total {:.2}m",
            self.visited_fixes.len(),
            fix.latitude(),
            fix.longitude(),
            contributed_distance,
            self.traveled_distance
        );

        SessionUpdate {
            statistics: TripStatistics::compute(fix.speed, self.start_time, now, self.traveled_distance),
            new_vertex: fix.position,
            contributed_distance,
        }
    }

    /// The visited coordinates, in the order they were received.
    pub fn path(&self) -> LineString {
        self.visited_fixes.iter().map(|fix| fix.position).collect()
    }

    /// Statistics for the latest fix, if any has been received.
    pub fn statistics(&self, now: DateTime<Utc>) -> Option<TripStatistics> {
        self.visited_fixes
            .last()
            .map(|fix| TripStatistics::compute(fix.speed, self.start_time, now, self.traveled_distance))
    }

    pub fn summary(&self, end_time: DateTime<Utc>) -> SessionSummary {
        let elapsed_seconds = elapsed_seconds(self.start_time, end_time);
        let average_speed_mps = if elapsed_seconds > 0 {
            self.traveled_distance / elapsed_seconds as f64
        } else {
            0.
        };

        SessionSummary {
            start_time: self.start_time,
            end_time,
            fix_count: self.visited_fixes.len(),
            traveled_distance_m: self.traveled_distance,
            elapsed_seconds,
            average_speed_mps,
        }
    }
}
