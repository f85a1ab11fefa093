use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use chrono::{DateTime, Utc};
use route_tracker_lib::LocationFix;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("failed to open route file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse GPX: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("route contains no track points")]
    Empty,
}

/// Reads every track point of a GPX file, in order, as location fixes.
pub fn read_route(path: impl AsRef<Path>) -> Result<Vec<LocationFix>, RouteError> {
    let file = File::open(path)?;
    read_route_from(BufReader::new(file))
}

/// Speed comes from the GPX file when present, otherwise it is derived from
/// the previous point. A fix whose speed cannot be known gets -1.
pub fn read_route_from(reader: impl Read) -> Result<Vec<LocationFix>, RouteError> {
    let gpx = gpx::read(reader)?;

    let mut fixes: Vec<LocationFix> = Vec::new();
    for track in gpx.tracks {
        for segment in track.segments {
            for point in segment.points {
                let position = point.point();
                let gpx_speed = point.speed;
                let timestamp = point.time.and_then(|time| time.format().ok()).and_then(|text| {
                    DateTime::parse_from_rfc3339(&text).ok().map(|dt| dt.with_timezone(&Utc))
                });

                let mut fix = LocationFix::new(position, -1., timestamp.unwrap_or(DateTime::<Utc>::UNIX_EPOCH));
                fix.speed = match (gpx_speed, fixes.last(), timestamp) {
                    (Some(speed), _, _) => speed,
                    (None, Some(previous), Some(_)) => derived_speed(previous, &fix).unwrap_or(-1.),
                    _ => -1.,
                };
                fixes.push(fix);
            }
        }
    }

    if fixes.is_empty() {
        return Err(RouteError::Empty);
    }

    tracing::debug!("Read route with {} points", fixes.len());
    Ok(fixes)
}

fn derived_speed(previous: &LocationFix, current: &LocationFix) -> Option<f64> {
    let seconds = (current.timestamp - previous.timestamp).num_milliseconds() as f64 / 1000.;
    (seconds > 0.).then(|| previous.distance_to(current) / seconds)
}
