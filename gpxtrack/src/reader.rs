//! GPX decoding.

use crate::{GeoPoint, TimeOfDay, Track, TrackError};
use chrono::DateTime;
use gpx::{Gpx, Time, Waypoint};
use log::debug;
use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read},
    path::{Path, PathBuf},
};

impl Track {
    /// Returns a track holding every fix in the GPX file at `path`.
    ///
    /// Fixes are ordered track by track, segment by segment, with
    /// standalone waypoints appended after all track points.
    pub fn from_gpx_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TrackError::NotFound(path.to_owned()),
            _ => TrackError::Io {
                path: path.to_owned(),
                source: e,
            },
        })?;
        let track = Self::from_gpx_reader(BufReader::new(file)).map_err(|e| e.at(path.to_owned()))?;
        debug!("loaded {} fixes from {path:?}", track.len());
        Ok(track)
    }

    /// Returns a track decoded from GPX formatted `reader`.
    pub fn from_gpx_reader<R: Read>(reader: R) -> Result<Self, TrackError> {
        let gpx: Gpx = gpx::read(reader).map_err(|e| TrackError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;

        let records = gpx
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .flat_map(|segment| segment.points.iter())
            .chain(gpx.waypoints.iter());

        let mut track = Track::new();
        for (index, waypoint) in records.enumerate() {
            track.push(fix(index, waypoint)?);
        }
        Ok(track)
    }
}

fn fix(index: usize, waypoint: &Waypoint) -> Result<GeoPoint, TrackError> {
    let missing = |field: &'static str| TrackError::MissingField {
        path: PathBuf::new(),
        index,
        field,
    };
    let elevation = waypoint.elevation.ok_or_else(|| missing("elevation"))?;
    let time = waypoint.time.as_ref().ok_or_else(|| missing("time"))?;
    let point = waypoint.point();
    Ok(GeoPoint::new(point.x(), point.y(), elevation, time_of_day(time)?))
}

/// Returns the wall-clock part of a GPX timestamp, read in the
/// timestamp's own UTC offset.
fn time_of_day(time: &Time) -> Result<TimeOfDay, TrackError> {
    let iso = time
        .format()
        .map_err(|e| TrackError::InvalidTime(e.to_string()))?;
    let local = DateTime::parse_from_rfc3339(&iso).map_err(|_| TrackError::InvalidTime(iso.clone()))?;
    Ok(TimeOfDay::from(local.time()))
}
