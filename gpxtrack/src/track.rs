use crate::{GeoPoint, TrackError, TripDuration};
use serde::Serialize;

/// Name given to tracks that weren't explicitly named.
pub const DEFAULT_TRACK_NAME: &str = "Hike";

/// Recording order sequence of fixes taken in one continuous pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    name: String,
    points: Vec<GeoPoint>,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    pub fn new() -> Self {
        Self::with_name(DEFAULT_TRACK_NAME)
    }

    pub fn with_name<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Appends a fix after all existing ones.
    pub fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Returns the number of fixes in this track.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Extend<GeoPoint> for Track {
    fn extend<I: IntoIterator<Item = GeoPoint>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

/// Metrics.
///
/// Each of these walks the whole sequence on every call. Use
/// [`Track::metrics`] to compute them all once.
impl Track {
    /// Returns the summed ground distance between consecutive fixes,
    /// in kilometers.
    pub fn length_2d_km(&self) -> Result<f64, TrackError> {
        self.raw_length_m(GeoPoint::distance_2d)
            .map(|meters| round2(meters / 1000.0))
    }

    /// Returns the summed 3D distance between consecutive fixes, in
    /// kilometers.
    pub fn length_3d_km(&self) -> Result<f64, TrackError> {
        self.raw_length_m(GeoPoint::distance_3d)
            .map(|meters| round2(meters / 1000.0))
    }

    pub fn min_elevation(&self) -> Result<f64, TrackError> {
        self.elevations()
            .reduce(f64::min)
            .map(round2)
            .ok_or(TrackError::EmptyTrack)
    }

    pub fn max_elevation(&self) -> Result<f64, TrackError> {
        self.elevations()
            .reduce(f64::max)
            .map(round2)
            .ok_or(TrackError::EmptyTrack)
    }

    /// Returns the cumulative elevation gain in meters.
    pub fn ascent(&self) -> Result<f64, TrackError> {
        self.summed_deltas(|delta| delta > 0.0)
    }

    /// Returns the cumulative elevation loss in meters (zero or
    /// negative).
    pub fn descent(&self) -> Result<f64, TrackError> {
        self.summed_deltas(|delta| delta < 0.0)
    }

    /// Returns the time elapsed between the first and last fix.
    ///
    /// Times are same-day wall-clock values, so a track recorded across
    /// midnight reports a negative duration.
    pub fn duration(&self) -> Result<TripDuration, TrackError> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Ok(TripDuration::between(first.time(), last.time())),
            _ => Err(TrackError::EmptyTrack),
        }
    }

    /// Returns the mean ground speed in km/h.
    pub fn average_speed_kmh(&self) -> Result<f64, TrackError> {
        let km = self.raw_length_m(GeoPoint::distance_2d)? / 1000.0;
        let duration = self.duration()?;
        if duration.as_secs() == 0.0 {
            return Err(TrackError::ZeroDuration);
        }
        Ok(round2(km / duration.as_hours()))
    }

    /// Returns (cumulative ground distance in km, elevation in m) for
    /// every fix.
    pub fn profile(&self) -> Vec<(f64, f64)> {
        let mut traveled_m = 0.0;
        let mut prev: Option<&GeoPoint> = None;
        self.points
            .iter()
            .map(|point| {
                if let Some(prev) = prev {
                    traveled_m += prev.distance_2d(point);
                }
                prev = Some(point);
                (traveled_m / 1000.0, point.elevation())
            })
            .collect()
    }

    pub fn metrics(&self) -> Result<TrackMetrics, TrackError> {
        let average_speed_kmh = match self.average_speed_kmh() {
            Ok(speed) => Some(speed),
            Err(TrackError::ZeroDuration) => None,
            Err(e) => return Err(e),
        };
        Ok(TrackMetrics {
            name: self.name.clone(),
            points: self.len(),
            length_2d_km: self.length_2d_km()?,
            length_3d_km: self.length_3d_km()?,
            min_elevation: self.min_elevation()?,
            max_elevation: self.max_elevation()?,
            ascent: self.ascent()?,
            descent: self.descent()?,
            duration: self.duration()?,
            average_speed_kmh,
        })
    }
}

/// Private API.
impl Track {
    fn elevations(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(GeoPoint::elevation)
    }

    fn raw_length_m(&self, distance: fn(&GeoPoint, &GeoPoint) -> f64) -> Result<f64, TrackError> {
        if self.points.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        Ok(self
            .points
            .windows(2)
            .map(|pair| distance(&pair[0], &pair[1]))
            .sum())
    }

    fn summed_deltas(&self, keep: impl Fn(f64) -> bool) -> Result<f64, TrackError> {
        if self.points.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        let sum: f64 = self
            .points
            .windows(2)
            .map(|pair| pair[1].elevation() - pair[0].elevation())
            .filter(|delta| keep(*delta))
            .fold(0.0, |acc, delta| acc + delta);
        Ok(round2(sum))
    }
}

/// All derived statistics of a [`Track`], computed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMetrics {
    pub name: String,
    pub points: usize,
    pub length_2d_km: f64,
    pub length_3d_km: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub ascent: f64,
    pub descent: f64,
    /// Seconds.
    pub duration: TripDuration,
    /// `None` when the first and last fix share a timestamp.
    pub average_speed_kmh: Option<f64>,
}

/// Rounds to 2 decimals, never returning negative zero.
fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0 + 0.0
}
