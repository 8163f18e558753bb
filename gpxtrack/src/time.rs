use crate::TrackError;
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::{fmt, str::FromStr};

const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_MINUTE: f64 = 60.0;

/// Wall-clock time a fix was recorded at.
///
/// Carries no date, so two values can only be compared as instants of
/// the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hms(hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, min, sec).map(Self)
    }

    pub fn from_hms_milli(hour: u32, min: u32, sec: u32, milli: u32) -> Option<Self> {
        NaiveTime::from_hms_milli_opt(hour, min, sec, milli).map(Self)
    }

    /// Returns elapsed seconds since midnight, including the fractional
    /// part.
    pub fn seconds_from_midnight(&self) -> f64 {
        f64::from(self.0.num_seconds_from_midnight()) + f64::from(self.0.nanosecond()) * 1e-9
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl FromStr for TimeOfDay {
    type Err = TrackError;

    /// Parses `HH:MM:SS` with optional fractional seconds.
    fn from_str(s: &str) -> Result<Self, TrackError> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
            .map(Self)
            .map_err(|_| TrackError::InvalidTime(s.to_owned()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S%.f"))
    }
}

/// Signed elapsed time between two [`TimeOfDay`]s, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct TripDuration(f64);

impl TripDuration {
    pub fn between(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self(end.seconds_from_midnight() - start.seconds_from_midnight())
    }

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    pub fn as_hours(&self) -> f64 {
        self.0 / SECS_PER_HOUR
    }

    /// Splits into whole (hours, minutes, seconds).
    ///
    /// Uses floor division throughout: leftover fractional seconds are
    /// dropped, never carried, and negative durations borrow from the
    /// hour (-300 s is -1 h 55 min 0 s).
    pub fn hms(&self) -> (i64, i64, i64) {
        let secs = self.0;
        let remainder = secs.rem_euclid(SECS_PER_HOUR);
        #[allow(clippy::cast_possible_truncation)]
        let hours = (secs / SECS_PER_HOUR).floor() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let minutes = (remainder / SECS_PER_MINUTE).floor() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let seconds = remainder.rem_euclid(SECS_PER_MINUTE).floor() as i64;
        (hours, minutes, seconds)
    }
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds) = self.hms();
        write!(f, "{hours} hours {minutes} minutes {seconds} seconds")
    }
}
