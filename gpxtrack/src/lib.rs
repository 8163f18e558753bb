//! GPS tracks and the trip statistics derived from them.
//!
//! Distances use an equirectangular approximation on a spherical
//! earth, which is accurate enough at hiking scales but not across the
//! antimeridian or near the poles.

mod error;
mod point;
mod reader;
mod time;
mod track;

pub use crate::{
    error::TrackError,
    point::GeoPoint,
    time::{TimeOfDay, TripDuration},
    track::{Track, TrackMetrics, DEFAULT_TRACK_NAME},
};

/// Mean earth radius in meters.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_000.0;
