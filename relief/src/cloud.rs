use crate::ReliefError;
use geo::geometry::{Coord, Rect};
use gpxtrack::{Track, TrackError};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Scattered (longitude, latitude, elevation) samples pooled from one
/// or more tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
    elevations: Vec<f64>,
    bounds: Rect<f64>,
}

/// Outcome of loading a directory of GPX files.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files that contributed points, in load order.
    pub loaded: Vec<PathBuf>,
    /// Files that were discovered but failed to decode.
    pub skipped: Vec<TrackError>,
}

impl PointCloud {
    /// Pools every fix of `tracks`, in order.
    pub fn from_tracks<'a, I>(tracks: I) -> Result<Self, ReliefError>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut builder = Builder::default();
        for track in tracks {
            builder.extend(track);
        }
        builder.build().ok_or(ReliefError::NoData)
    }

    /// Pools the fixes of every `.gpx` file directly inside `dir`.
    ///
    /// Files are visited in name order. A file that fails to decode is
    /// logged and recorded in the returned [`LoadReport`] rather than
    /// aborting the load.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<(Self, LoadReport), ReliefError> {
        let dir = dir.as_ref();
        let files = gpx_files(dir)?;
        debug!("found {} GPX files in {dir:?}", files.len());

        let tracks: Vec<Result<Track, TrackError>> =
            files.par_iter().map(Track::from_gpx_file).collect();

        let mut builder = Builder::default();
        let mut report = LoadReport::default();
        for (path, track) in files.into_iter().zip(tracks) {
            match track {
                Ok(track) => {
                    builder.extend(&track);
                    report.loaded.push(path);
                }
                Err(e) => {
                    warn!("skipping {path:?}, {e}");
                    report.skipped.push(e);
                }
            }
        }

        let cloud = builder
            .build()
            .ok_or_else(|| ReliefError::NoDataFound(dir.to_owned()))?;
        info!(
            "pooled {} points from {} files",
            cloud.len(),
            report.loaded.len()
        );
        Ok((cloud, report))
    }

    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    /// Always false, an empty cloud can't be constructed.
    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    /// Returns an iterator of `[longitude, latitude]`.
    pub fn positions(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.longitudes
            .iter()
            .zip(&self.latitudes)
            .map(|(&x, &y)| [x, y])
    }

    /// Returns the smallest rectangle enclosing every sample.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn min_elevation(&self) -> f64 {
        self.elevations.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_elevation(&self) -> f64 {
        self.elevations
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Default)]
struct Builder {
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
    elevations: Vec<f64>,
}

impl Builder {
    fn extend(&mut self, track: &Track) {
        for point in track.points() {
            self.longitudes.push(point.longitude());
            self.latitudes.push(point.latitude());
            self.elevations.push(point.elevation());
        }
    }

    fn build(self) -> Option<PointCloud> {
        let fold = |vals: &[f64]| {
            vals.iter().copied().fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
        };
        let (min_x, max_x) = fold(&self.longitudes)?;
        let (min_y, max_y) = fold(&self.latitudes)?;
        let bounds = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
        Some(PointCloud {
            longitudes: self.longitudes,
            latitudes: self.latitudes,
            elevations: self.elevations,
            bounds,
        })
    }
}

/// Returns regular files directly in `dir` with a `gpx` extension (any
/// case), sorted by path.
fn gpx_files(dir: &Path) -> Result<Vec<PathBuf>, ReliefError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_gpx = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("gpx"));
        if is_gpx && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::PointCloud;
    use crate::ReliefError;
    use approx::assert_relative_eq;
    use gpxtrack::{GeoPoint, TimeOfDay, Track, TrackError};
    use std::path::PathBuf;

    fn data_dir(name: &str) -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "..", "data", name]
            .iter()
            .collect()
    }

    #[test]
    fn test_from_dir_pools_all_files() {
        let (cloud, report) = PointCloud::from_dir(data_dir("gpx")).unwrap();
        // pech_david: 6 track points + 1 waypoint, ramee: 6 track points.
        assert_eq!(cloud.len(), 13);
        assert_eq!(report.loaded.len(), 2);
        assert!(report.skipped.is_empty());
        assert!(report.loaded[0].ends_with("pech_david.gpx"));
        // Name order puts pech_david's first fix first.
        assert_relative_eq!(cloud.longitudes()[0], 1.4410);
        assert_relative_eq!(cloud.elevations()[0], 152.0);

        let bounds = cloud.bounds();
        assert_relative_eq!(bounds.min().x, 1.4380);
        assert_relative_eq!(bounds.max().x, 1.4460);
        assert_relative_eq!(bounds.min().y, 43.5600);
        assert_relative_eq!(bounds.max().y, 43.5690);
    }

    #[test]
    fn test_from_dir_skips_bad_files() {
        let (cloud, report) = PointCloud::from_dir(data_dir("partial")).unwrap();
        assert_eq!(cloud.len(), 6);
        assert_eq!(report.loaded.len(), 1);
        assert!(report.loaded[0].ends_with("ramee.gpx"));
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            &report.skipped[0],
            TrackError::Parse { path, .. } if path.ends_with("truncated.gpx")
        ));
    }

    #[test]
    fn test_from_dir_without_gpx_files() {
        let dir = data_dir("no_tracks");
        assert!(matches!(
            PointCloud::from_dir(&dir),
            Err(ReliefError::NoDataFound(p)) if p == dir
        ));
    }

    #[test]
    fn test_from_tracks() {
        let time = TimeOfDay::from_hms(8, 0, 0).unwrap();
        let mut a = Track::new();
        a.push(GeoPoint::new(2.0, 45.0, 300.0, time));
        a.push(GeoPoint::new(2.1, 45.2, 350.0, time));
        let mut b = Track::new();
        b.push(GeoPoint::new(1.9, 45.1, 280.0, time));

        let cloud = PointCloud::from_tracks([&a, &b]).unwrap();
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.positions().nth(2), Some([1.9, 45.1]));
        assert_relative_eq!(cloud.min_elevation(), 280.0);
        assert_relative_eq!(cloud.max_elevation(), 350.0);
        assert_relative_eq!(cloud.bounds().min().x, 1.9);
        assert_relative_eq!(cloud.bounds().max().y, 45.2);

        assert!(matches!(
            PointCloud::from_tracks([&Track::new()]),
            Err(ReliefError::NoData)
        ));
    }
}
