use crate::{TimeOfDay, MEAN_EARTH_RADIUS};
use geo::geometry::Coord;

/// A single recorded GPS fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude (x) and latitude (y) in degrees.
    coord: Coord<f64>,

    /// Meters.
    elevation: f64,

    time: TimeOfDay,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64, elevation: f64, time: TimeOfDay) -> Self {
        Self {
            coord: Coord {
                x: longitude,
                y: latitude,
            },
            elevation,
            time,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coord.x
    }

    pub fn latitude(&self) -> f64 {
        self.coord.y
    }

    pub fn coord(&self) -> Coord<f64> {
        self.coord
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    /// Returns the ground distance to `other` in meters.
    ///
    /// Equirectangular approximation on a spherical earth: the
    /// longitude delta is scaled by the cosine of the mean latitude of
    /// both points.
    pub fn distance_2d(&self, other: &GeoPoint) -> f64 {
        let d_lat = deg_to_rad(self.latitude() - other.latitude()) * MEAN_EARTH_RADIUS;
        let mean_lat = deg_to_rad((self.latitude() + other.latitude()) / 2.0);
        let d_lon =
            deg_to_rad(self.longitude() - other.longitude()) * MEAN_EARTH_RADIUS * mean_lat.cos();
        d_lon.hypot(d_lat)
    }

    /// Returns the distance to `other` in meters, including the
    /// elevation difference.
    pub fn distance_3d(&self, other: &GeoPoint) -> f64 {
        self.distance_2d(other)
            .hypot(self.elevation - other.elevation)
    }
}

fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, TimeOfDay};
    use approx::assert_relative_eq;

    fn point(lon: f64, lat: f64, elev: f64) -> GeoPoint {
        GeoPoint::new(lon, lat, elev, TimeOfDay::from_hms(12, 0, 0).unwrap())
    }

    #[test]
    fn test_distance_along_meridian() {
        let a = point(0.0, 0.0, 0.0);
        let b = point(0.0, 0.001, 10.0);
        let d = a.distance_2d(&b);
        assert!((d - 111.2).abs() < 1.0, "{d}");
        assert_relative_eq!(a.distance_3d(&b), d.hypot(10.0));
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(-71.308_307, 44.283_098, 1200.0);
        let b = point(-71.297_207, 44.256_281, 1900.0);
        assert_relative_eq!(a.distance_2d(&b), b.distance_2d(&a));
        assert_relative_eq!(a.distance_3d(&b), b.distance_3d(&a));
        assert_eq!(a.distance_2d(&a), 0.0);
        assert_eq!(a.distance_3d(&a), 0.0);
    }

    #[test]
    fn test_spatial_at_least_planar() {
        let points = [
            point(1.4, 43.6, 150.0),
            point(1.401, 43.6005, 150.0),
            point(1.41, 43.59, 92.5),
            point(-3.2, 60.1, 1024.0),
        ];
        for a in &points {
            for b in &points {
                assert!(a.distance_3d(b) >= a.distance_2d(b));
            }
        }
    }

    #[test]
    fn test_meridian_convergence() {
        // One degree of longitude shrinks with latitude.
        let at_equator = point(0.0, 0.0, 0.0).distance_2d(&point(1.0, 0.0, 0.0));
        let at_sixty = point(0.0, 60.0, 0.0).distance_2d(&point(1.0, 60.0, 0.0));
        assert_relative_eq!(at_sixty, at_equator * 0.5, max_relative = 1e-9);
    }
}
