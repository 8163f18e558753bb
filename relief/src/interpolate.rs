use crate::{
    math::arange,
    raster::{north_up, Raster},
    PointCloud, ReliefError,
};
use geo::geometry::{Coord, Rect};
use kiddo::{immutable::float::kdtree::ImmutableKdTree, SquaredEuclidean};
use log::debug;
use rayon::prelude::*;
use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};
use std::{fmt, str::FromStr, time::Instant};

/// Default grid spacing in degrees.
pub const DEFAULT_PIXEL_SIZE: f64 = 0.001;

/// Upper bound on grid nodes, well past any hiking-scale area.
const MAX_NODES: usize = 100_000_000;

/// How grid nodes are estimated from scattered samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Elevation of the closest sample. Defined everywhere.
    #[default]
    Nearest,
    /// Barycentric interpolation over the Delaunay triangulation of the
    /// samples. Nodes outside the convex hull are NaN.
    Linear,
}

impl FromStr for Method {
    type Err = ReliefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Method::Nearest),
            "linear" => Ok(Method::Linear),
            other => Err(ReliefError::InvalidParameter(format!(
                "unknown interpolation method {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Nearest => f.write_str("nearest"),
            Method::Linear => f.write_str("linear"),
        }
    }
}

/// A regular elevation grid covering the bounds of a [`PointCloud`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pixel_size: f64,
    method: Method,
    bounds: Rect<f64>,
    /// West to east.
    longitudes: Vec<f64>,
    /// South to north.
    latitudes: Vec<f64>,
    /// North-up.
    elevations: Raster<f64>,
}

/// Per-node coordinates of a [`Grid`], north-up like its elevations.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub longitudes: Raster<f64>,
    pub latitudes: Raster<f64>,
}

impl Grid {
    /// Estimates elevations on a `pixel_size` spaced grid spanning the
    /// bounds of `cloud`.
    pub fn interpolate(
        cloud: &PointCloud,
        pixel_size: f64,
        method: Method,
    ) -> Result<Self, ReliefError> {
        validate_pixel_size(pixel_size)?;
        let bounds = cloud.bounds();
        let longitudes = axis(bounds.min().x, bounds.max().x, pixel_size);
        let latitudes = axis(bounds.min().y, bounds.max().y, pixel_size);
        let nodes = longitudes.len().saturating_mul(latitudes.len());
        if nodes > MAX_NODES {
            return Err(ReliefError::InvalidParameter(format!(
                "pixel size {pixel_size} yields {nodes} grid nodes"
            )));
        }

        let now = Instant::now();
        let raw = match method {
            Method::Nearest => nearest(cloud, &longitudes, &latitudes),
            Method::Linear => linear(cloud, &longitudes, &latitudes)?,
        };
        debug!(
            "{method} interpolation of {} points onto {}x{} grid, took {:?}",
            cloud.len(),
            raw.rows(),
            raw.cols(),
            now.elapsed()
        );

        Ok(Self {
            pixel_size,
            method,
            bounds,
            longitudes,
            latitudes,
            elevations: north_up(&raw),
        })
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the bounds of the cloud this grid was built from.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Returns the elevation matrix, row 0 northernmost.
    pub fn elevations(&self) -> &Raster<f64> {
        &self.elevations
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        self.elevations.dimensions()
    }

    pub fn lower_left(&self) -> Coord<f64> {
        self.bounds.min()
    }

    pub fn top_left(&self) -> Coord<f64> {
        Coord {
            x: self.bounds.min().x,
            y: self.bounds.max().y,
        }
    }

    /// Returns true if any node is NaN.
    pub fn has_holes(&self) -> bool {
        self.elevations.as_slice().iter().any(|v| v.is_nan())
    }

    /// Returns the (min, max) of the defined nodes.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.elevations
            .as_slice()
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn mesh(&self) -> Mesh {
        let cols = self.longitudes.len();
        let rows = self.latitudes.len();
        let lons = self
            .latitudes
            .iter()
            .flat_map(|_| self.longitudes.iter().copied())
            .collect();
        let lats = self
            .latitudes
            .iter()
            .flat_map(|&y| std::iter::repeat(y).take(cols))
            .collect();
        Mesh {
            longitudes: north_up(&Raster::new(rows, cols, lons)),
            latitudes: north_up(&Raster::new(rows, cols, lats)),
        }
    }
}

pub(crate) fn validate_pixel_size(pixel_size: f64) -> Result<(), ReliefError> {
    if pixel_size.is_finite() && pixel_size > 0.0 {
        Ok(())
    } else {
        Err(ReliefError::InvalidParameter(format!(
            "pixel size must be positive, got {pixel_size}"
        )))
    }
}

/// Returns grid node positions along one axis. A zero-width axis gets a
/// single node.
fn axis(min: f64, max: f64, step: f64) -> Vec<f64> {
    let nodes: Vec<f64> = arange(min, max, step).collect();
    if nodes.is_empty() {
        vec![min]
    } else {
        nodes
    }
}

fn nearest(cloud: &PointCloud, longitudes: &[f64], latitudes: &[f64]) -> Raster<f64> {
    let positions: Vec<[f64; 2]> = cloud.positions().collect();
    let tree: ImmutableKdTree<f64, usize, 2, 32> = ImmutableKdTree::new_from_slice(&positions);
    let elevations = cloud.elevations();

    let data = latitudes
        .par_iter()
        .flat_map_iter(|&y| {
            let tree = &tree;
            longitudes.iter().map(move |&x| {
                let nearest = tree.nearest_one::<SquaredEuclidean>(&[x, y]);
                elevations[nearest.item]
            })
        })
        .collect();
    Raster::new(latitudes.len(), longitudes.len(), data)
}

struct Sample {
    position: Point2<f64>,
    elevation: f64,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

fn linear(
    cloud: &PointCloud,
    longitudes: &[f64],
    latitudes: &[f64],
) -> Result<Raster<f64>, ReliefError> {
    let insufficient = ReliefError::InsufficientData {
        method: Method::Linear,
        points: cloud.len(),
    };
    if cloud.len() < 3 {
        return Err(insufficient);
    }

    let samples = cloud
        .positions()
        .zip(cloud.elevations())
        .map(|([x, y], &elevation)| Sample {
            position: Point2::new(x, y),
            elevation,
        })
        .collect();
    let triangulation = DelaunayTriangulation::<Sample>::bulk_load_stable(samples)
        .map_err(|e| ReliefError::Triangulation(format!("{e:?}")))?;
    // Collinear samples triangulate to edges only.
    if triangulation.num_inner_faces() == 0 {
        return Err(insufficient);
    }

    let data = latitudes
        .par_iter()
        .flat_map_iter(|&y| {
            // Holds scratch buffers, one per row.
            let barycentric = triangulation.barycentric();
            longitudes.iter().map(move |&x| {
                barycentric
                    .interpolate(|v| v.data().elevation, Point2::new(x, y))
                    .unwrap_or(f64::NAN)
            })
        })
        .collect();
    Ok(Raster::new(latitudes.len(), longitudes.len(), data))
}

#[cfg(test)]
mod tests {
    use super::{Grid, Method};
    use crate::{PointCloud, ReliefError};
    use approx::assert_relative_eq;
    use gpxtrack::{GeoPoint, TimeOfDay, Track};

    fn cloud(samples: &[(f64, f64, f64)]) -> PointCloud {
        let time = TimeOfDay::from_hms(10, 0, 0).unwrap();
        let mut track = Track::new();
        track.extend(
            samples
                .iter()
                .map(|&(lon, lat, elev)| GeoPoint::new(lon, lat, elev, time)),
        );
        PointCloud::from_tracks([&track]).unwrap()
    }

    /// Corners of a 1 x 1 degree square, elevation rising to the north.
    fn square() -> PointCloud {
        cloud(&[
            (0.0, 0.0, 100.0),
            (1.0, 0.0, 100.0),
            (0.0, 1.0, 200.0),
            (1.0, 1.0, 200.0),
        ])
    }

    #[test]
    fn test_axes_and_dimensions() {
        let grid = Grid::interpolate(&square(), 0.25, Method::Nearest).unwrap();
        assert_eq!(grid.dimensions(), (4, 4));
        assert_eq!(grid.longitudes(), &[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(grid.latitudes(), &[0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_nearest_hits_samples() {
        let grid = Grid::interpolate(&square(), 0.25, Method::Nearest).unwrap();
        // Bottom row is last once north-up. Node (0, 0) is a sample.
        assert_relative_eq!(grid.elevations()[(3, 0)], 100.0);
        // Node (0, 0.75) is closest to the (0, 1) sample.
        assert_relative_eq!(grid.elevations()[(0, 0)], 200.0);
    }

    #[test]
    fn test_row_zero_is_north() {
        let grid = Grid::interpolate(&square(), 0.25, Method::Linear).unwrap();
        let mesh = grid.mesh();
        let (rows, cols) = grid.dimensions();
        assert_relative_eq!(mesh.latitudes[(0, 0)], 0.75);
        assert_relative_eq!(mesh.latitudes[(rows - 1, cols - 1)], 0.0);
        assert_relative_eq!(mesh.longitudes[(0, cols - 1)], 0.75);
        // Elevation rises linearly to the north.
        assert_relative_eq!(grid.elevations()[(0, 1)], 175.0, epsilon = 1e-9);
        assert_relative_eq!(grid.elevations()[(rows - 1, 2)], 100.0, epsilon = 1e-9);
        assert!(!grid.has_holes());
    }

    #[test]
    fn test_linear_outside_hull_is_nan() {
        // Triangle covering the lower-left half of the unit square.
        let cloud = cloud(&[(0.0, 0.0, 10.0), (1.0, 0.0, 20.0), (0.0, 1.0, 30.0)]);
        let grid = Grid::interpolate(&cloud, 0.25, Method::Linear).unwrap();
        assert!(grid.has_holes());
        // (0.75, 0.75) is beyond the hypotenuse.
        assert!(grid.elevations()[(0, 3)].is_nan());
        // (0.25, 0.25) is inside: 10 + 10 * 0.25 + 20 * 0.25.
        assert_relative_eq!(grid.elevations()[(2, 1)], 17.5, epsilon = 1e-9);
        let (lo, hi) = grid.elevation_range().unwrap();
        assert!(lo > 10.0 - 1e-9 && hi < 30.0 + 1e-9);
    }

    #[test]
    fn test_linear_needs_a_triangle() {
        let pair = cloud(&[(0.0, 0.0, 10.0), (1.0, 1.0, 20.0)]);
        assert!(matches!(
            Grid::interpolate(&pair, 0.1, Method::Linear),
            Err(ReliefError::InsufficientData { method: Method::Linear, points: 2 })
        ));
        let line = cloud(&[(0.0, 0.0, 10.0), (0.5, 0.5, 15.0), (1.0, 1.0, 20.0)]);
        assert!(matches!(
            Grid::interpolate(&line, 0.1, Method::Linear),
            Err(ReliefError::InsufficientData { points: 3, .. })
        ));
        // Nearest has no such requirement.
        assert!(Grid::interpolate(&pair, 0.1, Method::Nearest).is_ok());
    }

    #[test]
    fn test_single_point_is_constant() {
        let one = cloud(&[(1.44, 43.56, 152.0)]);
        let grid = Grid::interpolate(&one, 0.001, Method::Nearest).unwrap();
        assert_eq!(grid.dimensions(), (1, 1));
        assert_relative_eq!(grid.elevations()[(0, 0)], 152.0);
    }

    #[test]
    fn test_invalid_pixel_size() {
        let cloud = square();
        for pixel in [0.0, -0.001, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Grid::interpolate(&cloud, pixel, Method::Nearest),
                Err(ReliefError::InvalidParameter(_))
            ));
        }
        assert!(matches!(
            Grid::interpolate(&cloud, 1e-6, Method::Nearest),
            Err(ReliefError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("Linear".parse::<Method>().unwrap(), Method::Linear);
        assert_eq!("nearest".parse::<Method>().unwrap(), Method::Nearest);
        assert_eq!(Method::default(), Method::Nearest);
        assert!("cubic".parse::<Method>().is_err());
    }
}
