//! Row-major elevation matrices and their on-disk encodings.

mod ascii;
mod geotiff;

pub use self::{
    ascii::{read_ascii_grid, write_ascii_grid, AsciiGrid, NODATA_VALUE},
    geotiff::{write_geotiff, write_world_file},
};

use crate::ReliefError;
use std::{fmt, ops::Index, slice::Chunks, str::FromStr};

/// A `rows` x `cols` matrix stored row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T = f64> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Raster<T> {
    /// # Panics
    ///
    /// Panics if `data` doesn't hold exactly `rows * cols` cells.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), rows * cols, "raster has {rows}x{cols} cells");
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Returns an iterator over rows, first row first.
    pub fn iter_rows(&self) -> Chunks<'_, T> {
        self.data.chunks(self.cols.max(1))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<(usize, usize)> for Raster<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(col < self.cols, "column {col} out of {}", self.cols);
        &self.data[row * self.cols + col]
    }
}

/// Returns `raster` with its rows in reverse order.
///
/// Interpolation fills rows from the southernmost latitude upward;
/// raster files and plots expect the northernmost row first.
pub fn north_up<T: Clone>(raster: &Raster<T>) -> Raster<T> {
    let data = raster
        .iter_rows()
        .rev()
        .flat_map(|row| row.iter().cloned())
        .collect();
    Raster::new(raster.rows, raster.cols, data)
}

/// Raster file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterFormat {
    /// Single band 64-bit float GeoTIFF.
    #[default]
    GeoTiff,
    /// ESRI ASCII grid.
    Ascii,
}

impl RasterFormat {
    /// Returns the file extension, without a leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::GeoTiff => "tif",
            RasterFormat::Ascii => "asc",
        }
    }
}

impl FromStr for RasterFormat {
    type Err = ReliefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geotiff" | "tif" | "tiff" => Ok(RasterFormat::GeoTiff),
            "ascii" | "asc" => Ok(RasterFormat::Ascii),
            other => Err(ReliefError::InvalidParameter(format!(
                "unknown raster format {other:?}"
            ))),
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterFormat::GeoTiff => f.write_str("geotiff"),
            RasterFormat::Ascii => f.write_str("ascii"),
        }
    }
}
