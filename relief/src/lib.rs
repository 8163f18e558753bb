//! Digital terrain models interpolated from GPS tracks.
//!
//! Fixes from one or more tracks are pooled into a [`PointCloud`],
//! interpolated onto a regular longitude/latitude [`Grid`], and written
//! out as a GeoTIFF or ESRI ASCII raster.

mod cloud;
mod error;
mod interpolate;
mod math;
mod model;
pub mod raster;

pub use crate::{
    cloud::{LoadReport, PointCloud},
    error::ReliefError,
    interpolate::{Grid, Mesh, Method, DEFAULT_PIXEL_SIZE},
    model::{TerrainModel, DEFAULT_MODEL_NAME},
    raster::{read_ascii_grid, AsciiGrid, Raster, RasterFormat},
};
pub use gpxtrack;
