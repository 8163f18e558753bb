use crate::Method;
use gpxtrack::TrackError;
use std::path::PathBuf;
use thiserror::Error;
use tiff::TiffError;

#[derive(Error, Debug)]
pub enum ReliefError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Track(#[from] TrackError),

    #[error("no track points in {}", .0.display())]
    NoDataFound(PathBuf),

    #[error("no track points loaded")]
    NoData,

    #[error("{method} interpolation needs 3 or more non-collinear points, got {points}")]
    InsufficientData { method: Method, points: usize },

    #[error("invalid parameter, {0}")]
    InvalidParameter(String),

    #[error("triangulation failed, {0}")]
    Triangulation(String),

    #[error("{0}")]
    Tiff(#[from] TiffError),

    #[error("invalid ASCII grid, {0}")]
    AsciiGrid(String),
}
