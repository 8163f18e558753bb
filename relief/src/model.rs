use crate::{
    interpolate::validate_pixel_size,
    raster::{write_ascii_grid, write_geotiff, write_world_file},
    Grid, LoadReport, Method, PointCloud, RasterFormat, ReliefError, DEFAULT_PIXEL_SIZE,
};
use gpxtrack::Track;
use log::{debug, info};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Name given to terrain models that weren't explicitly named.
pub const DEFAULT_MODEL_NAME: &str = "Relief_Hike";

/// A named terrain model: a point cloud and the grid generated from
/// it.
#[derive(Debug, Clone)]
pub struct TerrainModel {
    name: String,
    pixel_size: f64,
    cloud: Option<PointCloud>,
    grid: Option<Grid>,
}

impl Default for TerrainModel {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_owned(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            cloud: None,
            grid: None,
        }
    }
}

impl TerrainModel {
    pub fn new<S: Into<String>>(name: S, pixel_size: f64) -> Result<Self, ReliefError> {
        let name = name.into();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ReliefError::InvalidParameter(format!(
                "model name {name:?} isn't a valid file stem"
            )));
        }
        validate_pixel_size(pixel_size)?;
        Ok(Self {
            name,
            pixel_size,
            cloud: None,
            grid: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid spacing in degrees.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn cloud(&self) -> Option<&PointCloud> {
        self.cloud.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Replaces the point cloud with the fixes of every GPX file in
    /// `dir`, discarding any previously generated grid.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<LoadReport, ReliefError> {
        let (cloud, report) = PointCloud::from_dir(dir)?;
        self.cloud = Some(cloud);
        self.grid = None;
        Ok(report)
    }

    /// Replaces the point cloud with the fixes of `tracks`, discarding
    /// any previously generated grid.
    pub fn load_tracks(&mut self, tracks: &[Track]) -> Result<(), ReliefError> {
        self.cloud = Some(PointCloud::from_tracks(tracks)?);
        self.grid = None;
        Ok(())
    }

    /// Interpolates the loaded cloud, replacing any previous grid.
    pub fn generate(&mut self, method: Method) -> Result<&Grid, ReliefError> {
        let cloud = self.cloud.as_ref().ok_or(ReliefError::NoData)?;
        let grid = Grid::interpolate(cloud, self.pixel_size, method)?;
        let (rows, cols) = grid.dimensions();
        info!("{}: generated {rows}x{cols} {method} grid", self.name);
        Ok(self.grid.insert(grid))
    }

    /// Writes the generated grid to `<out_dir>/<name>.<ext>` and returns
    /// that path. GeoTIFFs get a `.tfw` world file beside them.
    pub fn export<P: AsRef<Path>>(
        &self,
        format: RasterFormat,
        out_dir: P,
    ) -> Result<PathBuf, ReliefError> {
        let grid = self.grid.as_ref().ok_or(ReliefError::NoData)?;
        let path = out_dir
            .as_ref()
            .join(format!("{}.{}", self.name, format.extension()));
        let mut file = BufWriter::new(File::create(&path)?);
        match format {
            RasterFormat::Ascii => {
                write_ascii_grid(file, grid.elevations(), grid.lower_left(), grid.pixel_size())?
            }
            RasterFormat::GeoTiff => {
                write_geotiff(&mut file, grid.elevations(), grid.top_left(), grid.pixel_size())?;
                file.flush()?;
                let tfw = BufWriter::new(File::create(path.with_extension("tfw"))?);
                write_world_file(tfw, grid.top_left(), grid.pixel_size())?;
            }
        }
        debug!("wrote {path:?}");
        Ok(path)
    }
}
