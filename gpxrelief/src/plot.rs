#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::options::Palette;
use anyhow::Error as AnyError;
use plotters::{coord::Shift, prelude::*};
use relief::{Grid, PointCloud, ReliefError, TerrainModel};
use std::path::Path;

const WIDTH: u32 = 1600;
const HEIGHT: u32 = 720;
const LEGEND_WIDTH: u32 = 110;
const LEGEND_BANDS: u32 = 64;

/// Renders side by side 2D and 3D views of the generated grid to a PNG
/// at `path`.
pub fn render(path: &Path, model: &TerrainModel, palette: Palette) -> Result<(), AnyError> {
    let grid = model.grid().ok_or(ReliefError::NoData)?;
    let cloud = model.cloud().ok_or(ReliefError::NoData)?;
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally((WIDTH / 2) as i32);
    let (surface, legend) = right.split_horizontally((WIDTH / 2 - LEGEND_WIDTH) as i32);
    let view = View::new(grid, cloud, palette);
    draw_flat(&left, model.name(), &view, cloud)?;
    draw_surface(&surface, model.name(), &view, cloud)?;
    draw_legend(&legend, &view)?;
    root.present()?;
    Ok(())
}

struct View<'a> {
    grid: &'a Grid,
    palette: Palette,
    lo: f64,
    span: f64,
    lon: (f64, f64),
    lat: (f64, f64),
}

impl<'a> View<'a> {
    /// The color scale spans both the grid and the samples.
    fn new(grid: &'a Grid, cloud: &PointCloud, palette: Palette) -> Self {
        let (lo, hi) = grid
            .elevation_range()
            .map_or((cloud.min_elevation(), cloud.max_elevation()), |(lo, hi)| {
                (lo.min(cloud.min_elevation()), hi.max(cloud.max_elevation()))
            });
        let (rows, cols) = grid.dimensions();
        let pixel = grid.pixel_size();
        let origin = grid.lower_left();
        Self {
            grid,
            palette,
            lo,
            span: (hi - lo).max(f64::EPSILON),
            lon: (origin.x, origin.x + cols as f64 * pixel),
            lat: (origin.y, origin.y + rows as f64 * pixel),
        }
    }

    fn color(&self, elevation: f64) -> HSLColor {
        self.palette.color((elevation - self.lo) / self.span)
    }

    /// Returns the elevation of the node nearest (lon, lat), holes
    /// flattened to the lowest elevation.
    fn elevation_at(&self, lon: f64, lat: f64) -> f64 {
        let (rows, cols) = self.grid.dimensions();
        let pixel = self.grid.pixel_size();
        let col = (((lon - self.lon.0) / pixel).round().max(0.0) as usize).min(cols - 1);
        let from_south = (((lat - self.lat.0) / pixel).round().max(0.0) as usize).min(rows - 1);
        let val = self.grid.elevations()[(rows - 1 - from_south, col)];
        if val.is_nan() {
            self.lo
        } else {
            val
        }
    }
}

fn draw_flat<DB>(
    area: &DrawingArea<DB, Shift>,
    name: &str,
    view: &View<'_>,
    cloud: &PointCloud,
) -> Result<(), AnyError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(format!("2D view of {name}"), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(view.lon.0..view.lon.1, view.lat.0..view.lat.1)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .x_label_formatter(&|v| format!("{v:.3}"))
        .y_label_formatter(&|v| format!("{v:.3}"))
        .draw()?;

    let grid = view.grid;
    let pixel = grid.pixel_size();
    let rows = grid.dimensions().0;
    let cells = grid
        .elevations()
        .iter_rows()
        .enumerate()
        .flat_map(|(row, cells)| {
            let lat = grid.latitudes()[rows - 1 - row];
            cells
                .iter()
                .zip(grid.longitudes())
                .filter(|(z, _)| !z.is_nan())
                .map(move |(&z, &lon)| (lon, lat, z))
        });
    chart.draw_series(cells.map(|(lon, lat, z)| {
        Rectangle::new([(lon, lat), (lon + pixel, lat + pixel)], view.color(z).filled())
    }))?;

    chart.draw_series(
        cloud
            .positions()
            .zip(cloud.elevations())
            .map(|([x, y], &z)| Circle::new((x, y), 3, view.color(z).filled())),
    )?;
    chart.draw_series(
        cloud
            .positions()
            .map(|[x, y]| Circle::new((x, y), 3, BLACK.stroke_width(1))),
    )?;
    Ok(())
}

fn draw_surface<DB>(
    area: &DrawingArea<DB, Shift>,
    name: &str,
    view: &View<'_>,
    cloud: &PointCloud,
) -> Result<(), AnyError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(format!("3D view of {name}"), ("sans-serif", 24))
        .margin(20)
        .build_cartesian_3d(
            view.lon.0..view.lon.1,
            view.lo..view.lo + view.span,
            view.lat.0..view.lat.1,
        )?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.45;
        pb.scale = 0.8;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .x_formatter(&|v| format!("{v:.3}"))
        .z_formatter(&|v| format!("{v:.3}"))
        .draw()?;

    let grid = view.grid;
    let style = |z: &f64| view.color(*z).filled();
    chart.draw_series(
        SurfaceSeries::xoz(
            grid.longitudes().iter().copied(),
            grid.latitudes().iter().copied(),
            |lon, lat| view.elevation_at(lon, lat),
        )
        .style_func(&style),
    )?;

    // Samples sit on top of the surface, x/y/z being lon/elevation/lat.
    chart.draw_series(
        cloud
            .positions()
            .zip(cloud.elevations())
            .map(|([x, y], &z)| Circle::new((x, z, y), 3, BLACK.filled())),
    )?;
    Ok(())
}

/// Draws the elevation color bar.
fn draw_legend<DB>(area: &DrawingArea<DB, Shift>, view: &View<'_>) -> Result<(), AnyError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, view.lo..view.lo + view.span)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Elevation (m)")
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let step = view.span / f64::from(LEGEND_BANDS);
    chart.draw_series((0..LEGEND_BANDS).map(|band| {
        let z = view.lo + step * f64::from(band);
        Rectangle::new([(0.0, z), (1.0, z + step)], view.color(z + step / 2.0).filled())
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::View;
    use crate::options::Palette;
    use gpxtrack::{GeoPoint, TimeOfDay, Track};
    use relief::{Grid, Method, PointCloud};

    #[test]
    fn test_color_scale_covers_samples() {
        let time = TimeOfDay::from_hms(10, 0, 0).unwrap();
        let mut track = Track::new();
        track.push(GeoPoint::new(0.0, 0.0, 100.0, time));
        track.push(GeoPoint::new(0.01, 0.0, 200.0, time));
        track.push(GeoPoint::new(0.0, 0.01, 300.0, time));
        let cloud = PointCloud::from_tracks([&track]).unwrap();
        // No node lands on the 300 m vertex.
        let grid = Grid::interpolate(&cloud, 0.003, Method::Linear).unwrap();
        let (_, grid_hi) = grid.elevation_range().unwrap();
        assert!(grid_hi < 300.0);

        let view = View::new(&grid, &cloud, Palette::Terrain);
        assert!((view.lo - 100.0).abs() < 1e-9);
        assert!((view.lo + view.span - 300.0).abs() < 1e-9);
    }
}
