use clap::{Parser, Subcommand, ValueEnum};
use plotters::style::HSLColor;
use relief::{Method, RasterFormat, DEFAULT_MODEL_NAME, DEFAULT_PIXEL_SIZE};
use std::path::PathBuf;

/// Trip statistics and terrain models from GPX tracks.
#[derive(Parser, Debug)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print trip statistics of a GPX file.
    Stats {
        /// GPX file.
        file: PathBuf,

        /// Track name to report, defaults to "Hike".
        #[arg(short, long)]
        name: Option<String>,

        /// Print a single statistic.
        #[arg(long, value_enum)]
        only: Option<Stat>,

        /// Print all statistics as JSON.
        #[arg(long, default_value_t = false, conflicts_with = "only")]
        json: bool,
    },

    /// Plot elevation versus distance to terminal.
    Profile {
        /// GPX file.
        file: PathBuf,
    },

    /// Interpolate a terrain model from every GPX file in a directory.
    Terrain {
        /// Directory containing GPX files.
        dir: PathBuf,

        /// Model name, used as the output file stem.
        #[arg(short, long, default_value = DEFAULT_MODEL_NAME)]
        name: String,

        /// Grid spacing, in degrees.
        #[arg(short, long, default_value_t = DEFAULT_PIXEL_SIZE)]
        pixel_size: f64,

        /// "nearest" or "linear".
        #[arg(short, long, default_value_t = Method::Nearest, value_parser = parse_method)]
        method: Method,

        /// "geotiff" or "ascii".
        #[arg(short, long, default_value_t = RasterFormat::GeoTiff, value_parser = parse_format)]
        format: RasterFormat,

        /// Output directory, created if missing.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Also render a PNG with 2D and 3D views.
        #[arg(long, default_value_t = false)]
        image: bool,

        /// Color palette of the rendered image.
        #[arg(long, value_enum, default_value_t = Palette::Terrain)]
        palette: Palette,
    },
}

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse().map_err(|e: relief::ReliefError| e.to_string())
}

fn parse_format(s: &str) -> Result<RasterFormat, String> {
    s.parse().map_err(|e: relief::ReliefError| e.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Stat {
    Name,
    Points,
    Length2d,
    Length3d,
    MinElevation,
    MaxElevation,
    Ascent,
    Descent,
    Duration,
    Speed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Palette {
    /// Green lowlands to pale summits.
    Terrain,
    /// Blue to red.
    Heat,
    Gray,
}

impl Palette {
    /// Returns the color at `t`, clamped to `[0, 1]`.
    pub fn color(self, t: f64) -> HSLColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Palette::Terrain => HSLColor((120.0 - 95.0 * t) / 360.0, 0.55, 0.3 + 0.5 * t),
            Palette::Heat => HSLColor((240.0 - 240.0 * t) / 360.0, 0.7, 0.5),
            Palette::Gray => HSLColor(0.0, 0.0, 0.1 + 0.8 * t),
        }
    }
}
