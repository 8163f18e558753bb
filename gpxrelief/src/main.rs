mod options;
mod plot;

use anyhow::Error as AnyError;
use clap::Parser;
use gpxtrack::{Track, TrackMetrics};
use log::info;
use options::{Cli, Command as CliCmd, Stat};
use relief::TerrainModel;
use std::{fs, io::Write, path::Path};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let Cli { cmd } = Cli::parse();

    env_logger::init();

    match cmd {
        CliCmd::Stats {
            file,
            name,
            only,
            json,
        } => stats(&file, name, only, json),
        CliCmd::Profile { file } => profile(&file),
        CliCmd::Terrain {
            dir,
            name,
            pixel_size,
            method,
            format,
            out_dir,
            image,
            palette,
        } => {
            let mut model = TerrainModel::new(name, pixel_size)?;
            let report = model.load_dir(&dir)?;
            for skipped in &report.skipped {
                eprintln!("warning: {skipped}");
            }
            let (rows, cols) = model.generate(method)?.dimensions();
            fs::create_dir_all(&out_dir)?;
            let raster = model.export(format, &out_dir)?;
            println!(
                "{rows}x{cols} {method} grid from {} files written to {}",
                report.loaded.len(),
                raster.display()
            );
            if image {
                let png = out_dir.join(format!("{}.png", model.name()));
                plot::render(&png, &model, palette)?;
                println!("image written to {}", png.display());
            }
            Ok(())
        }
    }
}

fn load(file: &Path) -> Result<Track, AnyError> {
    let track = Track::from_gpx_file(file)?;
    info!("{} fixes in {file:?}", track.len());
    Ok(track)
}

fn stats(file: &Path, name: Option<String>, only: Option<Stat>, json: bool) -> Result<(), AnyError> {
    let mut track = load(file)?;
    if let Some(name) = name {
        track.set_name(name);
    }
    let metrics = track.metrics()?;

    if json {
        println!("{}", serde_json::to_string(&metrics)?);
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    match only {
        Some(stat) => writeln!(stdout, "{}", stat_line(&metrics, stat))?,
        None => {
            for stat in [
                Stat::Name,
                Stat::Points,
                Stat::Length2d,
                Stat::Length3d,
                Stat::MinElevation,
                Stat::MaxElevation,
                Stat::Ascent,
                Stat::Descent,
                Stat::Duration,
                Stat::Speed,
            ] {
                writeln!(stdout, "{}", stat_line(&metrics, stat))?;
            }
        }
    }
    Ok(())
}

fn stat_line(metrics: &TrackMetrics, stat: Stat) -> String {
    match stat {
        Stat::Name => format!("Track name : {}", metrics.name),
        Stat::Points => format!("Number of points : {}", metrics.points),
        Stat::Length2d => format!("2D length : {} km", metrics.length_2d_km),
        Stat::Length3d => format!("3D length : {} km", metrics.length_3d_km),
        Stat::MinElevation => format!("Minimum elevation : {} m", metrics.min_elevation),
        Stat::MaxElevation => format!("Maximum elevation : {} m", metrics.max_elevation),
        Stat::Ascent => format!("Ascent : {} m", metrics.ascent),
        Stat::Descent => format!("Descent : {} m", metrics.descent),
        Stat::Duration => format!("Duration : {}", metrics.duration),
        Stat::Speed => match metrics.average_speed_kmh {
            Some(speed) => format!("Average speed : {speed} km/h"),
            None => "Average speed : undefined, zero duration".to_owned(),
        },
    }
}

fn profile(file: &Path) -> Result<(), AnyError> {
    let track = load(file)?;
    #[allow(clippy::cast_possible_truncation)]
    let plot_data: Vec<(f32, f32)> = track
        .profile()
        .into_iter()
        .map(|(km, elev)| (km as f32, elev as f32))
        .collect();
    let max_km = plot_data
        .last()
        .map_or(0.0, |(km, _)| *km)
        .max(f32::EPSILON);
    Chart::new(200, 80, 0.0, max_km)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
    Ok(())
}
