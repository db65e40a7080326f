use std::{fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use common::config::Config;
use nalgebra::Vector2;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, Command, FrameArgs, MeasureArgs, SliceArgs};
use section::{
    camera::{Camera, Viewport},
    export::contour_svg,
    framing::ViewFramer,
    measure::Measurement,
    mesh::load_stl,
    mesh_set::MeshSet,
    plane::{Derivation, Plane},
    slicer::slice,
};

mod args;

fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = match &args.config {
        Some(dir) => dir.to_owned(),
        None => dirs::config_dir()
            .context("No config directory on this platform")?
            .join("section"),
    };
    let loaded = Config::load(&config_dir);

    let level = loaded
        .as_ref()
        .ok()
        .and_then(|x| LevelFilter::from_str(&x.log_level).ok())
        .unwrap_or(LevelFilter::INFO);
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("section", level)
        .with_target("common", level);
    let format = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();

    let config = loaded.unwrap_or_else(|err| {
        warn!("Failed to load config, using defaults: {err}");
        Config::default()
    });

    match args.command {
        Command::Slice(args) => slice_command(&config, args),
        Command::Measure(args) => measure_command(&config, args),
        Command::Frame(args) => frame_command(&config, args),
    }
}

fn load_meshes(paths: &[impl AsRef<Path>]) -> Result<MeshSet> {
    let mut meshes = MeshSet::new();
    for path in paths {
        let path = path.as_ref();
        let mut buf = BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        );
        let mesh =
            load_stl(&mut buf).with_context(|| format!("Failed to load {}", path.display()))?;

        let name = path
            .file_name()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_default();
        meshes.add(name, mesh);
    }

    let stats = meshes.stats();
    println!(
        "Loaded {} meshes. {{ vert: {}, face: {} }}",
        stats.meshes, stats.vertices, stats.triangles
    );
    Ok(meshes)
}

fn slice_command(config: &Config, args: SliceArgs) -> Result<()> {
    let meshes = load_meshes(&args.meshes)?;

    let plane = match args.points.as_slice() {
        [p1, p2] => {
            let derivation = Derivation {
                view_direction: args.view,
                world_up: config.picking.world_up,
                parallel_threshold: config.picking.parallel_threshold,
            };
            Plane::from_two_points(*p1, *p2, &derivation)?
        }
        _ => {
            let mut plane = Plane::from_axis(args.axis.into());
            plane.set_offset(args.offset);
            plane
        }
    };
    info!("Slicing with plane {plane}");

    let contour = slice(&plane, meshes.world_triangles());
    let polylines = contour.polylines(config.contour.join_tolerance);
    let closed = polylines
        .iter()
        .filter(|x| x.len() > 2 && x.first() == x.last())
        .count();

    println!("Plane: {plane}");
    println!(
        "Contour: {} segments, {} polylines ({} closed), perimeter {:.2} mm",
        contour.len(),
        polylines.len(),
        closed,
        contour.perimeter()
    );

    let framer = ViewFramer::new(config.framing.clone());
    let mut camera = Camera::default();
    if framer.frame_contour(&plane, contour.points(), &mut camera) {
        println!(
            "Contour camera: eye {:?}, target {:?}, up {:?}, {:?}",
            camera.eye.as_slice(),
            camera.target.as_slice(),
            camera.up.as_slice(),
            camera.projection
        );
    } else {
        println!("Plane doesn't cross any mesh.");
    }

    if let Some(path) = args.svg {
        svg::save(&path, &contour_svg(&contour, config.contour.join_tolerance))?;
        println!("Wrote contour to {}", path.display());
    }

    Ok(())
}

fn measure_command(config: &Config, args: MeasureArgs) -> Result<()> {
    let measurement = Measurement::from_points(&[args.from, args.to])?;

    let viewport = Viewport::new(args.width, args.height);
    let camera = Camera::from_config(&config.camera, &config.framing, viewport.aspect());
    let anchor: Vector2<f64> = measurement.anchor(&camera, &viewport);

    println!("Distance: {}", measurement.label());
    println!("Label anchor: ({:.1}, {:.1}) px", anchor.x, anchor.y);
    Ok(())
}

fn frame_command(config: &Config, args: FrameArgs) -> Result<()> {
    let meshes = load_meshes(&args.meshes)?;

    let framer = ViewFramer::new(config.framing.clone());
    let mut camera = Camera::from_config(&config.camera, &config.framing, args.aspect);
    let bounds = meshes.bounds();

    if framer.frame_scene(&bounds, &mut camera) {
        println!(
            "Bounds: {:?} to {:?}",
            bounds.min.as_slice(),
            bounds.max.as_slice()
        );
        println!(
            "Camera: eye {:?}, target {:?}",
            camera.eye.as_slice(),
            camera.target.as_slice()
        );
    } else {
        println!("Nothing to frame.");
    }

    Ok(())
}
