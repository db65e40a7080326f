use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::{ArrayStorage, Const, Matrix, Scalar, U1, Vector3};
use section::plane::Axis;

#[derive(Debug, Parser)]
/// Cross sections and measurements of STL meshes.
pub struct Args {
    #[arg(long, global = true)]
    /// Directory holding config.toml. Defaults to the platform config
    /// directory.
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cut meshes with a plane and report the contour.
    Slice(SliceArgs),
    /// Measure the distance between two points.
    Measure(MeasureArgs),
    /// Print the camera that frames all meshes.
    Frame(FrameArgs),
}

#[derive(Debug, clap::Args)]
pub struct SliceArgs {
    #[arg(required = true)]
    /// Paths to .stl files.
    pub meshes: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "y")]
    /// Axis the plane is perpendicular to.
    pub axis: AxisArg,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    /// Distance of the plane from the origin along its normal, in mm.
    pub offset: f64,

    #[arg(long, num_args = 2, value_parser = vector_value_parser::<f64, 3>, allow_hyphen_values = true, conflicts_with_all = ["axis", "offset"])]
    /// Two points the plane should pass through, instead of an axis.
    pub points: Vec<Vector3<f64>>,
    #[arg(long, default_value = "0, 0, -1", value_parser = vector_value_parser::<f64, 3>, allow_hyphen_values = true, requires = "points")]
    /// Direction the viewer is looking in when picking --points.
    pub view: Vector3<f64>,

    #[arg(long)]
    /// Write the contour to this SVG file.
    pub svg: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct MeasureArgs {
    #[arg(value_parser = vector_value_parser::<f64, 3>, allow_hyphen_values = true)]
    pub from: Vector3<f64>,
    #[arg(value_parser = vector_value_parser::<f64, 3>, allow_hyphen_values = true)]
    pub to: Vector3<f64>,

    #[arg(long, default_value_t = 1920.0)]
    /// Viewport width in pixels, used to place the label.
    pub width: f64,
    #[arg(long, default_value_t = 1080.0)]
    /// Viewport height in pixels, used to place the label.
    pub height: f64,
}

#[derive(Debug, clap::Args)]
pub struct FrameArgs {
    #[arg(required = true)]
    /// Paths to .stl files.
    pub meshes: Vec<PathBuf>,

    #[arg(long, default_value_t = 16.0 / 9.0)]
    pub aspect: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(value: AxisArg) -> Self {
        match value {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

fn vector_value_parser<T, const N: usize>(
    raw: &str,
) -> Result<Matrix<T, Const<N>, U1, ArrayStorage<T, N, 1>>>
where
    T: FromStr + Scalar + Default,
    T::Err: Send + Sync + std::error::Error + 'static,
{
    let mut vec = Matrix::<T, Const<N>, U1, ArrayStorage<T, N, 1>>::from_element(T::default());

    let mut parts = raw.splitn(N, ',');
    for i in 0..N {
        let element = parts.next().context("Missing vector element")?.trim();
        vec[i] = element
            .parse()
            .context("Can't convert element from string")?;
    }

    Ok(vec)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_vectors() {
        let vec = vector_value_parser::<f64, 3>("1, -2.5,3").unwrap();
        assert_eq!(vec, Vector3::new(1.0, -2.5, 3.0));
        assert!(vector_value_parser::<f64, 3>("1, 2").is_err());
        assert!(vector_value_parser::<f64, 3>("1, a, 2").is_err());
    }

    #[test]
    fn parses_slice() {
        let args = Args::parse_from(["section", "slice", "a.stl", "--axis", "z", "--offset", "-2"]);
        let Command::Slice(slice) = args.command else {
            panic!("expected slice");
        };
        assert!(matches!(slice.axis, AxisArg::Z));
        assert_eq!(slice.offset, -2.0);
        assert!(slice.points.is_empty());
    }
}
