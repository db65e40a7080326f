use std::{fs, path::Path};

use anyhow::Result;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,

    pub camera: CameraConfig,
    pub framing: FramingConfig,
    pub picking: PickingConfig,
    pub contour: ContourConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Multiplier applied to the largest contour dimension.
    pub contour_padding: f64,
    /// How far along the plane normal the contour camera sits.
    pub contour_distance: f64,
    pub contour_up: Vector3<f64>,
    /// Three-quarter view direction used when framing the whole scene, scaled
    /// by the fitted camera distance.
    pub scene_offset: Vector3<f64>,
    pub near: f64,
    pub far: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub marker_radius: f64,
    /// Below this cross product length the two picked points are considered
    /// parallel to the view direction.
    pub parallel_threshold: f64,
    pub world_up: Vector3<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    pub join_tolerance: f64,
}

impl Config {
    pub fn load_or_default(config_dir: &Path) -> Self {
        match Self::load(config_dir) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {}", err);
                Config::default()
            }
        }
    }

    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join(CONFIG_FILE);
        Ok(if config_file.exists() {
            let file = fs::read(&config_file)?;
            let string = String::from_utf8_lossy(&file);
            let config = toml::from_str(&string)?;
            info!("Successfully loaded config file");
            config
        } else {
            info!("No config file found, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        fs::create_dir_all(config_dir)?;

        let config_file = config_dir.join(CONFIG_FILE);
        let string = toml::to_string(self)?;
        fs::write(config_file, string)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),

            camera: CameraConfig::default(),
            framing: FramingConfig::default(),
            picking: PickingConfig::default(),
            contour: ContourConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 40.0,
            position: Vector3::new(50.0, 50.0, 100.0),
            target: Vector3::zeros(),
        }
    }
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            contour_padding: 1.2,
            contour_distance: 1000.0,
            contour_up: Vector3::x(),
            scene_offset: Vector3::new(0.5, -0.8, 0.5),
            near: 0.1,
            far: 10_000.0,
        }
    }
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            marker_radius: 0.5,
            parallel_threshold: 0.1,
            world_up: Vector3::y(),
        }
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            join_tolerance: 1e-6,
        }
    }
}
