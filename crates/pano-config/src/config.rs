//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

const APP_NAME: &str = "panosphere";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera orbit and tick settings.
    pub viewer: ViewerConfig,
    /// Sphere tessellation.
    pub mesh: MeshConfig,
    /// Image decoding settings.
    pub image: ImageConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera orbit and tick configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Orbit angular velocity in degrees per second.
    pub degrees_per_second: f32,
    /// Interval between ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Longest wall-clock gap credited to one tick, in seconds. Time beyond
    /// this is dropped rather than replayed as a jump.
    pub max_tick_seconds: f64,
    /// Distance of the camera from the sphere center.
    pub orbit_radius: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Clear color (sRGB, 0.0 - 1.0); linearised before rendering.
    pub clear_color: [f64; 3],
}

/// Latitude/longitude tessellation of the projection sphere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Number of latitude bands.
    pub nlat: u32,
    /// Number of longitude bands.
    pub nlon: u32,
    /// Sphere radius in world units.
    pub radius: f32,
}

/// Image decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Halve images taller than `halve_threshold` before upload.
    pub halve_oversized: bool,
    /// Height above which even-sized images are box-filtered down by 2x.
    pub halve_threshold: u32,
    /// Decode `.exr` files. When off, EXR drops are skipped like a missing decoder.
    pub enable_exr: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter override (e.g. "debug", "info,pano_image=trace").
    /// Empty means the built-in default filter.
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Panosphere".to_string(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            degrees_per_second: 30.0,
            tick_interval_ms: 20,
            max_tick_seconds: 0.25,
            orbit_radius: 1.0,
            fov_y_degrees: 45.0,
            clear_color: [0.0, 0.0, 150.0 / 255.0],
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            nlat: 50,
            nlon: 50,
            radius: 10.0,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            halve_oversized: true,
            halve_threshold: 2000,
            enable_exr: true,
        }
    }
}

impl ImageConfig {
    /// The halving threshold, or `None` when halving is disabled.
    pub fn effective_threshold(&self) -> Option<u32> {
        self.halve_oversized.then_some(self.halve_threshold)
    }
}

/// Resolve the default configuration directory (`<os config dir>/panosphere`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            tracing::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
