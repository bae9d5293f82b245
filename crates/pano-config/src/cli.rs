//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Panosphere command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "panosphere", about = "360° panorama viewer")]
pub struct CliArgs {
    /// Image to display on startup (PNG, JPEG, EXR, ...).
    pub image: Option<PathBuf>,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Orbit speed in degrees per second.
    #[arg(long)]
    pub degrees_per_second: Option<f32>,

    /// Tick interval in milliseconds.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(dps) = args.degrees_per_second {
            self.viewer.degrees_per_second = dps;
        }
        if let Some(ms) = args.tick_ms {
            self.viewer.tick_interval_ms = ms.max(1);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
