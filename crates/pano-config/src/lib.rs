//! Configuration system for the panorama viewer.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, ImageConfig, MeshConfig, ViewerConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
