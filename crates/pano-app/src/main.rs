//! The binary entry point for the Panosphere viewer.

use clap::Parser;
use pano_app::{PlatformDirs, run_with_config};
use pano_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(dir) => Some(PlatformDirs::resolve_with_root(dir)),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => Some(dirs),
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}, using defaults");
                None
            }
        },
    };
    let dirs = dirs.and_then(|dirs| match dirs.create_dirs() {
        Ok(()) => Some(dirs),
        Err(e) => {
            eprintln!("Failed to create platform directories: {e}, using defaults");
            None
        }
    });

    let mut config = match &dirs {
        Some(dirs) => Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    pano_log::init_logging(
        dirs.as_ref().map(|d| d.log_dir.as_path()),
        cfg!(debug_assertions),
        Some(&config),
    );
    tracing::info!("Panosphere starting");
    if let Some(dirs) = &dirs {
        tracing::debug!("Config directory: {}", dirs.config_dir.display());
    }

    if let Err(e) = run_with_config(config, args.image.clone()) {
        tracing::error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
