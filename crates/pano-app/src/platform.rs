//! OS-specific directories for configuration and logs.

use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "panosphere";

/// Errors that can occur while resolving or creating platform directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where the viewer keeps its files.
///
/// Follows OS conventions via `dirs`: XDG on Linux, Known Folders on
/// Windows, `Library` on macOS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the JSON log written by debug builds.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve directories without touching the disk.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_dir =
            pano_config::default_config_dir().map_err(|_| PlatformError::NoConfigDir)?;
        let log_dir = dirs::cache_dir()
            .map(|cache| cache.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| config_dir.join("logs"));
        Ok(Self {
            config_dir,
            log_dir,
        })
    }

    /// Directories rooted under `root`, for tests and `--config` overrides.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }

    /// Create both directories. Called at startup before config and logs
    /// are written.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
