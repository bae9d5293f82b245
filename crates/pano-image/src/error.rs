use std::path::PathBuf;

/// Errors raised while loading a panorama image.
///
/// None of these are fatal to the viewer: the caller logs them and keeps
/// whatever texture it already has.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Raster {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to decode EXR {path}: {message}")]
    Exr { path: PathBuf, message: String },

    #[error("cannot load {path}: optional component '{component}' is not available")]
    MissingComponent {
        component: &'static str,
        path: PathBuf,
    },

    #[error("cannot determine image format of {path}: no file extension")]
    UnsupportedExtension { path: PathBuf },
}

impl DecodeError {
    /// `true` for a missing optional decoder.
    pub fn is_missing_component(&self) -> bool {
        matches!(self, Self::MissingComponent { .. })
    }
}
