//! Drag-and-drop payloads and their resolution to a local image path.

use std::path::{Path, PathBuf};

use url::Url;

/// Why a drop was rejected. The layer store is left untouched in both cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    #[error("drop carried no URLs and no text")]
    Empty,

    #[error("drop carried no local file path (entries: {entries})")]
    NoLocalPath { entries: usize },
}

/// What the windowing layer hands over on a drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropPayload {
    /// URL strings or bare paths, in drop order.
    pub urls: Vec<String>,
    /// Free-form text, consulted only when `urls` is empty.
    pub text: String,
}

impl DropPayload {
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            urls: paths
                .into_iter()
                .map(|p| p.as_ref().to_string_lossy().into_owned())
                .collect(),
            text: String::new(),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            urls: Vec::new(),
            text: text.into(),
        }
    }
}

/// Pick the first local file path in `payload`.
///
/// `file://` URLs and bare paths count as local when they name an existing
/// file; other schemes are skipped.
/// Without URLs the first non-empty line of the text is tried instead.
pub fn resolve_drop(payload: &DropPayload) -> Result<PathBuf, DropError> {
    if payload.urls.is_empty() {
        let Some(line) = payload.text.lines().map(str::trim).find(|l| !l.is_empty()) else {
            tracing::info!("Ignoring drop without URLs or text");
            return Err(DropError::Empty);
        };
        tracing::info!("Drop text: {line}");
        return local_path(line).ok_or(DropError::NoLocalPath { entries: 1 });
    }

    payload
        .urls
        .iter()
        .find_map(|entry| local_path(entry.trim()))
        .ok_or(DropError::NoLocalPath {
            entries: payload.urls.len(),
        })
}

fn local_path(entry: &str) -> Option<PathBuf> {
    let path = candidate_path(entry)?;
    if path.is_file() {
        Some(path)
    } else {
        tracing::info!("Skipping drop entry that is not an existing file: {entry}");
        None
    }
}

fn candidate_path(entry: &str) -> Option<PathBuf> {
    if entry.is_empty() {
        return None;
    }
    match Url::parse(entry) {
        Ok(url) if url.scheme() == "file" => match url.to_file_path() {
            Ok(path) if !path.as_os_str().is_empty() => Some(path),
            _ => {
                tracing::info!("Skipping file URL without a local path: {entry}");
                None
            }
        },
        // Drive letters ("C:\\pano.png") parse as a one-letter scheme.
        Ok(url) if url.scheme().len() == 1 => Some(PathBuf::from(entry)),
        Ok(url) => {
            tracing::info!("Skipping remote {} URL: {entry}", url.scheme());
            None
        }
        Err(_) => Some(PathBuf::from(entry)),
    }
}

/// Follows a file drag across winit hover/drop events.
///
/// winit reports one `DroppedFile` per file; they are batched here so the
/// whole drop resolves once, with the first valid path winning.
#[derive(Debug, Default)]
pub struct DropTracker {
    hovered: Vec<PathBuf>,
    dropped: Vec<PathBuf>,
}

impl DropTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> &[PathBuf] {
        &self.hovered
    }

    pub fn is_hovering(&self) -> bool {
        !self.hovered.is_empty()
    }

    pub fn on_hovered(&mut self, path: PathBuf) {
        tracing::info!("Drag entered with {}", path.display());
        self.hovered.push(path);
    }

    pub fn on_cancelled(&mut self) {
        tracing::debug!("Drag of {} file(s) cancelled", self.hovered.len());
        self.hovered.clear();
    }

    pub fn on_dropped(&mut self, path: PathBuf) {
        self.hovered.clear();
        self.dropped.push(path);
    }

    /// Drain the files dropped since the last call into one payload.
    pub fn take_payload(&mut self) -> Option<DropPayload> {
        if self.dropped.is_empty() {
            return None;
        }
        let paths = std::mem::take(&mut self.dropped);
        Some(DropPayload::from_paths(paths))
    }
}
