//! Text rendering of the layer list.

use crate::store::{LayerObserver, LayerState};

/// Observer that keeps the displayed layer list as lines of text.
#[derive(Debug, Default)]
pub struct LayerList {
    lines: Vec<String>,
    changes: u64,
}

impl LayerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// One line per layer: the file name, or the full path if it has none.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of updates received so far.
    pub fn changes(&self) -> u64 {
        self.changes
    }

    /// Window title showing the layer list after `base`.
    pub fn title(&self, base: &str) -> String {
        if self.lines.is_empty() {
            base.to_string()
        } else {
            format!("{base} - {}", self.lines.join(", "))
        }
    }
}

impl LayerObserver for LayerList {
    fn on_layers_changed(&mut self, state: &LayerState) {
        self.lines = state
            .paths()
            .iter()
            .map(|p| match p.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => p.display().to_string(),
            })
            .collect();
        self.changes += 1;
        tracing::debug!("Layer list: {:?}", self.lines);
    }
}
