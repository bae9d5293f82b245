//! Single-slot layer store with synchronous observer notification.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Snapshot of the store handed to observers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerState {
    /// The active image, if any.
    pub active: Option<PathBuf>,
}

impl LayerState {
    /// The layer list as shown to the user: zero or one entries.
    pub fn paths(&self) -> &[PathBuf] {
        self.active.as_slice()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

/// Receives the updated layer list after every change.
pub trait LayerObserver {
    fn on_layers_changed(&mut self, state: &LayerState);
}

/// Observers are shared with the rest of the app on a single thread.
pub type SharedObserver = Rc<RefCell<dyn LayerObserver>>;

/// Holds the one active layer path.
///
/// Setting a path replaces the previous one; there is no history and no
/// queueing. Observers run in registration order before
/// [`set_active_path`](LayerStore::set_active_path) returns.
#[derive(Default)]
pub struct LayerStore {
    state: LayerState,
    observers: Vec<SharedObserver>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Returns its position in the notification order.
    pub fn subscribe(&mut self, observer: SharedObserver) -> usize {
        self.observers.push(observer);
        self.observers.len() - 1
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.state.active.as_deref()
    }

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    /// Replace the active layer and notify every observer once.
    pub fn set_active_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::info!("Active layer set to {}", path.display());
        self.state.active = Some(path);

        for (index, observer) in self.observers.iter().enumerate() {
            match observer.try_borrow_mut() {
                Ok(mut observer) => observer.on_layers_changed(&self.state),
                // Re-entrant call from inside an observer.
                Err(_) => tracing::warn!("Layer observer {index} is busy, notification skipped"),
            }
        }
    }
}
