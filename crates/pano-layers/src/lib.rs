//! The active panorama layer and the drag-and-drop glue that feeds it.
//!
//! [`LayerStore`] holds at most one image path and notifies its
//! [`LayerObserver`]s synchronously whenever it changes. [`resolve_drop`]
//! turns a raw drop payload into the path to activate.

mod drop;
mod list;
mod store;

pub use drop::{DropError, DropPayload, DropTracker, resolve_drop};
pub use list::LayerList;
pub use store::{LayerObserver, LayerState, LayerStore, SharedObserver};
