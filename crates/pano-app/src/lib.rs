//! Panosphere viewer: tick clock, viewer state and the winit application.

pub mod clock;
pub mod platform;
pub mod viewer;
pub mod window;

pub use clock::{MAX_FRAME_TIME, TickClock};
pub use platform::{PlatformDirs, PlatformError};
pub use viewer::{DEFAULT_DEGREES_PER_SECOND, TextureSink, TickOutcome, ViewerState};
pub use window::{AppState, is_quit_key, run_with_config, window_attributes_from_config};
