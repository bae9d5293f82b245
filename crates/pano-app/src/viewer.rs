//! Viewer state: orbit angle, pending reloads and the texture on screen.
//!
//! [`ViewerState`] subscribes to the layer store. A layer change only marks
//! the new path as pending; the decode and upload happen on the next
//! [`tick`](ViewerState::tick), on the event loop thread.

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use glam::Vec3;
use pano_image::{DecodeOptions, DecodedImage, load_image};
use pano_layers::{LayerObserver, LayerState};
use pano_render::{TextureError, orbit_position};
use tracing::{info, warn};

/// Default orbit speed in degrees per second.
pub const DEFAULT_DEGREES_PER_SECOND: f64 = 30.0;

/// Receives decoded images and turns them into the displayed texture.
pub trait TextureSink {
    fn upload(&mut self, path: &Path, image: &DecodedImage) -> Result<(), TextureError>;
}

/// What a single tick did about the pending layer.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing was pending.
    Idle,
    /// The image at this path is now displayed.
    Reloaded(PathBuf),
    /// Loading failed; the previous texture is still displayed.
    Skipped(PathBuf, String),
}

#[derive(Debug)]
pub struct ViewerState {
    /// Radians, always in `[0, 2π)`.
    angle: f64,
    angular_velocity: f64,
    pending: Option<PathBuf>,
    active_texture: Option<PathBuf>,
    decode_options: DecodeOptions,
}

impl ViewerState {
    pub fn new(angular_velocity_rad_s: f64) -> Self {
        Self {
            angle: 0.0,
            angular_velocity: angular_velocity_rad_s,
            pending: None,
            active_texture: None,
            decode_options: DecodeOptions::default(),
        }
    }

    pub fn from_degrees_per_second(degrees_per_second: f64) -> Self {
        Self::new(degrees_per_second.to_radians())
    }

    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode_options = options;
        self
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Path of the image currently on screen, if any.
    pub fn active_texture(&self) -> Option<&Path> {
        self.active_texture.as_deref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Rotate by `elapsed` seconds worth of angular velocity.
    pub fn advance(&mut self, elapsed: f64) {
        let angle = (self.angle + elapsed * self.angular_velocity).rem_euclid(TAU);
        // rem_euclid rounds up to TAU for tiny negative inputs.
        self.angle = if angle >= TAU { 0.0 } else { angle };
    }

    pub fn take_pending(&mut self) -> Option<PathBuf> {
        self.pending.take()
    }

    /// Advance the rotation, then load the pending layer if there is one.
    pub fn tick(&mut self, elapsed: f64, sink: &mut dyn TextureSink) -> TickOutcome {
        self.advance(elapsed);

        let Some(path) = self.take_pending() else {
            return TickOutcome::Idle;
        };

        let image = match load_image(&path, &self.decode_options) {
            Ok(image) => image,
            Err(e) if e.is_missing_component() => {
                info!("Skipping {}: {e}", path.display());
                return TickOutcome::Skipped(path, e.to_string());
            }
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                return TickOutcome::Skipped(path, e.to_string());
            }
        };

        match sink.upload(&path, &image) {
            Ok(()) => {
                info!(
                    "Displaying {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
                self.active_texture = Some(path.clone());
                TickOutcome::Reloaded(path)
            }
            Err(e) => {
                warn!("Upload of {} failed: {e}", path.display());
                TickOutcome::Skipped(path, e.to_string())
            }
        }
    }

    /// Camera position on an orbit of `orbit_radius` at the current angle.
    pub fn eye_position(&self, orbit_radius: f32) -> Vec3 {
        orbit_position(self.angle as f32, orbit_radius)
    }

    pub fn status_line(&self) -> String {
        format!("rotation {:.1}°", self.angle.to_degrees())
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::from_degrees_per_second(DEFAULT_DEGREES_PER_SECOND)
    }
}

impl LayerObserver for ViewerState {
    fn on_layers_changed(&mut self, state: &LayerState) {
        if let Some(path) = &state.active {
            self.pending = Some(path.clone());
        }
    }
}
