//! Wall-clock tick measurement.
//!
//! The viewer advances its rotation by the real time elapsed since the
//! previous tick rather than by a fixed step, so a late tick catches up in
//! one go. Long stalls (a slow decode, a dragged window) are clamped to
//! `viewer.max_tick_seconds` (a quarter second by default), so the orbit
//! runs slightly behind wall time after a stall instead of jumping.

use std::time::Instant;
use tracing::warn;

/// Default maximum elapsed time credited to a single tick.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Measures elapsed seconds between consecutive ticks.
pub struct TickClock {
    previous_time: Instant,
    max_frame_time: f64,
    total_time: f64,
    tick_count: u64,
}

impl TickClock {
    /// Creates a clock whose first tick measures from now.
    pub fn new() -> Self {
        Self::with_max_frame_time(MAX_FRAME_TIME)
    }

    /// Creates a clock crediting at most `max_frame_time` seconds per tick.
    /// Pass `f64::INFINITY` to credit every stall in full. Zero, negative
    /// and NaN limits fall back to [`MAX_FRAME_TIME`].
    pub fn with_max_frame_time(max_frame_time: f64) -> Self {
        let max_frame_time = if max_frame_time > 0.0 {
            max_frame_time
        } else {
            MAX_FRAME_TIME
        };
        Self {
            previous_time: Instant::now(),
            max_frame_time,
            total_time: 0.0,
            tick_count: 0,
        }
    }

    /// Returns the clamped seconds elapsed since the previous tick.
    pub fn tick(&mut self) -> f64 {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.tick_with(frame_time)
    }

    /// Tick with an explicit frame time in seconds.
    pub fn tick_with(&mut self, frame_time: f64) -> f64 {
        let frame_time = clamp_frame_time(frame_time, self.max_frame_time);
        self.total_time += frame_time;
        self.tick_count += 1;
        frame_time
    }

    /// Forget the time spent since the last tick, e.g. after a blocking load.
    pub fn reset(&mut self) {
        self.previous_time = Instant::now();
    }

    pub fn max_frame_time(&self) -> f64 {
        self.max_frame_time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Sum of all credited (clamped) frame times.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_frame_time(frame_time: f64, max_frame_time: f64) -> f64 {
    if frame_time < 0.0 || !frame_time.is_finite() {
        0.0
    } else if frame_time > max_frame_time {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            frame_time * 1000.0,
            max_frame_time * 1000.0
        );
        max_frame_time
    } else {
        frame_time
    }
}
