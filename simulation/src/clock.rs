//! Converts wall-clock frame time into simulated time.

use std::time::Duration;

/// Slowest speed multiplier.
pub const MIN_SPEED: u32 = 1;
/// Fastest speed multiplier.
pub const MAX_SPEED: u32 = 10;

/// Clamps frame deltas and applies the speed multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FrameClock {
    max_frame_dt: Duration,
    speed: u32,
}

impl FrameClock {
    pub(crate) fn new(max_frame_dt: Duration) -> Self {
        Self {
            max_frame_dt,
            speed: MIN_SPEED,
        }
    }

    pub(crate) fn speed(&self) -> u32 {
        self.speed
    }

    /// Stores the multiplier clamped into the supported range and returns it.
    pub(crate) fn set_speed(&mut self, speed: u32) -> u32 {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.speed
    }

    /// Simulated time covered by a frame that took `frame_dt`.
    pub(crate) fn scale(&self, frame_dt: Duration) -> Duration {
        frame_dt.min(self.max_frame_dt) * self.speed
    }
}
