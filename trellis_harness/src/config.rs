// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driver configuration.

use std::time::Duration;

use trellis_core::{Color, Size};

/// Settings for a [`HeadlessDriver`](crate::HeadlessDriver).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverConfig {
    /// Size of the screen and of the window root, in pixels.
    pub screen: Size,
    /// Frame-rate cap for [`run_until_exit`](crate::HeadlessDriver::run_until_exit).
    /// `None` runs frames back to back.
    pub fps: Option<u32>,
    /// Color the screen starts out as.
    pub clear: Color,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            screen: Size::new(640.0, 480.0),
            fps: Some(60),
            clear: Color::BLACK,
        }
    }
}

impl DriverConfig {
    /// An unthrottled configuration with the given screen size, for tests
    /// and offline runs.
    #[must_use]
    pub fn headless(width: f64, height: f64) -> Self {
        Self {
            screen: Size::new(width, height),
            fps: None,
            ..Self::default()
        }
    }

    /// Time budget of one frame, if throttled.
    #[must_use]
    pub fn frame_interval(&self) -> Option<Duration> {
        self.fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs(1) / fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_fps_budget() {
        let interval = DriverConfig::default().frame_interval().unwrap();
        assert_eq!(interval.as_micros(), 16_666);
    }

    #[test]
    fn zero_or_no_fps_is_unthrottled() {
        assert_eq!(DriverConfig::headless(1.0, 1.0).frame_interval(), None);
        let zero = DriverConfig {
            fps: Some(0),
            ..DriverConfig::default()
        };
        assert_eq!(zero.frame_interval(), None);
    }
}
