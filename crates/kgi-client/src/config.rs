//! Poller configuration.

use std::time::Duration;

use kgi_layout::{GeometryConfig, Viewport};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HEAD_MARGIN_MULTIPLIER, DEFAULT_TICK_INTERVAL, DEFAULT_TRANSITION_DURATION,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};

/// Everything [`spawn_timeline`](crate::spawn_timeline) needs besides its
/// data source.
///
/// Durations are stored in milliseconds so config files stay readable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub geometry: GeometryConfig,
    pub tick_interval_ms: u64,
    pub head_margin_multiplier: f64,
    pub transition_duration_ms: u64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            head_margin_multiplier: DEFAULT_HEAD_MARGIN_MULTIPLIER,
            transition_duration_ms: DEFAULT_TRANSITION_DURATION.as_millis() as u64,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl TimelineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }
}
