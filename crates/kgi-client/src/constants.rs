//! Client configuration constants.
//!
//! Centralizes the defaults the poller and tracker fall back to.

use std::time::Duration;

/// Pause between one tick's fetch completing and the next tick starting.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Share of the half-screen height count kept free to the right of the head
/// when the viewport is landscape.
pub const DEFAULT_HEAD_MARGIN_MULTIPLIER: f64 = 0.25;

/// Duration of the eased recentre after a small navigation.
pub const DEFAULT_TRANSITION_DURATION: Duration = kgi_layout::DEFAULT_TRANSITION_DURATION;

/// Viewport assumed until the first resize arrives.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;

/// See [`DEFAULT_VIEWPORT_WIDTH`].
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;
