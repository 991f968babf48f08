//! Horizontal camera over the timeline.
//!
//! [`ViewportController`] owns the render-surface dimensions and the offset
//! that maps timeline coordinates to screen coordinates:
//!
//! ```text
//! screen = timeline + offset_at(now)
//! offset.x = width / 2 - x(target_height)
//! offset.y = height / 2
//! ```
//!
//! Small moves ease towards the new offset; anything a viewport width or more
//! away snaps, since panning across empty space shows nothing useful.
//! Both ticks and resizes funnel through one repositioning function.

use std::time::{Duration, Instant};

use kurbo::Vec2;
use tracing::trace;

use crate::geometry::{Metrics, Viewport};

/// Default duration of an eased recentre.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(500);

/// What a reposition did to the offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repositioning {
    /// Already there (or already heading there).
    Unchanged,
    /// Started an eased transition.
    Animated,
    /// Jumped straight to the new offset.
    Snapped,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    from: f64,
    to: f64,
    started_at: Instant,
    duration: Duration,
}

impl Transition {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn value_at(&self, now: Instant) -> f64 {
        let t = ease_out_cubic(self.progress(now));
        self.from + (self.to - self.from) * t
    }
}

/// `1 - (1 - t)^3`: fast start, gentle landing.
pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Owner of the viewport dimensions and the timeline offset.
#[derive(Clone, Debug)]
pub struct ViewportController {
    viewport: Viewport,
    offset_x: f64,
    transition: Option<Transition>,
    transition_duration: Duration,
    target_height: Option<u64>,
}

impl ViewportController {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_transition_duration(viewport, DEFAULT_TRANSITION_DURATION)
    }

    pub fn with_transition_duration(viewport: Viewport, transition_duration: Duration) -> Self {
        Self {
            viewport,
            offset_x: viewport.width / 2.0,
            transition: None,
            transition_duration,
            target_height: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Height last passed to [`set_target_height`](Self::set_target_height).
    pub fn target_height(&self) -> Option<u64> {
        self.target_height
    }

    /// Recentre on `height`.
    pub fn set_target_height(&mut self, height: u64, metrics: &Metrics, now: Instant) -> Repositioning {
        self.target_height = Some(height);
        self.reposition(metrics, now, false)
    }

    /// Adopt new dimensions and snap back onto the current target height.
    pub fn resize(&mut self, viewport: Viewport, metrics: &Metrics, now: Instant) -> Repositioning {
        self.viewport = viewport;
        self.reposition(metrics, now, true)
    }

    fn reposition(&mut self, metrics: &Metrics, now: Instant, force_snap: bool) -> Repositioning {
        // A landed transition leaves `offset_x` at its destination.
        if self.transition.is_some_and(|t| t.progress(now) >= 1.0) {
            self.transition = None;
        }
        let target_x = match self.target_height {
            Some(height) => self.viewport.width / 2.0 - metrics.block_x(height),
            None => self.viewport.width / 2.0,
        };
        let current_x = self.offset_x_at(now);

        let heading_there = self.transition.is_some_and(|t| t.to == target_x);
        if !force_snap && (heading_there || (self.transition.is_none() && current_x == target_x)) {
            return Repositioning::Unchanged;
        }

        let delta = target_x - current_x;
        if force_snap || delta.abs() >= self.viewport.width || self.transition_duration.is_zero() {
            self.offset_x = target_x;
            self.transition = None;
            trace!("viewport snapped to x offset {target_x:.1}");
            return Repositioning::Snapped;
        }

        self.offset_x = target_x;
        self.transition = Some(Transition {
            from: current_x,
            to: target_x,
            started_at: now,
            duration: self.transition_duration,
        });
        trace!("viewport easing {current_x:.1} -> {target_x:.1}");
        Repositioning::Animated
    }

    fn offset_x_at(&self, now: Instant) -> f64 {
        match &self.transition {
            Some(transition) => transition.value_at(now),
            None => self.offset_x,
        }
    }

    /// Offset to add to timeline coordinates at `now`.
    pub fn offset_at(&self, now: Instant) -> Vec2 {
        Vec2::new(self.offset_x_at(now), self.viewport.height / 2.0)
    }

    /// Final offset once any transition has landed.
    pub fn resting_offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.viewport.height / 2.0)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.transition.is_some_and(|t| t.progress(now) < 1.0)
    }
}
