//! Geometry engine: pure mapping from heights and height-group slots to
//! timeline coordinates.
//!
//! The timeline's own origin is `(0, 0)` = centre of height 0. `x` grows with
//! height, `y` is zero on the horizontal centre line and stays within
//! `[-0.5, 0.5] * viewport_height`.
//!
//! ```text
//!            x(h) = h * (block_size + margin)
//!   ┌──┐        ┌──┐        ┌──┐
//!   │  │        │  │ -1     │  │ -0.5
//!   └──┘        └──┘        └──┘
//!   ┌──┐  ───▶  ┌──┐  0
//!   │  │        │  │        ┌──┐
//!   └──┘        └──┘        │  │ +0.5
//!               ┌──┐        └──┘
//!               │  │ +1
//!               └──┘
//!   size 1      size 3      size 2    (slot offsets, in rows)
//! ```
//!
//! Everything here is deterministic and stateless; [`Metrics`] only bundles
//! the values derived from one viewport so callers don't recompute them.

use kurbo::{Point, Rect, Vec2};

use crate::config::{GeometryConfig, SlotSide};

/// Size of the render surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// `floor(viewport_height / max_blocks_per_height_group)`.
pub fn block_size(viewport_height: f64, max_blocks_per_height_group: u32) -> f64 {
    if max_blocks_per_height_group == 0 {
        return 0.0;
    }
    (viewport_height / max_blocks_per_height_group as f64).floor().max(0.0)
}

/// Horizontal gap between consecutive heights.
pub fn margin(block_size: f64, margin_multiplier: f64) -> f64 {
    block_size * margin_multiplier
}

/// Horizontal centre of every block at `height`.
pub fn block_x(height: u64, block_size: f64, margin: f64) -> f64 {
    height as f64 * (block_size + margin)
}

/// Slot offset of a block within its height group, in rows from the centre.
///
/// Odd groups use the integer slots `0, -1, +1, -2, +2, ...`; even groups
/// shift every index up by one and drop the centre slot, giving
/// `-0.5, +0.5, -1.5, +1.5, ...`. Odd offset indexes land on `first_side`,
/// even ones on the other side. This ordering is what keeps re-renders
/// visually stable and must not change.
pub fn slot_offset(height_group_index: u32, group_size: u32, first_side: SlotSide) -> f64 {
    if group_size <= 1 {
        return 0.0;
    }
    let is_even_group = group_size % 2 == 0;
    let offset_index = if is_even_group {
        height_group_index + 1
    } else {
        height_group_index
    };
    if offset_index == 0 {
        return 0.0;
    }

    let mut magnitude = offset_index.div_ceil(2) as f64;
    if is_even_group {
        magnitude -= 0.5;
    }
    let sign = if offset_index % 2 == 1 {
        first_side.sign()
    } else {
        -first_side.sign()
    };
    sign * magnitude
}

/// Vertical centre of a block, relative to the timeline's centre line.
///
/// The viewport is split into `group_size` equal rows and each block sits in
/// the middle of the row its [`slot_offset`] picks.
pub fn block_y(
    height_group_index: u32,
    group_size: u32,
    viewport_height: f64,
    first_side: SlotSide,
) -> f64 {
    if group_size <= 1 {
        return 0.0;
    }
    let row_height = viewport_height / group_size as f64;
    slot_offset(height_group_index, group_size, first_side) * row_height
}

/// How many heights fit between the viewport's centre and one of its edges.
pub fn max_blocks_on_half_screen(viewport_width: f64, block_size: f64, margin: f64) -> u64 {
    let step = block_size + margin;
    if step <= 0.0 || viewport_width <= 0.0 {
        return 0;
    }
    ((viewport_width / step) / 2.0).ceil() as u64
}

/// Inclusive range of heights that must be fetched to fill the viewport
/// around `target_height`, plus `padding` on both sides.
pub fn visible_height_range(
    target_height: u64,
    viewport_width: f64,
    block_size: f64,
    margin: f64,
    padding: u64,
) -> (u64, u64) {
    let half = max_blocks_on_half_screen(viewport_width, block_size, margin) + padding;
    (target_height.saturating_sub(half), target_height.saturating_add(half))
}

/// Point where `vector`, starting at a block's centre, leaves the block's
/// rounded-square outline. Returned relative to the block centre.
///
/// The outline has half-size `s = block_size / 2` and corner radius `r`; the
/// corner arcs are centred at `(±m, ±m)` with `m = s - r`. Working in the
/// first quadrant with `t = tan(α) = |y| / |x|`:
/// - `t * s <= m`: the vector exits through the vertical side at `x = s`;
/// - `t * m >= s`: it exits through the horizontal side at `y = s`;
/// - otherwise it crosses the corner arc: solve `(u - m)² + (u·t - m)² = r²`
///   for the outer root `u`, the exit point is `(u, u·t)`.
pub fn block_bounds_point(vector: Vec2, block_size: f64, corner_radius: f64) -> Vec2 {
    let half = block_size / 2.0;
    if vector.x == 0.0 && vector.y == 0.0 {
        return Vec2::ZERO;
    }
    if vector.x == 0.0 {
        return Vec2::new(0.0, half.copysign(vector.y));
    }

    let radius = corner_radius.clamp(0.0, half);
    let m = half - radius;
    let t = vector.y.abs() / vector.x.abs();

    let (px, py) = if t * half <= m {
        (half, half * t)
    } else if t * m >= half {
        (half / t, half)
    } else {
        let a = 1.0 + t * t;
        let b = -2.0 * m * (1.0 + t);
        let c = 2.0 * m * m - radius * radius;
        let discriminant = (b * b - 4.0 * a * c).max(0.0);
        let u = (-b + discriminant.sqrt()) / (2.0 * a);
        (u, u * t)
    };

    Vec2::new(px.copysign(vector.x), py.copysign(vector.y))
}

/// Arrow endpoints for an edge between two block centres: the start sits on
/// the source block's outline, the end on the target block's outline.
pub fn edge_endpoints(
    from_center: Point,
    to_center: Point,
    block_size: f64,
    corner_radius: f64,
) -> (Point, Point) {
    let vector = to_center - from_center;
    if vector.x == 0.0 && vector.y == 0.0 {
        return (from_center, to_center);
    }
    let start = from_center + block_bounds_point(vector, block_size, corner_radius);
    let end = to_center + block_bounds_point(-vector, block_size, corner_radius);
    (start, end)
}

/// Clickable column behind a height label: one step wide, full viewport tall.
pub fn height_label_bounds(height: u64, block_size: f64, margin: f64, viewport_height: f64) -> Rect {
    let step = block_size + margin;
    let x0 = block_x(height, block_size, margin) - step / 2.0;
    Rect::new(x0, -viewport_height / 2.0, x0 + step, viewport_height / 2.0)
}

/// Values derived from one viewport under one [`GeometryConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub viewport: Viewport,
    pub block_size: f64,
    pub margin: f64,
    pub corner_radius: f64,
    pub padding: u64,
    pub first_slot_side: SlotSide,
}

impl Metrics {
    pub fn new(config: &GeometryConfig, viewport: Viewport) -> Self {
        let block_size = block_size(viewport.height, config.max_blocks_per_height_group);
        Self {
            viewport,
            block_size,
            margin: margin(block_size, config.margin_multiplier),
            corner_radius: block_size * config.corner_radius_multiplier,
            padding: config.visible_height_padding,
            first_slot_side: config.first_slot_side,
        }
    }

    /// Distance between two consecutive heights.
    pub fn step(&self) -> f64 {
        self.block_size + self.margin
    }

    pub fn block_x(&self, height: u64) -> f64 {
        block_x(height, self.block_size, self.margin)
    }

    pub fn block_y(&self, height_group_index: u32, group_size: u32) -> f64 {
        block_y(
            height_group_index,
            group_size,
            self.viewport.height,
            self.first_slot_side,
        )
    }

    pub fn block_center(&self, height: u64, height_group_index: u32, group_size: u32) -> Point {
        Point::new(self.block_x(height), self.block_y(height_group_index, group_size))
    }

    pub fn max_blocks_on_half_screen(&self) -> u64 {
        max_blocks_on_half_screen(self.viewport.width, self.block_size, self.margin)
    }

    pub fn visible_height_range(&self, target_height: u64) -> (u64, u64) {
        visible_height_range(
            target_height,
            self.viewport.width,
            self.block_size,
            self.margin,
            self.padding,
        )
    }

    pub fn edge_endpoints(&self, from_center: Point, to_center: Point) -> (Point, Point) {
        edge_endpoints(from_center, to_center, self.block_size, self.corner_radius)
    }

    pub fn height_label_bounds(&self, height: u64) -> Rect {
        height_label_bounds(height, self.block_size, self.margin, self.viewport.height)
    }
}
