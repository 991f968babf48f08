//! Layout configuration.
//!
//! Passed into [`TimelineStore`](crate::TimelineStore) at construction; there
//! is no process-wide layout state.

use serde::{Deserialize, Serialize};

/// Default number of blocks that must fit in one vertical stack.
pub const DEFAULT_MAX_BLOCKS_PER_HEIGHT_GROUP: u32 = 12;

/// Default horizontal gap between heights, as a multiple of the block size.
pub const DEFAULT_MARGIN_MULTIPLIER: f64 = 2.0;

/// Default number of extra heights fetched beyond each viewport edge.
pub const DEFAULT_VISIBLE_HEIGHT_PADDING: u64 = 2;

/// Default block corner radius, as a multiple of the block size.
pub const DEFAULT_CORNER_RADIUS_MULTIPLIER: f64 = 0.2;

/// Which side of the centre line the first off-centre slot of a height group
/// lands on. Subsequent slots alternate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSide {
    /// Negative y (towards the top of the screen).
    #[default]
    Above,
    /// Positive y.
    Below,
}

impl SlotSide {
    /// Sign applied to slots with an odd offset index.
    pub fn sign(self) -> f64 {
        match self {
            SlotSide::Above => -1.0,
            SlotSide::Below => 1.0,
        }
    }
}

/// What the per-height column label shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    #[default]
    Height,
    /// Smallest DAA score among the blocks at that height.
    DaaScore,
}

/// Constants the geometry engine reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub max_blocks_per_height_group: u32,
    pub margin_multiplier: f64,
    pub visible_height_padding: u64,
    pub corner_radius_multiplier: f64,
    pub first_slot_side: SlotSide,
    pub label_mode: LabelMode,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            max_blocks_per_height_group: DEFAULT_MAX_BLOCKS_PER_HEIGHT_GROUP,
            margin_multiplier: DEFAULT_MARGIN_MULTIPLIER,
            visible_height_padding: DEFAULT_VISIBLE_HEIGHT_PADDING,
            corner_radius_multiplier: DEFAULT_CORNER_RADIUS_MULTIPLIER,
            first_slot_side: SlotSide::Above,
            label_mode: LabelMode::Height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config: GeometryConfig =
            ron::from_str("(max_blocks_per_height_group: 8, first_slot_side: below)").unwrap();
        assert_eq!(config.max_blocks_per_height_group, 8);
        assert_eq!(config.first_slot_side, SlotSide::Below);
        assert_eq!(config.margin_multiplier, DEFAULT_MARGIN_MULTIPLIER);
        assert_eq!(config.label_mode, LabelMode::Height);
    }
}
