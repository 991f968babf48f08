//! Block type and its identifiers.
//!
//! A [`Block`] is immutable on identity (`id`, `block_hash`, `height`) across
//! fetches. Only the consensus-derived fields (`color`,
//! `is_in_virtual_selected_parent_chain`) may legitimately change when a later
//! fetch returns the same `id`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Cryptographic block identifier, as served by the backend (hex string).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Consensus classification of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockColor {
    /// Not yet classified (or outside any merge set seen so far).
    #[default]
    Gray,
    /// In the blue set of the block that merged it.
    Blue,
    /// In the red set of the block that merged it.
    Red,
}

impl BlockColor {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockColor::Gray => "gray",
            BlockColor::Blue => "blue",
            BlockColor::Red => "red",
        }
    }
}

impl std::fmt::Display for BlockColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One block of the DAG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Backend row id. Unique and stable across fetches.
    pub id: u64,
    pub block_hash: BlockHash,
    /// Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub parent_ids: Vec<u64>,
    pub daa_score: u64,
    pub height: u64,
    /// Position of this block among the blocks sharing its height.
    ///
    /// Only stable within one snapshot.
    pub height_group_index: u32,
    #[serde(default)]
    pub selected_parent_id: Option<u64>,
    #[serde(default)]
    pub color: BlockColor,
    #[serde(default)]
    pub is_in_virtual_selected_parent_chain: bool,
    #[serde(default)]
    pub merge_set_red_ids: Vec<u64>,
    #[serde(default)]
    pub merge_set_blue_ids: Vec<u64>,
}

impl Block {
    /// Minimal block at `height`, index 0, with a hash derived from `id`.
    ///
    /// Mostly useful for tests and synthetic sources; use the `with_*`
    /// methods to fill in the rest.
    pub fn new(id: u64, height: u64) -> Self {
        Self {
            id,
            block_hash: BlockHash::new(format!("{id:064x}")),
            timestamp: 0,
            parent_ids: Vec::new(),
            daa_score: height,
            height,
            height_group_index: 0,
            selected_parent_id: None,
            color: BlockColor::Gray,
            is_in_virtual_selected_parent_chain: false,
            merge_set_red_ids: Vec::new(),
            merge_set_blue_ids: Vec::new(),
        }
    }

    pub fn with_hash(mut self, hash: impl Into<BlockHash>) -> Self {
        self.block_hash = hash.into();
        self
    }

    pub fn with_daa_score(mut self, daa_score: u64) -> Self {
        self.daa_score = daa_score;
        self
    }

    pub fn with_color(mut self, color: BlockColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_parents(mut self, parent_ids: Vec<u64>) -> Self {
        self.selected_parent_id = parent_ids.first().copied();
        self.parent_ids = parent_ids;
        self
    }

    pub fn in_chain(mut self, in_chain: bool) -> Self {
        self.is_in_virtual_selected_parent_chain = in_chain;
        self
    }

    /// True when both blocks describe the same DAG block.
    ///
    /// `height` and `block_hash` must never change for a stable `id`.
    pub fn same_identity(&self, other: &Block) -> bool {
        self.id == other.id && self.height == other.height && self.block_hash == other.block_hash
    }

    /// Every id this block references (parents, selected parent, both
    /// merge sets), sorted and deduplicated.
    pub fn referenced_ids(&self) -> Vec<u64> {
        let mut ids = self.parent_ids.clone();
        ids.extend(&self.merge_set_red_ids);
        ids.extend(&self.merge_set_blue_ids);
        if let Some(sp) = self.selected_parent_id {
            ids.push(sp);
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
