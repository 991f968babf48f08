//! Edges, height groups, and the [`Snapshot`] that carries them.
//!
//! A snapshot is the atomic unit of every fetch. [`Snapshot::validate`]
//! checks the cross-references the layout depends on; a snapshot that fails
//! is rejected in full rather than partially applied.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::Block;

/// Ordered `(from, to)` identity of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub from: u64,
    pub to: u64,
}

impl EdgeKey {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    pub fn touches(&self, block_id: u64) -> bool {
        self.from == block_id || self.to == block_id
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Link from a child block to one of its parents.
///
/// Both endpoints' height and height-group index are copied in so the edge can
/// be positioned without looking its blocks up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from_block_id: u64,
    pub to_block_id: u64,
    pub from_height: u64,
    pub to_height: u64,
    pub from_height_group_index: u32,
    pub to_height_group_index: u32,
}

impl Edge {
    /// Edge between two blocks, denormalizing their positions.
    pub fn between(from: &Block, to: &Block) -> Self {
        Self {
            from_block_id: from.id,
            to_block_id: to.id,
            from_height: from.height,
            to_height: to.height,
            from_height_group_index: from.height_group_index,
            to_height_group_index: to.height_group_index,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from_block_id, self.to_block_id)
    }
}

/// Number of blocks sharing one height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightGroup {
    pub height: u64,
    pub size: u32,
}

impl HeightGroup {
    pub fn new(height: u64, size: u32) -> Self {
        Self { height, size }
    }
}

/// Errors that make a snapshot unusable for layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A block or edge references a height with no height group.
    #[error("no height group for height {height}")]
    MissingHeightGroup { height: u64 },

    /// A block claims a slot outside its height group.
    #[error("block {block_id} has height-group index {index} but group size is {size}")]
    HeightGroupIndexOutOfRange { block_id: u64, index: u32, size: u32 },

    /// The same block id appears twice.
    #[error("duplicate block {0}")]
    DuplicateBlock(u64),

    /// The same `(from, to)` pair appears twice.
    #[error("duplicate edge {0}")]
    DuplicateEdge(EdgeKey),

    /// The same height appears twice in the height-group list.
    #[error("duplicate height group {0}")]
    DuplicateHeightGroup(u64),

    /// A live block came back with a different height or hash.
    #[error("block {block_id} changed identity (height or hash) between fetches")]
    IdentityChanged { block_id: u64 },
}

/// Blocks, edges and height groups returned by one fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub height_groups: Vec<HeightGroup>,
}

impl Snapshot {
    pub fn new(blocks: Vec<Block>, edges: Vec<Edge>, height_groups: Vec<HeightGroup>) -> Self {
        Self {
            blocks,
            edges,
            height_groups,
        }
    }

    /// Build a snapshot from blocks alone.
    ///
    /// Height-group indexes are assigned in the order blocks appear, height
    /// groups are counted, and one edge is emitted per parent that is present
    /// in `blocks`. Used by synthetic sources and tests.
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        let mut sizes: std::collections::BTreeMap<u64, u32> = std::collections::BTreeMap::new();
        for block in &mut blocks {
            let size = sizes.entry(block.height).or_insert(0);
            block.height_group_index = *size;
            *size += 1;
        }

        let mut edges = Vec::new();
        for block in &blocks {
            for parent_id in &block.parent_ids {
                if let Some(parent) = blocks.iter().find(|b| b.id == *parent_id) {
                    edges.push(Edge::between(block, parent));
                }
            }
        }

        let height_groups = sizes
            .into_iter()
            .map(|(height, size)| HeightGroup::new(height, size))
            .collect();

        Self {
            blocks,
            edges,
            height_groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.edges.is_empty() && self.height_groups.is_empty()
    }

    /// Highest block height in the snapshot.
    pub fn max_height(&self) -> Option<u64> {
        self.blocks.iter().map(|b| b.height).max()
    }

    pub fn find_by_hash(&self, hash: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_hash.as_str() == hash)
    }

    pub fn find_by_daa_score(&self, daa_score: u64) -> Option<&Block> {
        self.blocks.iter().find(|b| b.daa_score == daa_score)
    }

    pub fn height_group(&self, height: u64) -> Option<&HeightGroup> {
        self.height_groups.iter().find(|g| g.height == height)
    }

    /// Check every cross-reference the layout relies on.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut sizes = std::collections::HashMap::with_capacity(self.height_groups.len());
        for group in &self.height_groups {
            if sizes.insert(group.height, group.size).is_some() {
                return Err(SnapshotError::DuplicateHeightGroup(group.height));
            }
        }

        let mut block_ids = HashSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !block_ids.insert(block.id) {
                return Err(SnapshotError::DuplicateBlock(block.id));
            }
            let Some(&size) = sizes.get(&block.height) else {
                return Err(SnapshotError::MissingHeightGroup {
                    height: block.height,
                });
            };
            if block.height_group_index >= size {
                return Err(SnapshotError::HeightGroupIndexOutOfRange {
                    block_id: block.id,
                    index: block.height_group_index,
                    size,
                });
            }
        }

        let mut edge_keys = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_keys.insert(edge.key()) {
                return Err(SnapshotError::DuplicateEdge(edge.key()));
            }
            for height in [edge.from_height, edge.to_height] {
                if !sizes.contains_key(&height) {
                    return Err(SnapshotError::MissingHeightGroup { height });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_block_snapshot() -> Snapshot {
        Snapshot::from_blocks(vec![Block::new(0, 0), Block::new(1, 1).with_parents(vec![0])])
    }

    #[test]
    fn test_from_blocks_counts_groups_and_edges() {
        let snap = Snapshot::from_blocks(vec![
            Block::new(0, 0),
            Block::new(1, 1).with_parents(vec![0]),
            Block::new(2, 1).with_parents(vec![0]),
            Block::new(3, 2).with_parents(vec![1, 2, 99]),
        ]);

        assert_eq!(
            snap.height_groups,
            vec![HeightGroup::new(0, 1), HeightGroup::new(1, 2), HeightGroup::new(2, 1)]
        );
        assert_eq!(snap.blocks[2].height_group_index, 1);
        // Parent 99 is not in the set, so no edge for it.
        let keys: Vec<_> = snap.edges.iter().map(Edge::key).collect();
        assert_eq!(
            keys,
            vec![EdgeKey::new(1, 0), EdgeKey::new(2, 0), EdgeKey::new(3, 1), EdgeKey::new(3, 2)]
        );
        assert_eq!(snap.edges[3].from_height_group_index, 0);
        assert_eq!(snap.edges[3].to_height_group_index, 1);
        snap.validate().unwrap();
    }

    #[test]
    fn test_validate_missing_height_group_for_block() {
        let mut snap = two_block_snapshot();
        snap.height_groups.retain(|g| g.height != 1);
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::MissingHeightGroup { height: 1 })
        );
    }

    #[test]
    fn test_validate_missing_height_group_for_edge() {
        let mut snap = two_block_snapshot();
        snap.edges.push(Edge {
            from_block_id: 1,
            to_block_id: 50,
            from_height: 1,
            to_height: 50,
            from_height_group_index: 0,
            to_height_group_index: 0,
        });
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::MissingHeightGroup { height: 50 })
        );
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let mut snap = two_block_snapshot();
        snap.blocks[1].height_group_index = 1;
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::HeightGroupIndexOutOfRange {
                block_id: 1,
                index: 1,
                size: 1
            })
        );
    }

    #[test]
    fn test_validate_duplicates() {
        let mut snap = two_block_snapshot();
        snap.blocks.push(Block::new(0, 0));
        assert_eq!(snap.validate(), Err(SnapshotError::DuplicateBlock(0)));

        let mut snap = two_block_snapshot();
        let edge = snap.edges[0].clone();
        snap.edges.push(edge);
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::DuplicateEdge(EdgeKey::new(1, 0)))
        );

        let mut snap = two_block_snapshot();
        snap.height_groups.push(HeightGroup::new(0, 1));
        assert_eq!(snap.validate(), Err(SnapshotError::DuplicateHeightGroup(0)));
    }

    #[test]
    fn test_snapshot_wire_format() {
        let json = r#"{
            "blocks": [{"id": 0, "blockHash": "00", "daaScore": 0, "height": 0, "heightGroupIndex": 0}],
            "edges": [],
            "heightGroups": [{"height": 0, "size": 1}]
        }"#;
        let snap: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.max_height(), Some(0));
        assert!(snap.find_by_hash("00").is_some());
        assert_eq!(snap.height_group(0), Some(&HeightGroup::new(0, 1)));
        snap.validate().unwrap();
    }
}
