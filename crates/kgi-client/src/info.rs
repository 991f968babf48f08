//! Details panel data for the selected block.

use std::collections::HashMap;

use kgi_types::{Block, BlockHash, BlockHashById};
use tracing::trace;

/// A block with its references resolved to hashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInformation {
    pub block: Block,
    pub parent_hashes: Vec<BlockHash>,
    pub selected_parent_hash: Option<BlockHash>,
    pub merge_set_red_hashes: Vec<BlockHash>,
    pub merge_set_blue_hashes: Vec<BlockHash>,
    /// Live blocks naming this one as a parent. Only what is on screen.
    pub child_hashes: Vec<BlockHash>,
}

impl BlockInformation {
    /// Resolve `block`'s ids through a hashes-by-ids lookup.
    ///
    /// Ids the lookup did not return are left out.
    pub fn resolve(block: Block, lookup: &[BlockHashById], child_hashes: Vec<BlockHash>) -> Self {
        let by_id: HashMap<u64, &BlockHash> =
            lookup.iter().map(|entry| (entry.id, &entry.block_hash)).collect();
        let resolve_all = |ids: &[u64]| -> Vec<BlockHash> {
            ids.iter()
                .filter_map(|id| {
                    let hash = by_id.get(id).map(|h| (*h).clone());
                    if hash.is_none() {
                        trace!("no hash returned for block id {id}");
                    }
                    hash
                })
                .collect()
        };

        Self {
            parent_hashes: resolve_all(&block.parent_ids),
            selected_parent_hash: block
                .selected_parent_id
                .and_then(|id| by_id.get(&id).map(|h| (*h).clone())),
            merge_set_red_hashes: resolve_all(&block.merge_set_red_ids),
            merge_set_blue_hashes: resolve_all(&block.merge_set_blue_ids),
            child_hashes,
            block,
        }
    }
}
