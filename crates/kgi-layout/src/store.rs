//! Reconciliation store: the live set of block, edge and height-label proxies.
//!
//! Each fetched [`Snapshot`] is reconciled against what is already on screen
//! instead of rebuilding it, so a block that survives from one snapshot to the
//! next keeps the same proxy (same [`ProxyId`]) and only its mutable state and
//! position change.
//!
//! # Apply Order
//!
//! ```text
//! apply(snapshot)
//!   0. validate            → reject in full, store untouched
//!   1. index new snapshot  (by id / (from,to) / height)
//!   2. remove              edges, blocks, then unclaimed height groups
//!   3. update              color, chain membership, slot
//!   4. insert              fresh proxies, is_new = true
//!   5. reorder             live maps follow snapshot order
//!   6. reposition          every proxy through the geometry engine
//! ```
//!
//! Removal strictly precedes insertion, so a key is never present twice.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use kgi_types::{Block, BlockHash, Edge, EdgeKey, HeightGroup, Snapshot, SnapshotError};
use kurbo::{Point, Rect};
use tracing::{debug, trace, warn};

use crate::config::{GeometryConfig, LabelMode};
use crate::geometry::{Metrics, Viewport};

/// Identity of one visual proxy.
///
/// Allocated once when an entity enters the live set and kept for as long as
/// the entity stays; a removed-then-readded entity gets a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(pub u64);

/// Visual state of one block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockProxy {
    pub proxy_id: ProxyId,
    pub block: Block,
    /// Block centre in timeline coordinates.
    pub position: Point,
    /// Side length of the (square) block.
    pub size: f64,
    /// Created by the most recent apply; drives the entrance transition.
    pub is_new: bool,
    /// The block the tracker is currently centred on.
    pub is_selected: bool,
}

/// Visual state of one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeProxy {
    pub proxy_id: ProxyId,
    pub edge: Edge,
    /// Arrow start, on the outline of the `from` block.
    pub start: Point,
    /// Arrow end, on the outline of the `to` block.
    pub end: Point,
    /// Both endpoints are in the virtual selected parent chain.
    pub is_in_chain: bool,
    /// One endpoint is the selected block.
    pub is_highlighted: bool,
    /// One endpoint is not in the live block set; the position comes from
    /// the edge's denormalized fields only.
    pub is_pending: bool,
    pub is_new: bool,
}

/// Visual state of one height column and its label.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightProxy {
    pub proxy_id: ProxyId,
    pub group: HeightGroup,
    /// Value shown on the label (height or DAA score, see [`LabelMode`]).
    pub label: u64,
    /// Clickable column.
    pub bounds: Rect,
    pub is_new: bool,
}

/// Keys touched by one [`TimelineStore::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub added_blocks: Vec<u64>,
    pub updated_blocks: Vec<u64>,
    pub removed_blocks: Vec<u64>,
    pub added_edges: Vec<EdgeKey>,
    pub removed_edges: Vec<EdgeKey>,
    pub added_heights: Vec<u64>,
    pub removed_heights: Vec<u64>,
}

impl ApplyReport {
    /// True when the apply neither added nor removed anything.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.added_blocks.is_empty()
            && self.removed_blocks.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
            && self.added_heights.is_empty()
            && self.removed_heights.is_empty()
    }
}

/// Owner of the live block / edge / height maps and their proxies.
#[derive(Debug)]
pub struct TimelineStore {
    config: GeometryConfig,
    metrics: Metrics,
    blocks: IndexMap<u64, BlockProxy>,
    edges: IndexMap<EdgeKey, EdgeProxy>,
    heights: IndexMap<u64, HeightProxy>,
    selected_block: Option<u64>,
    next_proxy_id: u64,
}

impl TimelineStore {
    pub fn new(config: GeometryConfig, viewport: Viewport) -> Self {
        let metrics = Metrics::new(&config, viewport);
        Self {
            config,
            metrics,
            blocks: IndexMap::new(),
            edges: IndexMap::new(),
            heights: IndexMap::new(),
            selected_block: None,
            next_proxy_id: 0,
        }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Metrics of the viewport the proxies are currently positioned for.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn allocate_proxy_id(&mut self) -> ProxyId {
        let id = ProxyId(self.next_proxy_id);
        self.next_proxy_id += 1;
        id
    }

    /// Reconcile the live set with `snapshot` and reposition everything for
    /// `viewport`.
    ///
    /// On error nothing is changed.
    pub fn apply(
        &mut self,
        snapshot: &Snapshot,
        viewport: Viewport,
    ) -> Result<ApplyReport, SnapshotError> {
        snapshot.validate()?;
        for block in &snapshot.blocks {
            if let Some(live) = self.blocks.get(&block.id) {
                if !live.block.same_identity(block) {
                    return Err(SnapshotError::IdentityChanged { block_id: block.id });
                }
            }
        }

        let new_blocks: IndexMap<u64, &Block> =
            snapshot.blocks.iter().map(|b| (b.id, b)).collect();
        let new_edges: IndexMap<EdgeKey, &Edge> =
            snapshot.edges.iter().map(|e| (e.key(), e)).collect();
        let new_heights: IndexMap<u64, &HeightGroup> =
            snapshot.height_groups.iter().map(|g| (g.height, g)).collect();

        let mut report = ApplyReport::default();

        // Removal
        self.edges.retain(|key, _| {
            let keep = new_edges.contains_key(key);
            if !keep {
                report.removed_edges.push(*key);
            }
            keep
        });
        self.blocks.retain(|id, _| {
            let keep = new_blocks.contains_key(id);
            if !keep {
                report.removed_blocks.push(*id);
            }
            keep
        });
        let claimed_heights: HashSet<u64> = snapshot.blocks.iter().map(|b| b.height).collect();
        self.heights.retain(|height, _| {
            let keep = new_heights.contains_key(height) || claimed_heights.contains(height);
            if !keep {
                report.removed_heights.push(*height);
            }
            keep
        });

        // Update
        for proxy in self.blocks.values_mut() {
            proxy.is_new = false;
            if let Some(&block) = new_blocks.get(&proxy.block.id) {
                if proxy.block.color != block.color
                    || proxy.block.is_in_virtual_selected_parent_chain
                        != block.is_in_virtual_selected_parent_chain
                {
                    trace!(
                        "block {} now {} (chain={})",
                        block.id, block.color, block.is_in_virtual_selected_parent_chain
                    );
                    report.updated_blocks.push(block.id);
                }
                proxy.block = block.clone();
            }
        }
        for proxy in self.edges.values_mut() {
            proxy.is_new = false;
            if let Some(&edge) = new_edges.get(&proxy.edge.key()) {
                proxy.edge = edge.clone();
            }
        }
        for proxy in self.heights.values_mut() {
            proxy.is_new = false;
            if let Some(&group) = new_heights.get(&proxy.group.height) {
                proxy.group = *group;
            }
        }

        // Insertion
        for block in &snapshot.blocks {
            if !self.blocks.contains_key(&block.id) {
                let proxy_id = self.allocate_proxy_id();
                self.blocks.insert(
                    block.id,
                    BlockProxy {
                        proxy_id,
                        block: block.clone(),
                        position: Point::ZERO,
                        size: 0.0,
                        is_new: true,
                        is_selected: false,
                    },
                );
                report.added_blocks.push(block.id);
            }
        }
        for edge in &snapshot.edges {
            let key = edge.key();
            if !self.edges.contains_key(&key) {
                let proxy_id = self.allocate_proxy_id();
                self.edges.insert(
                    key,
                    EdgeProxy {
                        proxy_id,
                        edge: edge.clone(),
                        start: Point::ZERO,
                        end: Point::ZERO,
                        is_in_chain: false,
                        is_highlighted: false,
                        is_pending: false,
                        is_new: true,
                    },
                );
                report.added_edges.push(key);
            }
        }
        for group in &snapshot.height_groups {
            if !self.heights.contains_key(&group.height) {
                let proxy_id = self.allocate_proxy_id();
                self.heights.insert(
                    group.height,
                    HeightProxy {
                        proxy_id,
                        group: *group,
                        label: group.height,
                        bounds: Rect::ZERO,
                        is_new: true,
                    },
                );
                report.added_heights.push(group.height);
            }
        }

        // Stacking order follows the snapshot, never map enumeration order.
        reorder(&mut self.blocks, new_blocks.keys().copied());
        reorder(&mut self.edges, new_edges.keys().copied());
        reorder(&mut self.heights, new_heights.keys().copied());

        self.refresh_flags();
        self.relayout(viewport);

        debug!(
            "applied snapshot: {} blocks (+{} -{} ~{}), {} edges (+{} -{}), {} heights",
            self.blocks.len(),
            report.added_blocks.len(),
            report.removed_blocks.len(),
            report.updated_blocks.len(),
            self.edges.len(),
            report.added_edges.len(),
            report.removed_edges.len(),
            self.heights.len(),
        );

        Ok(report)
    }

    /// Recompute every proxy's position for `viewport`.
    ///
    /// Also the entry point for resizes: positions are only ever produced here.
    pub fn relayout(&mut self, viewport: Viewport) {
        self.metrics = Metrics::new(&self.config, viewport);
        let metrics = self.metrics;

        let sizes: HashMap<u64, u32> = self
            .heights
            .values()
            .map(|p| (p.group.height, p.group.size))
            .collect();
        let size_of = |height: u64| -> u32 {
            match sizes.get(&height) {
                Some(size) => *size,
                None => {
                    // Unreachable for validated snapshots.
                    warn!("no height group for height {height} during relayout");
                    1
                }
            }
        };

        for proxy in self.blocks.values_mut() {
            let block = &proxy.block;
            proxy.size = metrics.block_size;
            proxy.position =
                metrics.block_center(block.height, block.height_group_index, size_of(block.height));
        }

        for proxy in self.edges.values_mut() {
            let edge = &proxy.edge;
            let from = metrics.block_center(
                edge.from_height,
                edge.from_height_group_index,
                size_of(edge.from_height),
            );
            let to = metrics.block_center(
                edge.to_height,
                edge.to_height_group_index,
                size_of(edge.to_height),
            );
            let (start, end) = metrics.edge_endpoints(from, to);
            proxy.start = start;
            proxy.end = end;
        }

        let mut min_daa: HashMap<u64, u64> = HashMap::new();
        if self.config.label_mode == LabelMode::DaaScore {
            for proxy in self.blocks.values() {
                let entry = min_daa.entry(proxy.block.height).or_insert(u64::MAX);
                *entry = (*entry).min(proxy.block.daa_score);
            }
        }
        for proxy in self.heights.values_mut() {
            let height = proxy.group.height;
            proxy.bounds = metrics.height_label_bounds(height);
            proxy.label = match self.config.label_mode {
                LabelMode::Height => height,
                LabelMode::DaaScore => min_daa.get(&height).copied().unwrap_or(height),
            };
        }
    }

    /// Highlight `block_id` (and the edges touching it), or clear the
    /// highlight with `None`.
    ///
    /// The selection survives applies; it shows again if the block returns.
    pub fn set_selected_block(&mut self, block_id: Option<u64>) {
        self.selected_block = block_id;
        self.refresh_flags();
    }

    pub fn selected_block(&self) -> Option<u64> {
        self.selected_block
    }

    fn refresh_flags(&mut self) {
        let selected = self.selected_block;
        for proxy in self.blocks.values_mut() {
            proxy.is_selected = selected == Some(proxy.block.id);
        }
        let blocks = &self.blocks;
        for proxy in self.edges.values_mut() {
            let key = proxy.edge.key();
            let from = blocks.get(&key.from);
            let to = blocks.get(&key.to);
            proxy.is_pending = from.is_none() || to.is_none();
            proxy.is_in_chain = match (from, to) {
                (Some(from), Some(to)) => {
                    from.block.is_in_virtual_selected_parent_chain
                        && to.block.is_in_virtual_selected_parent_chain
                }
                _ => false,
            };
            proxy.is_highlighted = selected.is_some_and(|id| key.touches(id));
        }
    }

    pub fn block(&self, id: u64) -> Option<&BlockProxy> {
        self.blocks.get(&id)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeProxy> {
        self.edges.get(&key)
    }

    pub fn height(&self, height: u64) -> Option<&HeightProxy> {
        self.heights.get(&height)
    }

    /// Blocks in snapshot order.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockProxy> {
        self.blocks.values()
    }

    /// Edges in snapshot order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeProxy> {
        self.edges.values()
    }

    /// Height columns in snapshot order.
    pub fn heights(&self) -> impl Iterator<Item = &HeightProxy> {
        self.heights.values()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn height_count(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.edges.is_empty() && self.heights.is_empty()
    }

    pub fn find_block_by_hash(&self, hash: &BlockHash) -> Option<&Block> {
        self.blocks
            .values()
            .map(|p| &p.block)
            .find(|b| &b.block_hash == hash)
    }

    pub fn find_block_by_daa_score(&self, daa_score: u64) -> Option<&Block> {
        self.blocks
            .values()
            .map(|p| &p.block)
            .find(|b| b.daa_score == daa_score)
    }

    /// Live blocks listing `block_id` as a parent, in snapshot order.
    pub fn children_of(&self, block_id: u64) -> Vec<&Block> {
        self.blocks
            .values()
            .map(|p| &p.block)
            .filter(|b| b.parent_ids.contains(&block_id))
            .collect()
    }

    pub fn max_height(&self) -> Option<u64> {
        self.blocks.values().map(|p| p.block.height).max()
    }

    /// Drop every proxy.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.edges.clear();
        self.heights.clear();
    }
}

/// Rearrange `map` so its iteration order is `order`.
///
/// Every key in `order` must be present; values move, they are not rebuilt.
fn reorder<K, V>(map: &mut IndexMap<K, V>, order: impl Iterator<Item = K>)
where
    K: std::hash::Hash + Eq,
{
    let mut reordered = IndexMap::with_capacity(map.len());
    for key in order {
        if let Some(value) = map.swap_remove(&key) {
            reordered.insert(key, value);
        }
    }
    // Anything left over was not in `order`; keep it at the end.
    reordered.extend(map.drain(..));
    *map = reordered;
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgi_types::BlockColor;
    use pretty_assertions::assert_eq;

    fn viewport() -> Viewport {
        // block size 50, margin 100, step 150
        Viewport::new(1500.0, 600.0)
    }

    fn store() -> TimelineStore {
        TimelineStore::new(GeometryConfig::default(), viewport())
    }

    fn snapshot1() -> Snapshot {
        Snapshot::from_blocks(vec![Block::new(0, 0), Block::new(1, 1).with_parents(vec![0])])
    }

    /// Block 0 dropped, block 2 added at height 1.
    fn snapshot2() -> Snapshot {
        let mut snap = Snapshot::from_blocks(vec![
            Block::new(1, 1).with_parents(vec![0]),
            Block::new(2, 1).with_parents(vec![0]),
        ]);
        // Height 0 still referenced by the (now pending) edges.
        snap.edges = vec![
            Edge {
                from_block_id: 1,
                to_block_id: 0,
                from_height: 1,
                to_height: 0,
                from_height_group_index: 0,
                to_height_group_index: 0,
            },
        ];
        snap.height_groups.insert(0, HeightGroup::new(0, 1));
        snap
    }

    fn keys(store: &TimelineStore) -> (Vec<u64>, Vec<EdgeKey>, Vec<u64>) {
        (
            store.blocks().map(|p| p.block.id).collect(),
            store.edges().map(|p| p.edge.key()).collect(),
            store.heights().map(|p| p.group.height).collect(),
        )
    }

    #[test]
    fn test_apply_positions_blocks() {
        let mut store = store();
        let report = store.apply(&snapshot1(), viewport()).unwrap();

        assert_eq!(report.added_blocks, vec![0, 1]);
        assert_eq!(store.block_count(), 2);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.height_count(), 2);

        let b0 = store.block(0).unwrap();
        let b1 = store.block(1).unwrap();
        assert_eq!(b0.position, Point::new(0.0, 0.0));
        assert_eq!(b1.position, Point::new(150.0, 0.0));
        assert_eq!(b0.size, 50.0);
        assert!(b0.is_new && b1.is_new);

        let edge = store.edge(EdgeKey::new(1, 0)).unwrap();
        assert_eq!(edge.start, Point::new(125.0, 0.0));
        assert_eq!(edge.end, Point::new(25.0, 0.0));
        assert!(!edge.is_pending);
    }

    #[test]
    fn test_set_equivalence_after_apply() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let snap = snapshot2();
        store.apply(&snap, viewport()).unwrap();

        let (blocks, edges, heights) = keys(&store);
        assert_eq!(blocks, snap.blocks.iter().map(|b| b.id).collect::<Vec<_>>());
        assert_eq!(edges, snap.edges.iter().map(Edge::key).collect::<Vec<_>>());
        assert_eq!(
            heights,
            snap.height_groups.iter().map(|g| g.height).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_idempotent_apply() {
        let mut store = store();
        let snap = snapshot1();
        store.apply(&snap, viewport()).unwrap();
        let first: Vec<(ProxyId, Point)> = store.blocks().map(|p| (p.proxy_id, p.position)).collect();
        let first_edges: Vec<ProxyId> = store.edges().map(|p| p.proxy_id).collect();

        let report = store.apply(&snap, viewport()).unwrap();
        let second: Vec<(ProxyId, Point)> = store.blocks().map(|p| (p.proxy_id, p.position)).collect();
        let second_edges: Vec<ProxyId> = store.edges().map(|p| p.proxy_id).collect();

        assert_eq!(first, second);
        assert_eq!(first_edges, second_edges);
        assert!(report.is_structurally_unchanged());
        assert!(report.updated_blocks.is_empty());
        assert!(store.blocks().all(|p| !p.is_new));
    }

    #[test]
    fn test_identity_stable_across_snapshots() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let before = store.block(1).unwrap().proxy_id;

        store.apply(&snapshot2(), viewport()).unwrap();
        let after = store.block(1).unwrap();
        assert_eq!(after.proxy_id, before);
        assert!(!after.is_new);
    }

    #[test]
    fn test_end_to_end_regroup() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let report = store.apply(&snapshot2(), viewport()).unwrap();

        assert_eq!(report.removed_blocks, vec![0]);
        assert_eq!(report.added_blocks, vec![2]);
        assert!(store.block(0).is_none());

        // Height 1 now holds two blocks: rows of 300px, offsets -0.5 / +0.5.
        let b1 = store.block(1).unwrap();
        let b2 = store.block(2).unwrap();
        assert_eq!(b1.position, Point::new(150.0, -150.0));
        assert_eq!(b2.position, Point::new(150.0, 150.0));
        assert!(b2.is_new);

        // The edge to the evicted block is pending but still placed.
        let edge = store.edge(EdgeKey::new(1, 0)).unwrap();
        assert!(edge.is_pending);
        assert!(!edge.is_in_chain);
    }

    #[test]
    fn test_readded_block_gets_new_proxy() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let first = store.block(0).unwrap().proxy_id;

        store.apply(&snapshot2(), viewport()).unwrap();
        store.apply(&snapshot1(), viewport()).unwrap();
        let readded = store.block(0).unwrap();
        assert_ne!(readded.proxy_id, first);
        assert!(readded.is_new);
    }

    #[test]
    fn test_update_color_and_chain() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();

        let snap = Snapshot::from_blocks(vec![
            Block::new(0, 0).with_color(BlockColor::Blue).in_chain(true),
            Block::new(1, 1).with_parents(vec![0]).with_color(BlockColor::Red).in_chain(true),
        ]);
        let report = store.apply(&snap, viewport()).unwrap();

        assert_eq!(report.updated_blocks, vec![0, 1]);
        assert_eq!(store.block(1).unwrap().block.color, BlockColor::Red);
        assert!(store.edge(EdgeKey::new(1, 0)).unwrap().is_in_chain);

        // One endpoint leaves the chain: the edge does too.
        let snap = Snapshot::from_blocks(vec![
            Block::new(0, 0).with_color(BlockColor::Blue).in_chain(true),
            Block::new(1, 1).with_parents(vec![0]).with_color(BlockColor::Red),
        ]);
        store.apply(&snap, viewport()).unwrap();
        assert!(!store.edge(EdgeKey::new(1, 0)).unwrap().is_in_chain);
    }

    #[test]
    fn test_malformed_snapshot_rejected_in_full() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let before = keys(&store);

        let mut bad = snapshot2();
        bad.height_groups.retain(|g| g.height != 0);
        let err = store.apply(&bad, viewport()).unwrap_err();
        assert_eq!(err, SnapshotError::MissingHeightGroup { height: 0 });
        assert_eq!(keys(&store), before);
    }

    #[test]
    fn test_identity_change_rejected() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();

        let snap = Snapshot::from_blocks(vec![Block::new(0, 0).with_hash("different")]);
        let err = store.apply(&snap, viewport()).unwrap_err();
        assert_eq!(err, SnapshotError::IdentityChanged { block_id: 0 });
        assert_eq!(store.block_count(), 2);
    }

    #[test]
    fn test_relayout_on_resize_keeps_identity() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let id = store.block(1).unwrap().proxy_id;

        store.relayout(Viewport::new(1500.0, 1200.0));
        let b1 = store.block(1).unwrap();
        assert_eq!(b1.proxy_id, id);
        assert_eq!(b1.size, 100.0);
        assert_eq!(b1.position, Point::new(300.0, 0.0));
        assert_eq!(store.height(1).unwrap().bounds.height(), 1200.0);
    }

    #[test]
    fn test_selection_highlights_edges() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        store.set_selected_block(Some(0));

        assert!(store.block(0).unwrap().is_selected);
        assert!(!store.block(1).unwrap().is_selected);
        assert!(store.edge(EdgeKey::new(1, 0)).unwrap().is_highlighted);

        // Survives a re-apply.
        store.apply(&snapshot1(), viewport()).unwrap();
        assert!(store.block(0).unwrap().is_selected);

        store.set_selected_block(None);
        assert!(!store.edge(EdgeKey::new(1, 0)).unwrap().is_highlighted);
    }

    #[test]
    fn test_lookup_helpers() {
        let mut store = store();
        let snap = Snapshot::from_blocks(vec![
            Block::new(0, 0).with_daa_score(10),
            Block::new(1, 1).with_parents(vec![0]).with_daa_score(12),
            Block::new(2, 1).with_parents(vec![0]).with_daa_score(11),
        ]);
        store.apply(&snap, viewport()).unwrap();

        let hash = snap.blocks[1].block_hash.clone();
        assert_eq!(store.find_block_by_hash(&hash).map(|b| b.id), Some(1));
        assert_eq!(store.find_block_by_daa_score(11).map(|b| b.id), Some(2));
        assert_eq!(store.max_height(), Some(1));
        let children: Vec<u64> = store.children_of(0).iter().map(|b| b.id).collect();
        assert_eq!(children, vec![1, 2]);
    }

    #[test]
    fn test_daa_score_labels() {
        let config = GeometryConfig {
            label_mode: LabelMode::DaaScore,
            ..GeometryConfig::default()
        };
        let mut store = TimelineStore::new(config, viewport());
        let snap = Snapshot::from_blocks(vec![
            Block::new(0, 0).with_daa_score(100),
            Block::new(1, 1).with_daa_score(105),
            Block::new(2, 1).with_daa_score(103),
        ]);
        store.apply(&snap, viewport()).unwrap();
        assert_eq!(store.height(0).unwrap().label, 100);
        assert_eq!(store.height(1).unwrap().label, 103);
    }

    #[test]
    fn test_order_follows_snapshot() {
        let mut store = store();
        store.apply(&snapshot1(), viewport()).unwrap();
        let reversed = Snapshot::from_blocks(vec![
            Block::new(1, 1).with_parents(vec![0]),
            Block::new(0, 0),
        ]);
        store.apply(&reversed, viewport()).unwrap();
        let order: Vec<u64> = store.blocks().map(|p| p.block.id).collect();
        assert_eq!(order, vec![1, 0]);
    }
}
