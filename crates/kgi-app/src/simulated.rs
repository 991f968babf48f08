//! Deterministic, growing block-DAG served as a [`DataSource`].
//!
//! Heights appear at a fixed rate from the moment the source is created.
//! Everything else (how many blocks share a height, which extra parents a
//! block merges, which blocks are red) is a pure function of the seed, so the
//! same height always yields the same blocks.
//!
//! Block ids are `height * MAX_WIDTH + index` and double as DAA scores.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kgi_client::{DataSource, FetchError};
use kgi_types::{AppConfig, Block, BlockColor, BlockHash, BlockHashById, Snapshot};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::trace;

/// Id space reserved per height.
pub const MAX_WIDTH: u64 = 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Head height at startup.
    pub start_height: u64,
    pub heights_per_second: f64,
    /// Upper bound on blocks sharing one height (clamped to [`MAX_WIDTH`]).
    pub max_blocks_per_height: u64,
    /// Artificial round-trip time of every fetch.
    pub latency_ms: u64,
    /// Fail every n-th fetch; 0 never fails.
    pub fail_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0x6b67_6900,
            start_height: 1_000,
            heights_per_second: 1.0,
            max_blocks_per_height: 4,
            latency_ms: 50,
            fail_every: 0,
        }
    }
}

/// splitmix64 finalizer.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

pub struct SimulatedDag {
    config: SimulationConfig,
    started: Instant,
    fetches: AtomicU64,
}

impl SimulatedDag {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn head_height(&self) -> u64 {
        let grown = self.started.elapsed().as_secs_f64() * self.config.heights_per_second;
        self.config.start_height + grown.max(0.0) as u64
    }

    pub fn width_at(&self, height: u64) -> u64 {
        if height == 0 {
            return 1;
        }
        let max = self.config.max_blocks_per_height.clamp(1, MAX_WIDTH);
        1 + mix(self.config.seed ^ height) % max
    }

    fn id(height: u64, index: u64) -> u64 {
        height * MAX_WIDTH + index
    }

    fn color(&self, height: u64, index: u64) -> BlockColor {
        if index == 0 || mix(self.config.seed ^ Self::id(height, index)) % 4 != 0 {
            BlockColor::Blue
        } else {
            BlockColor::Red
        }
    }

    /// The block at `(height, index)`; `index` must be below `width_at(height)`.
    pub fn block(&self, height: u64, index: u64) -> Block {
        let id = Self::id(height, index);
        let mut block = Block::new(id, height)
            .with_daa_score(id)
            .with_color(self.color(height, index))
            .in_chain(index == 0);
        block.timestamp = (height * 1_000) as i64;

        if height > 0 {
            let parent_height = height - 1;
            let mut parents = vec![Self::id(parent_height, 0)];
            for j in 1..self.width_at(parent_height) {
                if mix(self.config.seed ^ id.rotate_left(17) ^ j) & 1 == 1 {
                    parents.push(Self::id(parent_height, j));
                }
            }
            if index == 0 {
                for &parent in &parents {
                    match self.color(parent_height, parent % MAX_WIDTH) {
                        BlockColor::Red => block.merge_set_red_ids.push(parent),
                        _ => block.merge_set_blue_ids.push(parent),
                    }
                }
            }
            block = block.with_parents(parents);
        }
        block
    }

    /// `(height, index)` of a block id, if it exists yet.
    pub fn locate(&self, id: u64) -> Option<(u64, u64)> {
        let (height, index) = (id / MAX_WIDTH, id % MAX_WIDTH);
        (height <= self.head_height() && index < self.width_at(height)).then_some((height, index))
    }

    pub fn snapshot(&self, start: u64, end: u64) -> Snapshot {
        let end = end.min(self.head_height());
        if start > end {
            return Snapshot::default();
        }
        let blocks = (start..=end)
            .flat_map(|h| (0..self.width_at(h)).map(move |i| (h, i)))
            .map(|(h, i)| self.block(h, i))
            .collect();
        Snapshot::from_blocks(blocks)
    }

    fn around(&self, id: u64, height_difference: u64) -> Snapshot {
        match self.locate(id) {
            Some((height, _)) => {
                self.snapshot(height.saturating_sub(height_difference), height + height_difference)
            }
            None => Snapshot::default(),
        }
    }

    async fn round_trip(&self) -> Result<(), FetchError> {
        let n = self.fetches.fetch_add(1, Ordering::Relaxed) + 1;
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        if self.config.fail_every > 0 && n % self.config.fail_every == 0 {
            trace!("simulated outage on fetch {n}");
            return Err(FetchError::Transport("simulated outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for SimulatedDag {
    async fn get_blocks_between_heights(&self, start: u64, end: u64) -> Result<Snapshot, FetchError> {
        self.round_trip().await?;
        Ok(self.snapshot(start, end))
    }

    async fn get_block_hash(
        &self,
        hash: &BlockHash,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError> {
        self.round_trip().await?;
        let id = u64::from_str_radix(hash.as_str(), 16)
            .map_err(|e| FetchError::Decode(format!("hash {}: {e}", hash.short())))?;
        Ok(self.around(id, height_difference))
    }

    async fn get_block_daa_score(
        &self,
        daa_score: u64,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError> {
        self.round_trip().await?;
        Ok(self.around(daa_score, height_difference))
    }

    async fn get_head(&self, height_difference: u64) -> Result<Snapshot, FetchError> {
        self.round_trip().await?;
        let head = self.head_height();
        Ok(self.snapshot(head.saturating_sub(height_difference), head))
    }

    async fn get_block_hashes_by_ids(&self, ids: &[u64]) -> Result<Vec<BlockHashById>, FetchError> {
        self.round_trip().await?;
        Ok(ids
            .iter()
            .filter_map(|&id| {
                self.locate(id).map(|(h, i)| BlockHashById {
                    id,
                    block_hash: self.block(h, i).block_hash,
                })
            })
            .collect())
    }

    async fn get_app_config(&self) -> Result<AppConfig, FetchError> {
        Ok(AppConfig {
            id: true,
            node_version: "simulated".into(),
            processing_version: env!("CARGO_PKG_VERSION").into(),
            network: "simnet".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            latency_ms: 0,
            start_height: 100,
            ..SimulationConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_dag() {
        let a = SimulatedDag::new(config());
        let b = SimulatedDag::new(config());
        assert_eq!(a.snapshot(40, 60), b.snapshot(40, 60));

        let other = SimulatedDag::new(SimulationConfig { seed: 7, ..config() });
        assert_ne!(a.snapshot(40, 60), other.snapshot(40, 60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_is_valid() {
        let dag = SimulatedDag::new(config());
        let snap = dag.snapshot(50, 70);
        snap.validate().unwrap();

        for block in &snap.blocks {
            assert!(block.height >= 50 && block.height <= 70);
            let width = dag.width_at(block.height);
            assert!((1..=4).contains(&width));
            for parent in &block.parent_ids {
                assert_eq!(parent / MAX_WIDTH, block.height - 1);
            }
        }
        // Only chain blocks carry merge sets.
        assert!(snap.blocks.iter().filter(|b| !b.merge_set_blue_ids.is_empty()).all(|b| b.is_in_virtual_selected_parent_chain));
    }

    #[tokio::test(start_paused = true)]
    async fn test_head_grows_with_time() {
        let dag = SimulatedDag::new(config());
        assert_eq!(dag.head_height(), 100);
        let head = dag.get_head(3).await.unwrap();
        assert_eq!(head.max_height(), Some(100));
        assert_eq!(head.height_groups.first().map(|g| g.height), Some(97));

        tokio::time::advance(Duration::from_millis(2_500)).await;
        assert_eq!(dag.head_height(), 102);
        // Nothing beyond the head exists yet.
        assert_eq!(dag.snapshot(101, 110).max_height(), Some(102));
        assert!(dag.snapshot(103, 110).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_by_hash_and_daa_score() {
        let dag = SimulatedDag::new(config());
        let target = dag.block(60, 0);

        let snap = dag.get_block_hash(&target.block_hash, 2).await.unwrap();
        assert_eq!(snap.find_by_hash(target.block_hash.as_str()), Some(&target));
        assert_eq!(snap.height_groups.len(), 5);

        let snap = dag.get_block_daa_score(target.daa_score, 0).await.unwrap();
        assert_eq!(snap.max_height(), Some(60));

        let hashes = dag.get_block_hashes_by_ids(&[target.id, 99_999 * MAX_WIDTH]).await.unwrap();
        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes[0].block_hash, target.block_hash);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_every() {
        let dag = SimulatedDag::new(SimulationConfig { fail_every: 2, ..config() });
        assert!(dag.get_head(1).await.is_ok());
        assert!(matches!(dag.get_head(1).await, Err(FetchError::Transport(_))));
        assert!(dag.get_head(1).await.is_ok());
    }
}
