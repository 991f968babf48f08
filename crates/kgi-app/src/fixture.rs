//! A recorded snapshot file served as a [`DataSource`].
//!
//! The file is one JSON [`Snapshot`] in the backend wire format. Queries are
//! answered by slicing it by height; the head is its highest block.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use kgi_client::{DataSource, FetchError};
use kgi_types::{AppConfig, Block, BlockHash, BlockHashById, Snapshot, SnapshotError};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] SnapshotError),
}

pub struct FixtureSource {
    snapshot: Snapshot,
}

impl FixtureSource {
    pub fn new(snapshot: Snapshot) -> Result<Self, FixtureError> {
        snapshot.validate()?;
        Ok(Self { snapshot })
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        info!(
            "loaded fixture {:?}: {} blocks, {} edges",
            path,
            snapshot.blocks.len(),
            snapshot.edges.len()
        );
        Self::new(snapshot)
    }

    /// Every block, edge and height group with `start <= height <= end`.
    ///
    /// Whole height groups are kept, so indexes stay valid. Edges reaching
    /// outside the range are dropped along with their far height group.
    pub fn slice(&self, start: u64, end: u64) -> Snapshot {
        let in_range = |h: u64| (start..=end).contains(&h);
        let blocks: Vec<Block> = self
            .snapshot
            .blocks
            .iter()
            .filter(|b| in_range(b.height))
            .cloned()
            .collect();
        let edges = self
            .snapshot
            .edges
            .iter()
            .filter(|e| in_range(e.from_height) && in_range(e.to_height))
            .cloned()
            .collect();
        let heights: HashSet<u64> = blocks.iter().map(|b| b.height).collect();
        let height_groups = self
            .snapshot
            .height_groups
            .iter()
            .filter(|g| heights.contains(&g.height))
            .copied()
            .collect();
        Snapshot::new(blocks, edges, height_groups)
    }

    fn around(&self, block: Option<&Block>, height_difference: u64) -> Snapshot {
        match block {
            Some(block) => self.slice(
                block.height.saturating_sub(height_difference),
                block.height + height_difference,
            ),
            None => Snapshot::default(),
        }
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn get_blocks_between_heights(&self, start: u64, end: u64) -> Result<Snapshot, FetchError> {
        Ok(self.slice(start, end))
    }

    async fn get_block_hash(
        &self,
        hash: &BlockHash,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError> {
        Ok(self.around(self.snapshot.find_by_hash(hash.as_str()), height_difference))
    }

    async fn get_block_daa_score(
        &self,
        daa_score: u64,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError> {
        Ok(self.around(self.snapshot.find_by_daa_score(daa_score), height_difference))
    }

    async fn get_head(&self, height_difference: u64) -> Result<Snapshot, FetchError> {
        let head = self.snapshot.max_height().ok_or(FetchError::EmptyResponse)?;
        Ok(self.slice(head.saturating_sub(height_difference), head))
    }

    async fn get_block_hashes_by_ids(&self, ids: &[u64]) -> Result<Vec<BlockHashById>, FetchError> {
        Ok(self
            .snapshot
            .blocks
            .iter()
            .filter(|b| ids.contains(&b.id))
            .map(|b| BlockHashById {
                id: b.id,
                block_hash: b.block_hash.clone(),
            })
            .collect())
    }

    async fn get_app_config(&self) -> Result<AppConfig, FetchError> {
        Ok(AppConfig {
            network: "fixture".into(),
            ..AppConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn fixture() -> Snapshot {
        Snapshot::from_blocks(vec![
            Block::new(0, 0),
            Block::new(1, 1).with_parents(vec![0]),
            Block::new(2, 1).with_parents(vec![0]),
            Block::new(3, 2).with_parents(vec![1, 2]).with_daa_score(30),
            Block::new(4, 3).with_parents(vec![3]),
        ])
    }

    #[test]
    fn test_slice_keeps_whole_groups() {
        let source = FixtureSource::new(fixture()).unwrap();
        let slice = source.slice(1, 2);
        slice.validate().unwrap();
        let ids: Vec<u64> = slice.blocks.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // 1->0 and 2->0 reach outside the range.
        assert_eq!(slice.edges.len(), 2);
        assert_eq!(slice.height_groups.len(), 2);
    }

    #[tokio::test]
    async fn test_queries() {
        let source = FixtureSource::new(fixture()).unwrap();

        let head = source.get_head(1).await.unwrap();
        assert_eq!(head.max_height(), Some(3));
        assert_eq!(head.blocks.len(), 2);

        let hash = Block::new(3, 2).block_hash;
        let around = source.get_block_hash(&hash, 0).await.unwrap();
        assert_eq!(around.blocks.len(), 1);

        let by_daa = source.get_block_daa_score(30, 1).await.unwrap();
        assert_eq!(by_daa.height_groups.len(), 3);

        let missing = source.get_block_daa_score(999, 1).await.unwrap();
        assert!(missing.is_empty());

        let hashes = source.get_block_hashes_by_ids(&[1, 4, 77]).await.unwrap();
        assert_eq!(hashes.len(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&fixture()).unwrap()).unwrap();
        let source = FixtureSource::load(file.path()).unwrap();
        assert_eq!(source.slice(0, 10).blocks.len(), 5);
    }

    #[test]
    fn test_invalid_fixture_rejected() {
        let mut snap = fixture();
        snap.height_groups.pop();
        assert!(matches!(
            FixtureSource::new(snap),
            Err(FixtureError::Invalid(SnapshotError::MissingHeightGroup { height: 3 }))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(FixtureSource::load(file.path()), Err(FixtureError::Json(_))));
    }
}
