//! The backend seam: where snapshots come from.
//!
//! [`DataSource`] is the only thing the poller awaits. Every error it returns
//! stops at the tracker and becomes the fetch-failing signal; nothing here
//! reaches the layout code.

use std::sync::Arc;

use async_trait::async_trait;
use kgi_types::{AppConfig, BlockHash, BlockHashById, Snapshot};
use thiserror::Error;

/// Why a fetch produced no usable payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("empty response")]
    EmptyResponse,
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Backend endpoints the timeline consumes.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// All blocks with `start <= height <= end`.
    async fn get_blocks_between_heights(&self, start: u64, end: u64) -> Result<Snapshot, FetchError>;

    /// Blocks within `height_difference` heights of the block with `hash`.
    async fn get_block_hash(
        &self,
        hash: &BlockHash,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError>;

    /// Blocks within `height_difference` heights of the block with `daa_score`.
    async fn get_block_daa_score(
        &self,
        daa_score: u64,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError>;

    /// The newest `height_difference` heights.
    async fn get_head(&self, height_difference: u64) -> Result<Snapshot, FetchError>;

    async fn get_block_hashes_by_ids(&self, ids: &[u64]) -> Result<Vec<BlockHashById>, FetchError>;

    async fn get_app_config(&self) -> Result<AppConfig, FetchError>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    async fn get_blocks_between_heights(&self, start: u64, end: u64) -> Result<Snapshot, FetchError> {
        (**self).get_blocks_between_heights(start, end).await
    }

    async fn get_block_hash(
        &self,
        hash: &BlockHash,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError> {
        (**self).get_block_hash(hash, height_difference).await
    }

    async fn get_block_daa_score(
        &self,
        daa_score: u64,
        height_difference: u64,
    ) -> Result<Snapshot, FetchError> {
        (**self).get_block_daa_score(daa_score, height_difference).await
    }

    async fn get_head(&self, height_difference: u64) -> Result<Snapshot, FetchError> {
        (**self).get_head(height_difference).await
    }

    async fn get_block_hashes_by_ids(&self, ids: &[u64]) -> Result<Vec<BlockHashById>, FetchError> {
        (**self).get_block_hashes_by_ids(ids).await
    }

    async fn get_app_config(&self) -> Result<AppConfig, FetchError> {
        (**self).get_app_config().await
    }
}

/// One snapshot fetch, decided by the tracker at the start of a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    BetweenHeights { start: u64, end: u64 },
    Hash { hash: BlockHash, height_difference: u64 },
    DaaScore { daa_score: u64, height_difference: u64 },
    Head { height_difference: u64 },
}

impl FetchRequest {
    pub async fn fetch(&self, source: &dyn DataSource) -> Result<Snapshot, FetchError> {
        match self {
            FetchRequest::BetweenHeights { start, end } => {
                source.get_blocks_between_heights(*start, *end).await
            }
            FetchRequest::Hash { hash, height_difference } => {
                source.get_block_hash(hash, *height_difference).await
            }
            FetchRequest::DaaScore { daa_score, height_difference } => {
                source.get_block_daa_score(*daa_score, *height_difference).await
            }
            FetchRequest::Head { height_difference } => source.get_head(*height_difference).await,
        }
    }
}

impl std::fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchRequest::BetweenHeights { start, end } => write!(f, "heights {start}..={end}"),
            FetchRequest::Hash { hash, height_difference } => {
                write!(f, "hash {} ±{height_difference}", hash.short())
            }
            FetchRequest::DaaScore { daa_score, height_difference } => {
                write!(f, "daa score {daa_score} ±{height_difference}")
            }
            FetchRequest::Head { height_difference } => write!(f, "head -{height_difference}"),
        }
    }
}
