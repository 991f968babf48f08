//! Backend metadata payloads that are not part of a [`Snapshot`](crate::Snapshot).

use serde::{Deserialize, Serialize};

use crate::block::BlockHash;

/// Versions and network reported by the backend's `appConfig` endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub id: bool,
    /// Version of the full node the backend indexes.
    #[serde(default, alias = "kaspadVersion")]
    pub node_version: String,
    /// Version of the indexing process.
    #[serde(default)]
    pub processing_version: String,
    #[serde(default)]
    pub network: String,
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "network={} node={} processing={}",
            self.network, self.node_version, self.processing_version
        )
    }
}

/// One entry of a hashes-by-ids lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHashById {
    pub id: u64,
    pub block_hash: BlockHash,
}
