//! Shared data model for the KGI block-DAG timeline.
//!
//! This crate is the leaf of the workspace: the wire types returned by every
//! data-source fetch, and the invariants a fetched [`Snapshot`] has to satisfy
//! before anything downstream is allowed to position it.
//!
//! ```text
//! Snapshot (one fetch, applied atomically)
//!     ├── Block        identity: id          (hash, height, height-group index, color, VSPC flag)
//!     ├── Edge         identity: (from, to)  (denormalized heights + group indexes of both ends)
//!     └── HeightGroup  identity: height      (size = blocks sharing the height)
//! ```
//!
//! # Key Types
//!
//! |-------------------|------------------------------------------------|
//! | Type              | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | [`Block`]         | One DAG block as served by the data source     |
//! | [`BlockHash`]     | Cryptographic block identifier                 |
//! | [`BlockColor`]    | Consensus classification (blue / red / gray)   |
//! | [`Edge`]          | Parent/child link between two blocks           |
//! | [`EdgeKey`]       | Ordered `(from, to)` identity of an edge       |
//! | [`HeightGroup`]   | Count of blocks at one height                  |
//! | [`Snapshot`]      | Blocks + edges + height groups of one fetch    |
//! | [`AppConfig`]     | Versions and network reported by the backend   |
//! |-------------------|------------------------------------------------|

pub mod app_config;
pub mod block;
pub mod snapshot;

pub use app_config::{AppConfig, BlockHashById};
pub use block::{Block, BlockColor, BlockHash};
pub use snapshot::{Edge, EdgeKey, HeightGroup, Snapshot, SnapshotError};
