//! Timeline layout for the KGI block-DAG view.
//!
//! Everything here is synchronous and framework-independent; the poller in
//! `kgi-client` drives it, and any renderer reads the positioned proxies back
//! out.
//!
//! ```text
//! Snapshot ──► TimelineStore::apply ──► BlockProxy / EdgeProxy / HeightProxy
//!                     │                          (timeline coordinates)
//!                     ▼
//!                  Metrics  ◄── GeometryConfig + Viewport
//!                     │
//!                     ▼
//!            ViewportController ──► offset (timeline → screen)
//! ```
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`GeometryConfig`] | Layout constants, passed in at construction |
//! | [`Metrics`] | Block size, margin and radius for one viewport |
//! | [`TimelineStore`] | Keyed live set, reconciled snapshot by snapshot |
//! | [`ViewportController`] | Horizontal offset with eased recentring |

pub mod config;
pub mod geometry;
pub mod store;
pub mod viewport;

pub use config::{GeometryConfig, LabelMode, SlotSide};
pub use geometry::{Metrics, Viewport};
pub use store::{ApplyReport, BlockProxy, EdgeProxy, HeightProxy, ProxyId, TimelineStore};
pub use viewport::{DEFAULT_TRANSITION_DURATION, Repositioning, ViewportController};
