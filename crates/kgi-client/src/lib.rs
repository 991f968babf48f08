//! Tracking and polling for the KGI block-DAG timeline.
//!
//! The [`Tracker`] is a plain state machine: it turns the navigation input
//! into one fetch per tick and decides whether each answer may touch the
//! store. [`spawn_timeline`] wraps it, the store and the viewport in a
//! single self-paced tokio task behind a [`TimelineHandle`].
//!
//! ```text
//!   NavigationInput ──► Tracker::begin_tick ──► FetchRequest ──► DataSource
//!                                                                    │
//!   TimelineStore ◄── Tracker::complete (staleness check) ◄──────────┘
//!        │
//!        └──► TimelineFrame / Listeners
//! ```
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`DataSource`] | Backend endpoints, the only thing awaited |
//! | [`NavigationInput`] | Caller-owned height / hash / DAA score keys |
//! | [`Tracker`] | Tick planning, staleness discard, sticky failure signal |
//! | [`Listeners`] | Single-slot callbacks |
//! | [`TimelineHandle`] | Cloneable handle to the running poller |

pub mod actor;
pub mod config;
pub mod constants;
pub mod info;
pub mod listeners;
pub mod navigation;
pub mod source;
pub mod tracker;

pub use actor::{TickSummary, TimelineError, TimelineFrame, TimelineHandle, spawn_timeline};
pub use config::TimelineConfig;
pub use info::BlockInformation;
pub use listeners::Listeners;
pub use navigation::{NavigationInput, TrackingMode, TrackingTarget};
pub use source::{DataSource, FetchError, FetchRequest};
pub use tracker::{Anomaly, DiscardReason, OutcomeKind, TickOutcome, TickPlan, Ticket, Tracker};
