//! Self-paced poller that drives the timeline.
//!
//! One tokio task owns the [`Tracker`], the [`TimelineStore`] and the
//! [`ViewportController`]. Callers talk to it through a cloneable
//! [`TimelineHandle`]; fetches run as futures inside the same task, so
//! nothing but the fetch itself ever yields.
//!
//! ```text
//!   TimelineHandle (Send+Sync)    mpsc     TimelineActor (one task)
//!   ┌──────────────────────┐  ─────────▶  ┌──────────────────────────────┐
//!   │ .track_height()      │              │ Tracker + Store + Viewport   │
//!   │ .click_block()       │  ◀─────────  │ FuturesUnordered<fetch>      │
//!   │ .frame()             │   oneshot    │ sleep_until(next tick)       │
//!   └──────────────────────┘              └──────────────────────────────┘
//! ```
//!
//! Only the most recently issued tick schedules the next one, one interval
//! after it completes. Navigation cancels the pending timer and ticks at once;
//! the superseded fetch still finishes on the wire and is discarded.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use kgi_layout::{
    BlockProxy, EdgeProxy, HeightProxy, TimelineStore, Viewport, ViewportController,
};
use kgi_types::{AppConfig, BlockHash, BlockHashById, Snapshot};
use kurbo::{Point, Vec2};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::TimelineConfig;
use crate::info::BlockInformation;
use crate::listeners::Listeners;
use crate::navigation::{NavigationInput, TrackingMode, TrackingTarget};
use crate::source::{DataSource, FetchError};
use crate::tracker::{OutcomeKind, TickOutcome, Ticket, Tracker};

// ============================================================================
// Error Type
// ============================================================================

/// Errors from the timeline handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("timeline shut down")]
    Shutdown,
    #[error("block {0} is not on screen")]
    UnknownBlock(u64),
}

// ============================================================================
// Emitted state
// ============================================================================

/// Everything a renderer needs for one frame.
///
/// Proxy positions are in timeline coordinates; add [`offset`](Self::offset)
/// to get screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineFrame {
    pub viewport: Viewport,
    pub offset: Vec2,
    pub is_animating: bool,
    pub blocks: Vec<BlockProxy>,
    pub edges: Vec<EdgeProxy>,
    pub heights: Vec<HeightProxy>,
    pub target: TrackingTarget,
    pub is_tracking_head: bool,
    pub fetch_failing: bool,
    pub selected_block: Option<u64>,
}

impl TimelineFrame {
    pub fn to_screen(&self, point: Point) -> Point {
        point + self.offset
    }

    pub fn block(&self, id: u64) -> Option<&BlockProxy> {
        self.blocks.iter().find(|p| p.block.id == id)
    }
}

/// Published after every completed tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Ticks completed so far, discarded ones included.
    pub ticks: u64,
    /// `None` until the first tick completes.
    pub last_outcome: Option<OutcomeKind>,
    /// What the tick was following.
    pub mode: TrackingMode,
    pub block_count: usize,
    pub edge_count: usize,
    pub height_count: usize,
    pub target_height: Option<u64>,
    pub fetch_failing: bool,
}

// ============================================================================
// Commands (internal)
// ============================================================================

enum TimelineCommand {
    // Navigation
    Track(TrackingTarget),
    SetNavigation(NavigationInput),
    ClickBlock {
        block_id: u64,
        reply: oneshot::Sender<Result<(), TimelineError>>,
    },
    ClickHeight(u64),
    ClickDaaScore(u64),

    // Surface
    Resize(Viewport),
    SetListeners(Listeners),

    // Queries
    Frame {
        reply: oneshot::Sender<TimelineFrame>,
    },
    AppConfig {
        reply: oneshot::Sender<Option<AppConfig>>,
    },
    Navigation {
        reply: oneshot::Sender<NavigationInput>,
    },
    BlockInformation {
        reply: oneshot::Sender<Option<BlockInformation>>,
    },

    Shutdown,
}

/// A fetch that finished, tagged with what it was for.
enum Completion {
    Tick {
        ticket: Ticket,
        result: Result<Snapshot, FetchError>,
    },
    Information {
        block_id: u64,
        result: Result<Vec<BlockHashById>, FetchError>,
    },
    AppConfig(Result<AppConfig, FetchError>),
}

// ============================================================================
// TimelineHandle (Send + Sync public API)
// ============================================================================

/// Handle to a running timeline. Cheap to clone.
#[derive(Clone)]
pub struct TimelineHandle {
    tx: mpsc::UnboundedSender<TimelineCommand>,
    ticks: watch::Receiver<TickSummary>,
}

impl TimelineHandle {
    fn send(&self, cmd: TimelineCommand) -> Result<(), TimelineError> {
        self.tx.send(cmd).map_err(|_| TimelineError::Shutdown)
    }

    // ── Navigation ───────────────────────────────────────────────────────

    pub fn track_head(&self) -> Result<(), TimelineError> {
        self.send(TimelineCommand::Track(TrackingTarget::Head))
    }

    pub fn track_height(&self, height: u64) -> Result<(), TimelineError> {
        self.send(TimelineCommand::Track(TrackingTarget::Height(height)))
    }

    pub fn track_hash(&self, hash: impl Into<BlockHash>) -> Result<(), TimelineError> {
        self.send(TimelineCommand::Track(TrackingTarget::Hash(hash.into())))
    }

    pub fn track_daa_score(&self, daa_score: u64) -> Result<(), TimelineError> {
        self.send(TimelineCommand::Track(TrackingTarget::DaaScore(daa_score)))
    }

    /// Replace the navigation input (e.g. the URL query changed) and re-tick.
    pub fn set_navigation(&self, navigation: NavigationInput) -> Result<(), TimelineError> {
        self.send(TimelineCommand::SetNavigation(navigation))
    }

    /// Select an on-screen block and follow its hash.
    pub async fn click_block(&self, block_id: u64) -> Result<(), TimelineError> {
        let (reply, rx) = oneshot::channel();
        self.send(TimelineCommand::ClickBlock { block_id, reply })?;
        rx.await.map_err(|_| TimelineError::Shutdown)?
    }

    pub fn click_height(&self, height: u64) -> Result<(), TimelineError> {
        self.send(TimelineCommand::ClickHeight(height))
    }

    pub fn click_daa_score(&self, daa_score: u64) -> Result<(), TimelineError> {
        self.send(TimelineCommand::ClickDaaScore(daa_score))
    }

    // ── Surface ──────────────────────────────────────────────────────────

    pub fn resize(&self, width: f64, height: f64) -> Result<(), TimelineError> {
        self.send(TimelineCommand::Resize(Viewport::new(width, height)))
    }

    pub fn set_listeners(&self, listeners: Listeners) -> Result<(), TimelineError> {
        self.send(TimelineCommand::SetListeners(listeners))
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub async fn frame(&self) -> Result<TimelineFrame, TimelineError> {
        let (reply, rx) = oneshot::channel();
        self.send(TimelineCommand::Frame { reply })?;
        rx.await.map_err(|_| TimelineError::Shutdown)
    }

    /// Backend metadata, once the startup fetch has landed.
    pub async fn app_config(&self) -> Result<Option<AppConfig>, TimelineError> {
        let (reply, rx) = oneshot::channel();
        self.send(TimelineCommand::AppConfig { reply })?;
        rx.await.map_err(|_| TimelineError::Shutdown)
    }

    pub async fn navigation(&self) -> Result<NavigationInput, TimelineError> {
        let (reply, rx) = oneshot::channel();
        self.send(TimelineCommand::Navigation { reply })?;
        rx.await.map_err(|_| TimelineError::Shutdown)
    }

    pub async fn block_information(&self) -> Result<Option<BlockInformation>, TimelineError> {
        let (reply, rx) = oneshot::channel();
        self.send(TimelineCommand::BlockInformation { reply })?;
        rx.await.map_err(|_| TimelineError::Shutdown)
    }

    /// Watch channel updated after every completed tick.
    pub fn ticks(&self) -> watch::Receiver<TickSummary> {
        self.ticks.clone()
    }

    pub fn shutdown(&self) -> Result<(), TimelineError> {
        self.send(TimelineCommand::Shutdown)
    }
}

// ============================================================================
// TimelineActor (runs in its own task)
// ============================================================================

struct TimelineActor {
    source: Arc<dyn DataSource>,
    tracker: Tracker,
    store: TimelineStore,
    viewport: ViewportController,
    tick_interval: Duration,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
    next_tick: Option<Instant>,
    app_config: Option<AppConfig>,
    /// Block the current (or in-flight) information belongs to.
    informed_block: Option<u64>,
    block_information: Option<BlockInformation>,
    summary: watch::Sender<TickSummary>,
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

impl TimelineActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<TimelineCommand>) {
        self.request_app_config();
        self.start_tick();

        loop {
            let deadline = self.next_tick;
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(TimelineCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(done) = self.pending.next(), if !self.pending.is_empty() => {
                    self.handle_completion(done);
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.start_tick();
                }
            }
        }
        debug!(
            "timeline actor shutting down ({} fetches abandoned)",
            self.pending.len()
        );
    }

    fn handle_command(&mut self, cmd: TimelineCommand) {
        match cmd {
            // ── Navigation ───────────────────────────────────────────
            TimelineCommand::Track(target) => {
                self.tracker.track(target);
                self.start_tick();
            }
            TimelineCommand::SetNavigation(navigation) => {
                self.tracker.set_navigation(navigation);
                self.start_tick();
            }
            TimelineCommand::ClickBlock { block_id, reply } => {
                let result = match self.store.block(block_id) {
                    Some(proxy) => {
                        let block = proxy.block.clone();
                        self.tracker.click_block(&block);
                        self.start_tick();
                        Ok(())
                    }
                    None => {
                        warn!("click on block {block_id}, which is not on screen");
                        Err(TimelineError::UnknownBlock(block_id))
                    }
                };
                let _ = reply.send(result);
            }
            TimelineCommand::ClickHeight(height) => {
                self.tracker.click_height(height);
                self.start_tick();
            }
            TimelineCommand::ClickDaaScore(daa_score) => {
                self.tracker.click_daa_score(daa_score);
                self.start_tick();
            }

            // ── Surface ──────────────────────────────────────────────
            TimelineCommand::Resize(viewport) => {
                debug!("resize to {}x{}", viewport.width, viewport.height);
                self.store.relayout(viewport);
                self.viewport.resize(viewport, self.store.metrics(), now());
            }
            TimelineCommand::SetListeners(listeners) => {
                self.tracker.set_listeners(listeners);
            }

            // ── Queries ──────────────────────────────────────────────
            TimelineCommand::Frame { reply } => {
                let _ = reply.send(self.frame());
            }
            TimelineCommand::AppConfig { reply } => {
                let _ = reply.send(self.app_config.clone());
            }
            TimelineCommand::Navigation { reply } => {
                let _ = reply.send(self.tracker.navigation().clone());
            }
            TimelineCommand::BlockInformation { reply } => {
                let _ = reply.send(self.block_information.clone());
            }

            TimelineCommand::Shutdown => {}
        }
    }

    fn start_tick(&mut self) {
        self.next_tick = None;
        let plan = self.tracker.begin_tick(&self.store, &mut self.viewport, now());
        let source = self.source.clone();
        let ticket = plan.ticket;
        let request = plan.request;
        self.pending.push(Box::pin(async move {
            let result = request.fetch(source.as_ref()).await;
            Completion::Tick { ticket, result }
        }));
    }

    fn request_app_config(&mut self) {
        let source = self.source.clone();
        self.pending.push(Box::pin(async move {
            Completion::AppConfig(source.get_app_config().await)
        }));
    }

    fn request_information(&mut self, block_id: u64) {
        if self.informed_block == Some(block_id) {
            return;
        }
        let Some(proxy) = self.store.block(block_id) else {
            return;
        };
        self.informed_block = Some(block_id);
        let ids = proxy.block.referenced_ids();
        if ids.is_empty() {
            self.publish_information(block_id, &[]);
            return;
        }

        let source = self.source.clone();
        self.pending.push(Box::pin(async move {
            let result = source.get_block_hashes_by_ids(&ids).await;
            Completion::Information { block_id, result }
        }));
    }

    fn publish_information(&mut self, block_id: u64, lookup: &[BlockHashById]) {
        let Some(proxy) = self.store.block(block_id) else {
            return;
        };
        let children = self
            .store
            .children_of(block_id)
            .into_iter()
            .map(|b| b.block_hash.clone())
            .collect();
        let info = BlockInformation::resolve(proxy.block.clone(), lookup, children);
        self.tracker.listeners().block_information_changed(&info);
        self.block_information = Some(info);
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Tick { ticket, result } => {
                let outcome = self.tracker.complete(
                    ticket,
                    result,
                    &mut self.store,
                    &mut self.viewport,
                    now(),
                );
                if let TickOutcome::Applied { selected_block, .. } = &outcome {
                    match selected_block {
                        Some(id) => self.request_information(*id),
                        None => {
                            self.informed_block = None;
                            self.block_information = None;
                        }
                    }
                }
                if self.tracker.is_latest(ticket) {
                    self.next_tick = Some(Instant::now() + self.tick_interval);
                }
                self.publish_summary(&outcome);
            }
            Completion::Information { block_id, result } => {
                if self.store.selected_block() != Some(block_id) {
                    trace!("dropping information for deselected block {block_id}");
                    return;
                }
                match result {
                    Ok(lookup) => self.publish_information(block_id, &lookup),
                    Err(e) => {
                        warn!("block information for {block_id} failed: {e}");
                        // Retry on the next tick that selects it.
                        self.informed_block = None;
                        self.tracker.set_fetch_failing(true);
                    }
                }
            }
            Completion::AppConfig(result) => match result {
                Ok(config) => {
                    info!("backend: {config}");
                    self.app_config = Some(config);
                }
                Err(e) => {
                    warn!("app config fetch failed: {e}");
                    self.tracker.set_fetch_failing(true);
                }
            },
        }
    }

    fn publish_summary(&self, outcome: &TickOutcome) {
        let block_count = self.store.block_count();
        let edge_count = self.store.edge_count();
        let height_count = self.store.height_count();
        let target_height = self.viewport.target_height();
        let fetch_failing = self.tracker.fetch_failing();
        let mode = self.tracker.target().mode();
        self.summary.send_modify(|summary| {
            summary.ticks += 1;
            summary.last_outcome = Some(outcome.kind());
            summary.mode = mode;
            summary.block_count = block_count;
            summary.edge_count = edge_count;
            summary.height_count = height_count;
            summary.target_height = target_height;
            summary.fetch_failing = fetch_failing;
        });
    }

    fn frame(&self) -> TimelineFrame {
        let now = now();
        TimelineFrame {
            viewport: self.viewport.viewport(),
            offset: self.viewport.offset_at(now),
            is_animating: self.viewport.is_animating(now),
            blocks: self.store.blocks().cloned().collect(),
            edges: self.store.edges().cloned().collect(),
            heights: self.store.heights().cloned().collect(),
            target: self.tracker.target(),
            is_tracking_head: self.tracker.is_tracking_head(),
            fetch_failing: self.tracker.fetch_failing(),
            selected_block: self.store.selected_block(),
        }
    }
}

// ============================================================================
// Public spawn function
// ============================================================================

/// Start polling `source` on a new tokio task.
///
/// The first tick and the app-config fetch start immediately.
pub fn spawn_timeline(
    config: TimelineConfig,
    navigation: NavigationInput,
    source: Arc<dyn DataSource>,
    listeners: Listeners,
) -> TimelineHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let (summary, ticks) = watch::channel(TickSummary::default());
    let viewport = config.viewport();

    info!(
        "starting timeline: {} every {:?}, viewport {}x{}",
        navigation.target(),
        config.tick_interval(),
        viewport.width,
        viewport.height
    );

    let actor = TimelineActor {
        source,
        tracker: Tracker::new(navigation, config.head_margin_multiplier, listeners),
        store: TimelineStore::new(config.geometry.clone(), viewport),
        viewport: ViewportController::with_transition_duration(
            viewport,
            config.transition_duration(),
        ),
        tick_interval: config.tick_interval(),
        pending: FuturesUnordered::new(),
        next_tick: None,
        app_config: None,
        informed_block: None,
        block_information: None,
        summary,
    };
    tokio::spawn(actor.run(rx));
    TimelineHandle { tx, ticks }
}
