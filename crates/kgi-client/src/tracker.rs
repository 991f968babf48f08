//! Tracking state machine, independent of any runtime.
//!
//! The [`Tracker`] decides what each tick fetches and what to do with the
//! answer. It never awaits: the poller calls [`Tracker::begin_tick`], runs
//! the returned [`FetchRequest`] however it likes, and hands the result back
//! to [`Tracker::complete`]. That split keeps the staleness rules testable
//! without a runtime.
//!
//! # Tick Protocol
//!
//! ```text
//! begin_tick ──► TickPlan { ticket, target, request }
//!                      │
//!                 (fetch runs)
//!                      │
//! complete(ticket, result)
//!   ├─ ticket's target ≠ current target    → Discarded (store untouched)
//!   ├─ older than the last applied         → Discarded
//!   ├─ Err, or a head fetch with no blocks → Failed, fetch-failing raised
//!   ├─ hash / DAA score not in response    → Anomaly, store untouched
//!   ├─ snapshot fails validation           → Rejected, store untouched
//!   └─ otherwise                           → Applied, viewport recentred
//! ```
//!
//! There is no await between the staleness check and the apply.

use std::collections::HashMap;
use std::time::Instant;

use kgi_layout::{ApplyReport, Metrics, Repositioning, TimelineStore, ViewportController};
use kgi_types::{Block, BlockHash, Snapshot, SnapshotError};
use tracing::{debug, info, trace, warn};

use crate::listeners::Listeners;
use crate::navigation::{NavigationInput, TrackingTarget};
use crate::source::{FetchError, FetchRequest};

/// Tag attached to one in-flight fetch. Strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What one tick will fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct TickPlan {
    pub ticket: Ticket,
    pub target: TrackingTarget,
    pub request: FetchRequest,
    /// Set when a hash / DAA score target was already live and the viewport
    /// moved to it before the fetch.
    pub optimistic: Option<Repositioning>,
}

/// Why a completed fetch was thrown away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    /// Navigation moved on while the fetch was in flight.
    Stale {
        issued: TrackingTarget,
        current: TrackingTarget,
    },
    /// A newer fetch for the same target was already applied.
    Superseded,
    /// The ticket was never issued (or already completed).
    UnknownTicket,
}

/// A successful fetch that did not contain what it was fetched for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Anomaly {
    HashNotFound(BlockHash),
    DaaScoreNotFound(u64),
}

/// Result of [`Tracker::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Applied {
        report: ApplyReport,
        target_height: u64,
        repositioning: Repositioning,
        selected_block: Option<u64>,
    },
    Discarded(DiscardReason),
    Failed(FetchError),
    Anomaly(Anomaly),
    Rejected(SnapshotError),
}

/// Discriminant of [`TickOutcome`], for summaries and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Applied,
    Discarded,
    Failed,
    Anomaly,
    Rejected,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Applied => "applied",
            OutcomeKind::Discarded => "discarded",
            OutcomeKind::Failed => "failed",
            OutcomeKind::Anomaly => "anomaly",
            OutcomeKind::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TickOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            TickOutcome::Applied { .. } => OutcomeKind::Applied,
            TickOutcome::Discarded(_) => OutcomeKind::Discarded,
            TickOutcome::Failed(_) => OutcomeKind::Failed,
            TickOutcome::Anomaly(_) => OutcomeKind::Anomaly,
            TickOutcome::Rejected(_) => OutcomeKind::Rejected,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TickOutcome::Applied { .. })
    }
}

#[derive(Debug)]
struct InFlight {
    target: TrackingTarget,
    /// Heights kept free right of the head; only meaningful for head fetches.
    head_margin: u64,
}

/// Owner of the navigation input, the two boolean signals and the tickets.
#[derive(Debug)]
pub struct Tracker {
    navigation: NavigationInput,
    listeners: Listeners,
    head_margin_multiplier: f64,
    next_ticket: u64,
    latest: Option<Ticket>,
    last_applied: Option<Ticket>,
    in_flight: HashMap<Ticket, InFlight>,
    is_tracking_head: bool,
    fetch_failing: bool,
}

impl Tracker {
    pub fn new(navigation: NavigationInput, head_margin_multiplier: f64, listeners: Listeners) -> Self {
        let is_tracking_head = navigation.target().is_head();
        Self {
            navigation,
            listeners,
            head_margin_multiplier,
            next_ticket: 0,
            latest: None,
            last_applied: None,
            in_flight: HashMap::new(),
            is_tracking_head,
            fetch_failing: false,
        }
    }

    pub fn navigation(&self) -> &NavigationInput {
        &self.navigation
    }

    pub fn target(&self) -> TrackingTarget {
        self.navigation.target()
    }

    pub fn is_tracking_head(&self) -> bool {
        self.is_tracking_head
    }

    pub fn fetch_failing(&self) -> bool {
        self.fetch_failing
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Replace every listener slot at once.
    pub fn set_listeners(&mut self, listeners: Listeners) {
        self.listeners = listeners;
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    // ── Navigation ───────────────────────────────────────────────────────

    /// Replace the navigation input wholesale (e.g. the URL changed).
    pub fn set_navigation(&mut self, navigation: NavigationInput) {
        self.navigation = navigation;
        self.refresh_tracking();
    }

    /// Follow `target` from the next tick on.
    pub fn track(&mut self, target: TrackingTarget) {
        if target != self.navigation.target() {
            info!("tracking {target}");
        }
        self.navigation.set(&target);
        self.refresh_tracking();
    }

    pub fn click_block(&mut self, block: &Block) {
        self.listeners.block_clicked(block);
        self.track(TrackingTarget::Hash(block.block_hash.clone()));
    }

    pub fn click_height(&mut self, height: u64) {
        self.listeners.height_clicked(height);
        self.track(TrackingTarget::Height(height));
    }

    pub fn click_daa_score(&mut self, daa_score: u64) {
        self.listeners.daa_score_clicked(daa_score);
        self.track(TrackingTarget::DaaScore(daa_score));
    }

    fn refresh_tracking(&mut self) {
        let is_head = self.navigation.target().is_head();
        if is_head != self.is_tracking_head {
            self.is_tracking_head = is_head;
            self.listeners.tracking_changed(is_head);
        }
    }

    /// Raise or clear the fetch-failing signal; listeners hear only changes.
    pub fn set_fetch_failing(&mut self, failing: bool) {
        if failing != self.fetch_failing {
            self.fetch_failing = failing;
            if failing {
                warn!("fetches failing");
            } else {
                info!("fetches recovered");
            }
            self.listeners.fetch_failing_changed(failing);
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────────

    /// Heights kept free right of the head: a share of the half-screen
    /// count, only on landscape viewports.
    pub fn head_margin(&self, metrics: &Metrics) -> u64 {
        if metrics.viewport.is_landscape() {
            (metrics.max_blocks_on_half_screen() as f64 * self.head_margin_multiplier).floor() as u64
        } else {
            0
        }
    }

    /// Evaluate the navigation input and decide this tick's fetch.
    pub fn begin_tick(
        &mut self,
        store: &TimelineStore,
        viewport: &mut ViewportController,
        now: Instant,
    ) -> TickPlan {
        self.refresh_tracking();
        let target = self.navigation.target();
        let metrics = *store.metrics();
        let half = metrics.max_blocks_on_half_screen();
        let around = half + metrics.padding;

        let mut head_margin = 0;
        let mut optimistic = None;
        let request = match &target {
            TrackingTarget::Head => {
                head_margin = self.head_margin(&metrics);
                FetchRequest::Head {
                    height_difference: half + head_margin,
                }
            }
            TrackingTarget::Height(height) => {
                let (start, end) = metrics.visible_height_range(*height);
                FetchRequest::BetweenHeights { start, end }
            }
            TrackingTarget::Hash(hash) => {
                if let Some(block) = store.find_block_by_hash(hash) {
                    optimistic = Some(viewport.set_target_height(block.height, &metrics, now));
                }
                FetchRequest::Hash {
                    hash: hash.clone(),
                    height_difference: around,
                }
            }
            TrackingTarget::DaaScore(daa_score) => {
                if let Some(block) = store.find_block_by_daa_score(*daa_score) {
                    optimistic = Some(viewport.set_target_height(block.height, &metrics, now));
                }
                FetchRequest::DaaScore {
                    daa_score: *daa_score,
                    height_difference: around,
                }
            }
        };

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.latest = Some(ticket);
        self.in_flight.insert(
            ticket,
            InFlight {
                target: target.clone(),
                head_margin,
            },
        );
        debug!("tick {ticket}: {target}, fetching {request}");

        TickPlan {
            ticket,
            target,
            request,
            optimistic,
        }
    }

    /// Handle the result of the fetch issued under `ticket`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Snapshot, FetchError>,
        store: &mut TimelineStore,
        viewport: &mut ViewportController,
        now: Instant,
    ) -> TickOutcome {
        let Some(in_flight) = self.in_flight.remove(&ticket) else {
            warn!("completion for unknown ticket {ticket}");
            return TickOutcome::Discarded(DiscardReason::UnknownTicket);
        };

        let current = self.navigation.target();
        if in_flight.target != current {
            trace!("tick {ticket} stale: issued for {}, now {current}", in_flight.target);
            return TickOutcome::Discarded(DiscardReason::Stale {
                issued: in_flight.target,
                current,
            });
        }
        if self.last_applied.is_some_and(|applied| applied > ticket) {
            trace!("tick {ticket} superseded");
            return TickOutcome::Discarded(DiscardReason::Superseded);
        }

        // An empty head is as useless as no answer at all.
        let result = result.and_then(|snapshot| match snapshot.max_height() {
            None if in_flight.target.is_head() => Err(FetchError::EmptyResponse),
            _ => Ok(snapshot),
        });
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("tick {ticket} fetch failed: {e}");
                self.set_fetch_failing(true);
                return TickOutcome::Failed(e);
            }
        };
        self.set_fetch_failing(false);

        let (target_height, selected_block) = match &in_flight.target {
            TrackingTarget::Head => {
                let max_height = snapshot.max_height().unwrap_or_default();
                (max_height.saturating_sub(in_flight.head_margin), None)
            }
            TrackingTarget::Height(height) => (*height, None),
            TrackingTarget::Hash(hash) => match snapshot.find_by_hash(hash.as_str()) {
                Some(block) => (block.height, Some(block.id)),
                None => {
                    warn!("tick {ticket}: block {} not in its own response", hash.short());
                    return TickOutcome::Anomaly(Anomaly::HashNotFound(hash.clone()));
                }
            },
            TrackingTarget::DaaScore(daa_score) => match snapshot.find_by_daa_score(*daa_score) {
                Some(block) => (block.height, Some(block.id)),
                None => {
                    warn!("tick {ticket}: daa score {daa_score} not in its own response");
                    return TickOutcome::Anomaly(Anomaly::DaaScoreNotFound(*daa_score));
                }
            },
        };

        let report = match store.apply(&snapshot, viewport.viewport()) {
            Ok(report) => report,
            Err(e) => {
                warn!("tick {ticket}: snapshot rejected: {e}");
                return TickOutcome::Rejected(e);
            }
        };
        store.set_selected_block(selected_block);
        let repositioning = viewport.set_target_height(target_height, store.metrics(), now);
        self.last_applied = Some(ticket);

        debug!(
            "tick {ticket} applied: {} blocks, target height {target_height} ({repositioning:?})",
            store.block_count()
        );

        TickOutcome::Applied {
            report,
            target_height,
            repositioning,
            selected_block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgi_layout::{GeometryConfig, Viewport};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn landscape() -> Viewport {
        // half = 5 heights, padding 2
        Viewport::new(1500.0, 600.0)
    }

    fn setup(navigation: NavigationInput) -> (Tracker, TimelineStore, ViewportController) {
        setup_with(navigation, Listeners::default(), landscape())
    }

    fn setup_with(
        navigation: NavigationInput,
        listeners: Listeners,
        viewport: Viewport,
    ) -> (Tracker, TimelineStore, ViewportController) {
        (
            Tracker::new(navigation, 0.25, listeners),
            TimelineStore::new(GeometryConfig::default(), viewport),
            ViewportController::new(viewport),
        )
    }

    /// A straight chain of one block per height.
    fn chain(from: u64, to: u64) -> Snapshot {
        let blocks = (from..=to)
            .map(|h| {
                let block = Block::new(h, h);
                if h > from { block.with_parents(vec![h - 1]) } else { block }
            })
            .collect();
        Snapshot::from_blocks(blocks)
    }

    fn height(h: u64) -> NavigationInput {
        TrackingTarget::Height(h).into()
    }

    #[test]
    fn test_height_fetches_visible_range() {
        let (mut tracker, store, mut viewport) = setup(height(100));
        let plan = tracker.begin_tick(&store, &mut viewport, Instant::now());
        assert_eq!(plan.request, FetchRequest::BetweenHeights { start: 93, end: 107 });
        assert_eq!(plan.target, TrackingTarget::Height(100));
    }

    #[test]
    fn test_head_margin_only_on_landscape() {
        let (mut tracker, store, mut viewport) = setup(NavigationInput::head());
        let plan = tracker.begin_tick(&store, &mut viewport, Instant::now());
        // floor(5 * 0.25) = 1
        assert_eq!(plan.request, FetchRequest::Head { height_difference: 6 });

        // 600x1500: step 375, half = ceil(0.8) = 1, no margin
        let portrait = Viewport::new(600.0, 1500.0);
        let (mut tracker, store, mut viewport) =
            setup_with(NavigationInput::head(), Listeners::default(), portrait);
        let plan = tracker.begin_tick(&store, &mut viewport, Instant::now());
        assert_eq!(plan.request, FetchRequest::Head { height_difference: 1 });
    }

    #[test]
    fn test_head_targets_max_minus_margin() {
        let (mut tracker, mut store, mut viewport) = setup(NavigationInput::head());
        let now = Instant::now();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        let outcome = tracker.complete(plan.ticket, Ok(chain(14, 20)), &mut store, &mut viewport, now);

        match outcome {
            TickOutcome::Applied { target_height, selected_block, .. } => {
                assert_eq!(target_height, 19);
                assert_eq!(selected_block, None);
            }
            other => panic!("expected applied, got {other:?}"),
        }
        assert_eq!(viewport.target_height(), Some(19));
        assert_eq!(store.block_count(), 7);
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let (mut tracker, mut store, mut viewport) = setup(height(5));
        let now = Instant::now();

        let f1 = tracker.begin_tick(&store, &mut viewport, now);
        tracker.track(TrackingTarget::Height(9));
        let f2 = tracker.begin_tick(&store, &mut viewport, now);
        assert!(!tracker.is_latest(f1.ticket));
        assert!(tracker.is_latest(f2.ticket));

        let outcome = tracker.complete(f1.ticket, Ok(chain(0, 7)), &mut store, &mut viewport, now);
        assert_eq!(
            outcome,
            TickOutcome::Discarded(DiscardReason::Stale {
                issued: TrackingTarget::Height(5),
                current: TrackingTarget::Height(9),
            })
        );
        assert!(store.is_empty());

        let outcome = tracker.complete(f2.ticket, Ok(chain(2, 16)), &mut store, &mut viewport, now);
        assert!(outcome.is_applied());
        assert_eq!(store.block_count(), 15);
        assert_eq!(viewport.target_height(), Some(9));
    }

    #[test]
    fn test_stale_failure_does_not_raise_signal() {
        let (mut tracker, mut store, mut viewport) = setup(height(5));
        let now = Instant::now();
        let f1 = tracker.begin_tick(&store, &mut viewport, now);
        tracker.track(TrackingTarget::Height(9));

        let outcome = tracker.complete(
            f1.ticket,
            Err(FetchError::Transport("reset".into())),
            &mut store,
            &mut viewport,
            now,
        );
        assert!(matches!(outcome, TickOutcome::Discarded(_)));
        assert!(!tracker.fetch_failing());
    }

    #[test]
    fn test_older_ticket_for_same_target_is_superseded() {
        let (mut tracker, mut store, mut viewport) = setup(height(5));
        let now = Instant::now();
        let f1 = tracker.begin_tick(&store, &mut viewport, now);
        let f2 = tracker.begin_tick(&store, &mut viewport, now);

        assert!(tracker.complete(f2.ticket, Ok(chain(0, 7)), &mut store, &mut viewport, now).is_applied());
        let outcome = tracker.complete(f1.ticket, Ok(chain(0, 3)), &mut store, &mut viewport, now);
        assert_eq!(outcome, TickOutcome::Discarded(DiscardReason::Superseded));
        assert_eq!(store.block_count(), 8);

        // Each ticket completes at most once.
        let again = tracker.complete(f2.ticket, Ok(chain(0, 1)), &mut store, &mut viewport, now);
        assert_eq!(again, TickOutcome::Discarded(DiscardReason::UnknownTicket));
        assert_eq!(tracker.in_flight_count(), 0);
    }

    #[test]
    fn test_fetch_failing_is_sticky_and_change_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let listeners = Listeners::new().on_fetch_failing_changed(move |f| s.lock().push(f));
        let (mut tracker, mut store, mut viewport) = setup_with(height(5), listeners, landscape());
        let now = Instant::now();

        let plan = tracker.begin_tick(&store, &mut viewport, now);
        tracker.complete(plan.ticket, Ok(chain(0, 7)), &mut store, &mut viewport, now);

        for _ in 0..2 {
            let plan = tracker.begin_tick(&store, &mut viewport, now);
            let outcome = tracker.complete(
                plan.ticket,
                Err(FetchError::EmptyResponse),
                &mut store,
                &mut viewport,
                now,
            );
            assert_eq!(outcome, TickOutcome::Failed(FetchError::EmptyResponse));
            // Last good snapshot is still shown.
            assert_eq!(store.block_count(), 8);
        }
        assert!(tracker.fetch_failing());

        let plan = tracker.begin_tick(&store, &mut viewport, now);
        tracker.complete(plan.ticket, Ok(chain(0, 7)), &mut store, &mut viewport, now);
        assert!(!tracker.fetch_failing());
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn test_hash_selects_and_centres_block() {
        let (mut tracker, mut store, mut viewport) = setup(height(5));
        let now = Instant::now();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        tracker.complete(plan.ticket, Ok(chain(0, 10)), &mut store, &mut viewport, now);

        let hash = store.block(8).unwrap().block.block_hash.clone();
        tracker.track(TrackingTarget::Hash(hash.clone()));
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        assert_eq!(
            plan.request,
            FetchRequest::Hash { hash: hash.clone(), height_difference: 7 }
        );
        // Already live: viewport moves before the fetch resolves.
        assert_eq!(plan.optimistic, Some(Repositioning::Animated));
        assert_eq!(viewport.target_height(), Some(8));

        let outcome = tracker.complete(plan.ticket, Ok(chain(1, 15)), &mut store, &mut viewport, now);
        match outcome {
            TickOutcome::Applied { selected_block, target_height, .. } => {
                assert_eq!(selected_block, Some(8));
                assert_eq!(target_height, 8);
            }
            other => panic!("expected applied, got {other:?}"),
        }
        assert!(store.block(8).unwrap().is_selected);
    }

    #[test]
    fn test_hash_missing_from_response_is_anomaly() {
        let (mut tracker, mut store, mut viewport) = setup(height(5));
        let now = Instant::now();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        tracker.complete(plan.ticket, Ok(chain(0, 10)), &mut store, &mut viewport, now);

        let missing = BlockHash::new("ffff");
        tracker.track(TrackingTarget::Hash(missing.clone()));
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        assert_eq!(plan.optimistic, None);

        let outcome = tracker.complete(plan.ticket, Ok(chain(20, 30)), &mut store, &mut viewport, now);
        assert_eq!(outcome, TickOutcome::Anomaly(Anomaly::HashNotFound(missing)));
        assert!(store.block(0).is_some());
        assert!(store.block(20).is_none());
        assert!(!tracker.fetch_failing());
    }

    #[test]
    fn test_daa_score_target() {
        let (mut tracker, mut store, mut viewport) = setup(TrackingTarget::DaaScore(12).into());
        let now = Instant::now();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        assert_eq!(
            plan.request,
            FetchRequest::DaaScore { daa_score: 12, height_difference: 7 }
        );
        let outcome = tracker.complete(plan.ticket, Ok(chain(5, 19)), &mut store, &mut viewport, now);
        assert!(outcome.is_applied());
        assert_eq!(store.selected_block(), Some(12));
    }

    #[test]
    fn test_rejected_snapshot_keeps_store() {
        let (mut tracker, mut store, mut viewport) = setup(height(5));
        let now = Instant::now();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        tracker.complete(plan.ticket, Ok(chain(0, 7)), &mut store, &mut viewport, now);

        let mut bad = chain(0, 9);
        bad.height_groups.clear();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        let outcome = tracker.complete(plan.ticket, Ok(bad), &mut store, &mut viewport, now);
        assert_eq!(
            outcome,
            TickOutcome::Rejected(SnapshotError::MissingHeightGroup { height: 0 })
        );
        assert_eq!(store.block_count(), 8);
    }

    #[test]
    fn test_empty_head_counts_as_failure() {
        let (mut tracker, mut store, mut viewport) = setup(NavigationInput::head());
        let now = Instant::now();
        let plan = tracker.begin_tick(&store, &mut viewport, now);
        let outcome =
            tracker.complete(plan.ticket, Ok(Snapshot::default()), &mut store, &mut viewport, now);
        assert_eq!(outcome, TickOutcome::Failed(FetchError::EmptyResponse));
        assert!(tracker.fetch_failing());
    }

    #[test]
    fn test_interactions_update_navigation_and_notify() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());
        let listeners = Listeners::new()
            .on_tracking_changed(move |head| e1.lock().push(format!("tracking:{head}")))
            .on_height_clicked(move |h| e2.lock().push(format!("height:{h}")))
            .on_block_clicked(move |b| e3.lock().push(format!("block:{}", b.id)));
        let (mut tracker, _, _) = setup_with(NavigationInput::head(), listeners, landscape());
        assert!(tracker.is_tracking_head());

        tracker.click_height(42);
        assert_eq!(tracker.navigation().to_query(), "?height=42");
        tracker.click_height(43);

        let block = Block::new(7, 3);
        tracker.click_block(&block);
        assert_eq!(tracker.target(), TrackingTarget::Hash(block.block_hash.clone()));

        tracker.track(TrackingTarget::Head);
        assert_eq!(tracker.navigation().to_query(), "");

        assert_eq!(
            *events.lock(),
            vec!["height:42", "tracking:false", "height:43", "block:7", "tracking:true"]
        );
    }
}
