//! Single-slot callbacks the timeline notifies.
//!
//! Each slot holds at most one callback; setting it again replaces the old
//! one. Callbacks run synchronously on the poller task, so keep them short.
//! The two boolean signals only fire when their value changes.

use kgi_types::Block;

use crate::info::BlockInformation;

type BlockCallback = Box<dyn Fn(&Block) + Send + Sync>;
type ValueCallback = Box<dyn Fn(u64) + Send + Sync>;
type FlagCallback = Box<dyn Fn(bool) + Send + Sync>;
type InfoCallback = Box<dyn Fn(&BlockInformation) + Send + Sync>;

/// Callback slots, registered once and handed to the poller.
#[derive(Default)]
pub struct Listeners {
    block_clicked: Option<BlockCallback>,
    height_clicked: Option<ValueCallback>,
    daa_score_clicked: Option<ValueCallback>,
    tracking_changed: Option<FlagCallback>,
    fetch_failing_changed: Option<FlagCallback>,
    block_information_changed: Option<InfoCallback>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_block_clicked(mut self, f: impl Fn(&Block) + Send + Sync + 'static) -> Self {
        self.set_block_clicked(f);
        self
    }

    pub fn on_height_clicked(mut self, f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.set_height_clicked(f);
        self
    }

    pub fn on_daa_score_clicked(mut self, f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.set_daa_score_clicked(f);
        self
    }

    /// `true` while following the head.
    pub fn on_tracking_changed(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.set_tracking_changed(f);
        self
    }

    pub fn on_fetch_failing_changed(mut self, f: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.set_fetch_failing_changed(f);
        self
    }

    pub fn on_block_information_changed(
        mut self,
        f: impl Fn(&BlockInformation) + Send + Sync + 'static,
    ) -> Self {
        self.set_block_information_changed(f);
        self
    }

    pub fn set_block_clicked(&mut self, f: impl Fn(&Block) + Send + Sync + 'static) {
        self.block_clicked = Some(Box::new(f));
    }

    pub fn set_height_clicked(&mut self, f: impl Fn(u64) + Send + Sync + 'static) {
        self.height_clicked = Some(Box::new(f));
    }

    pub fn set_daa_score_clicked(&mut self, f: impl Fn(u64) + Send + Sync + 'static) {
        self.daa_score_clicked = Some(Box::new(f));
    }

    pub fn set_tracking_changed(&mut self, f: impl Fn(bool) + Send + Sync + 'static) {
        self.tracking_changed = Some(Box::new(f));
    }

    pub fn set_fetch_failing_changed(&mut self, f: impl Fn(bool) + Send + Sync + 'static) {
        self.fetch_failing_changed = Some(Box::new(f));
    }

    pub fn set_block_information_changed(
        &mut self,
        f: impl Fn(&BlockInformation) + Send + Sync + 'static,
    ) {
        self.block_information_changed = Some(Box::new(f));
    }

    // ── Emit ─────────────────────────────────────────────────────────────

    pub(crate) fn block_clicked(&self, block: &Block) {
        if let Some(f) = &self.block_clicked {
            f(block);
        }
    }

    pub(crate) fn height_clicked(&self, height: u64) {
        if let Some(f) = &self.height_clicked {
            f(height);
        }
    }

    pub(crate) fn daa_score_clicked(&self, daa_score: u64) {
        if let Some(f) = &self.daa_score_clicked {
            f(daa_score);
        }
    }

    pub(crate) fn tracking_changed(&self, is_tracking_head: bool) {
        if let Some(f) = &self.tracking_changed {
            f(is_tracking_head);
        }
    }

    pub(crate) fn fetch_failing_changed(&self, failing: bool) {
        if let Some(f) = &self.fetch_failing_changed {
            f(failing);
        }
    }

    pub(crate) fn block_information_changed(&self, info: &BlockInformation) {
        if let Some(f) = &self.block_information_changed {
            f(info);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("block_clicked", &self.block_clicked.is_some())
            .field("height_clicked", &self.height_clicked.is_some())
            .field("daa_score_clicked", &self.daa_score_clicked.is_some())
            .field("tracking_changed", &self.tracking_changed.is_some())
            .field("fetch_failing_changed", &self.fetch_failing_changed.is_some())
            .field("block_information_changed", &self.block_information_changed.is_some())
            .finish()
    }
}
