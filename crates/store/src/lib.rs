// In crates/store/src/lib.rs

pub mod fetch;
pub mod slice;

use core_types::{HierarchyNode, TwrSnapshot};
use events::StateUpdate;

pub use fetch::{FetchOutcome, PortfolioSource, fetch_hierarchy, fetch_initial_data, fetch_twr};
pub use slice::{Slice, Status};

/// The application state: the latest hierarchy and TWR snapshot.
///
/// Both slices are written only through the methods below. Every change bumps
/// `revision`, which is what the view watches to decide whether to redraw.
#[derive(Debug, Default)]
pub struct Store {
    hierarchy: Slice<HierarchyNode>,
    twr: Slice<TwrSnapshot>,
    notice: Option<String>,
    revision: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hierarchy(&self) -> &Slice<HierarchyNode> {
        &self.hierarchy
    }

    pub fn twr(&self) -> &Slice<TwrSnapshot> {
        &self.twr
    }

    /// The last `System.Error` notice pushed by the hub.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn begin_hierarchy_fetch(&mut self) {
        self.hierarchy.set_loading();
        self.bump();
    }

    pub fn begin_twr_fetch(&mut self) {
        self.twr.set_loading();
        self.bump();
    }

    /// Records the result of a request/response fetch.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Hierarchy(Ok(root)) => self.hierarchy.set_success(root),
            FetchOutcome::Hierarchy(Err(error)) => self.hierarchy.set_error(error),
            FetchOutcome::Twr(Ok(snapshot)) => self.twr.set_success(snapshot),
            FetchOutcome::Twr(Err(error)) => self.twr.set_error(error),
        }
        self.bump();
    }

    /// Applies a routed push update. Push data skips the loading phase and
    /// overwrites the slice directly.
    pub fn apply(&mut self, update: StateUpdate) {
        tracing::debug!(target_slice = update.target(), "Applying push update.");
        match update {
            StateUpdate::Twr(snapshot) => self.twr.set_success(snapshot),
            StateUpdate::Hierarchy(root) => self.hierarchy.set_success(root),
            StateUpdate::ServiceError(notice) => self.notice = Some(notice),
        }
        self.bump();
    }

    pub fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.bump();
        }
    }

    /// Resets both slices to `Idle`.
    pub fn clear(&mut self) {
        self.hierarchy.clear();
        self.twr.clear();
        self.notice = None;
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
