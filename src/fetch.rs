//! Data fetch coordination for one list section.
//!
//! [`ListLoader`] owns the section's [`Listing`] and the lifecycle around
//! refreshing it: `Idle → Loading → {Succeeded, Failed}`, back to `Loading`
//! on the next parameter change. The loader never performs I/O itself — it
//! hands out [`PageRequest`]/[`SearchRequest`] descriptors for the host to
//! execute and accepts the results back through `complete_*`. The network
//! call is the only suspension point in the whole engine, and it lives on
//! the host's side of this boundary.
//!
//! ## Last request wins
//!
//! Every request carries a sequence number from a per-section monotonic
//! counter. A completion whose sequence is not the latest issued is
//! discarded without touching any state: fast page flipping can land the
//! page-1 response *after* the page-2 response, and the stale page-1 items
//! must never flash into a view that has moved on. There is no hard
//! cancellation — the calls are idempotent reads, so discarding the result
//! is sufficient.
//!
//! ## Loading indicators
//!
//! The first-ever load of a section reports [`LoadingKind::Full`] (the UI
//! shows a full-surface placeholder); every later reload reports
//! [`LoadingKind::Pagination`] so the rest of the list chrome stays mounted.
//!
//! ## Errors
//!
//! A failed fetch keeps the previously displayed items — stale-while-error
//! beats blanking the screen — and records a single section-scoped error.
//! There is no automatic retry; the next user-driven parameter change issues
//! a fresh request and clears the error.
//!
//! ## Search
//!
//! A search submission suspends the paginated fetch loop and, once
//! completed, replaces the listing with the search result (count = item
//! count, one page). The pre-search listing is captured in a single
//! snapshot slot at submit time; chained searches overwrite the slot, never
//! stack it. Clearing the search restores the snapshot, or asks for a fresh
//! paginated fetch when none exists (a session mounted straight into a
//! search URL has nothing to restore).

use crate::source::SourceError;
use crate::types::{CharacterSummary, Listing};
use indexmap::IndexMap;

/// Fetch lifecycle of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Which loading indicator the UI should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingKind {
    None,
    /// First-ever load: nothing on screen yet, show the full placeholder.
    Full,
    /// A reload with items already on screen: show the narrow indicator.
    Pagination,
}

/// A paginated list request for the host to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub seq: u64,
    pub page: u32,
    pub page_size: u32,
    pub filters: IndexMap<String, String>,
}

/// A search request for the host to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

/// Whether a completion was applied or discarded as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// What clearing a search requires from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRestore {
    /// The pre-search listing was restored in place; nothing to fetch.
    Restored,
    /// No snapshot existed; issue a fresh paginated fetch.
    NeedsRefetch,
}

/// Owner of one section's listing and fetch state machine.
pub struct ListLoader {
    section: String,
    next_seq: u64,
    /// Sequence of the latest issued request, while it is in flight.
    inflight: Option<u64>,
    phase: LoadPhase,
    listing: Listing,
    /// True once any load has completed successfully.
    settled: bool,
    error: Option<SourceError>,
    search_active: bool,
    snapshot: Option<Listing>,
}

impl ListLoader {
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            next_seq: 0,
            inflight: None,
            phase: LoadPhase::Idle,
            listing: Listing::empty(),
            settled: false,
            error: None,
            search_active: false,
            snapshot: None,
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&SourceError> {
        self.error.as_ref()
    }

    pub fn search_active(&self) -> bool {
        self.search_active
    }

    /// True once the section has completed at least one load. The deep-link
    /// resolver waits for this before concluding an id is missing.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn loading(&self) -> LoadingKind {
        match self.phase {
            LoadPhase::Loading if !self.settled => LoadingKind::Full,
            LoadPhase::Loading => LoadingKind::Pagination,
            _ => LoadingKind::None,
        }
    }

    /// Issue a paginated fetch for the current navigation parameters. Any
    /// in-flight request is superseded; its eventual completion will be
    /// discarded. Clears the section error — re-navigating is the manual
    /// retry.
    pub fn request_page(
        &mut self,
        page: u32,
        page_size: u32,
        filters: IndexMap<String, String>,
    ) -> PageRequest {
        let seq = self.issue();
        log::debug!(
            "fetch[{}]: #{seq} page {page} size {page_size} filters {:?}",
            self.section,
            filters.keys().collect::<Vec<_>>()
        );
        PageRequest {
            seq,
            page,
            page_size,
            filters,
        }
    }

    /// Issue a search. Suspends the paginated fetch loop until cleared and
    /// snapshots the currently displayed listing for the eventual restore
    /// (only once something real has loaded — a search submitted before the
    /// first load has nothing worth restoring).
    pub fn request_search(&mut self, query: &str) -> SearchRequest {
        if self.settled {
            self.snapshot = Some(self.listing.clone());
        }
        self.search_active = true;
        let seq = self.issue();
        log::debug!("fetch[{}]: #{seq} search {query:?}", self.section);
        SearchRequest {
            seq,
            query: query.to_string(),
        }
    }

    /// Apply a paginated fetch result. Returns [`Completion::Stale`] when a
    /// newer request has been issued since; stale results leave listing,
    /// phase, and error untouched.
    pub fn complete_page(
        &mut self,
        seq: u64,
        result: Result<Listing, SourceError>,
    ) -> Completion {
        if !self.accept(seq) {
            return Completion::Stale;
        }
        match result {
            Ok(listing) => {
                self.listing = listing;
                self.phase = LoadPhase::Succeeded;
                self.settled = true;
            }
            Err(e) => {
                log::debug!("fetch[{}]: #{seq} failed: {e}", self.section);
                self.phase = LoadPhase::Failed;
                self.error = Some(e);
            }
        }
        Completion::Applied
    }

    /// Apply a search result. Same staleness rules as [`complete_page`];
    /// the listing becomes the search items with `total_count` equal to the
    /// item count.
    ///
    /// [`complete_page`]: Self::complete_page
    pub fn complete_search(
        &mut self,
        seq: u64,
        result: Result<Vec<CharacterSummary>, SourceError>,
    ) -> Completion {
        if !self.accept(seq) {
            return Completion::Stale;
        }
        match result {
            Ok(items) => {
                self.listing = Listing::from_search(items);
                self.phase = LoadPhase::Succeeded;
                self.settled = true;
            }
            Err(e) => {
                log::debug!("fetch[{}]: search #{seq} failed: {e}", self.section);
                self.phase = LoadPhase::Failed;
                self.error = Some(e);
            }
        }
        Completion::Applied
    }

    /// Leave search mode. Restores the pre-search snapshot when one exists;
    /// otherwise the caller must issue a fresh paginated fetch. Any
    /// in-flight search response is invalidated.
    pub fn clear_search(&mut self) -> SearchRestore {
        self.search_active = false;
        self.inflight = None;
        match self.snapshot.take() {
            Some(original) => {
                self.listing = original;
                self.phase = LoadPhase::Succeeded;
                SearchRestore::Restored
            }
            None => SearchRestore::NeedsRefetch,
        }
    }

    fn issue(&mut self) -> u64 {
        self.next_seq += 1;
        self.inflight = Some(self.next_seq);
        self.phase = LoadPhase::Loading;
        self.error = None;
        self.next_seq
    }

    fn accept(&mut self, seq: u64) -> bool {
        if self.inflight != Some(seq) {
            log::debug!(
                "fetch[{}]: discarding stale response #{seq} (latest {:?})",
                self.section,
                self.inflight
            );
            return false;
        }
        self.inflight = None;
        true
    }
}
