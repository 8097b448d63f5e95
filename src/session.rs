//! Per-section session: the surface rendering components talk to.
//!
//! [`ListSession`] wires one section's [`ListStore`], [`ListLoader`], and
//! [`DeepLinkResolver`] together and exposes exactly what a view needs:
//! the current navigation state, the current listing, loading/error status,
//! the `is_initialized` gate, the resolved detail character, and one handler
//! per store operation.
//!
//! Every handler is synchronous and returns a list of [`Effect`]s for the
//! host shell to perform — URL writes, scrolling, and the fetches that are
//! the engine's only asynchronous boundary. Results come back through the
//! `*_loaded` completion methods (raw JSON in, normalized at the
//! [`source`](crate::source) boundary). [`drive`] runs that loop to
//! quiescence against any [`CatalogSource`], which is how the CLI and the
//! integration tests simulate a browser session.
//!
//! The session is also where the fetch loop "observes" navigation state:
//! after any mutation it compares `(page, page_size, filters)` against the
//! last issued request and fetches only on change, never before the store
//! has completed its first URL reconciliation, and never while a search
//! holds the loop suspended.

use crate::config::ListConfig;
use crate::deeplink::{DeepLinkResolver, DeepLinkState, ResolverAction};
use crate::fetch::{Completion, ListLoader, LoadingKind, PageRequest, SearchRequest, SearchRestore};
use crate::query::ListState;
use crate::source::{self, CatalogSource, SourceError};
use crate::state::{ListStore, StoreUpdate};
use crate::types::{CharacterId, CharacterSummary, Listing};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::VecDeque;

/// An action the host shell must perform on the session's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the address-bar query string. History replace, never push.
    ReplaceQuery(String),
    /// Replace the address-bar path. Cosmetic slug correction.
    ReplacePath(String),
    /// Navigate to a path: the corrective redirect off a dead deep link.
    Navigate(String),
    /// Scroll the list viewport back to the top.
    ScrollToTop,
    /// Execute a paginated list fetch and report back via
    /// [`ListSession::page_loaded`].
    FetchPage(PageRequest),
    /// Execute a search and report back via [`ListSession::search_loaded`].
    Search(SearchRequest),
    /// Point-fetch a character and report back via
    /// [`ListSession::character_loaded`].
    FetchCharacter(CharacterId),
}

/// Why a settled section is showing nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// There are items; not empty at all.
    NonEmpty,
    /// A search or filter is active and matched nothing.
    NoMatches,
    /// The catalog itself has nothing to show.
    EmptyCatalog,
}

/// One list section's complete engine state.
pub struct ListSession {
    resource: String,
    store: ListStore,
    loader: ListLoader,
    resolver: DeepLinkResolver,
    /// Parameters of the last issued page fetch; the change detector.
    last_fetched: Option<(u32, u32, IndexMap<String, String>)>,
    /// Query text of the currently active search, if any.
    active_search: Option<String>,
}

impl ListSession {
    /// `section` namespaces the URL parameters, `base_path` is the list's
    /// path (deep links hang off it), `resource` names the remote
    /// collection.
    pub fn new(
        section: impl Into<String>,
        base_path: impl Into<String>,
        resource: impl Into<String>,
        config: ListConfig,
    ) -> Self {
        let section = section.into();
        Self {
            resource: resource.into(),
            loader: ListLoader::new(section.clone()),
            store: ListStore::new(section, config),
            resolver: DeepLinkResolver::new(base_path),
            last_fetched: None,
            active_search: None,
        }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn state(&self) -> &ListState {
        self.store.state()
    }

    pub fn listing(&self) -> &Listing {
        self.loader.listing()
    }

    pub fn loading(&self) -> LoadingKind {
        self.loader.loading()
    }

    pub fn error(&self) -> Option<&SourceError> {
        self.loader.error()
    }

    /// True only after the first URL→state reconciliation; consumers must
    /// not fetch before this.
    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    pub fn search_active(&self) -> bool {
        self.loader.search_active()
    }

    pub fn deep_link(&self) -> Option<&DeepLinkState> {
        self.resolver.state()
    }

    pub fn detail(&self) -> Option<&CharacterSummary> {
        self.resolver.detail()
    }

    /// Distinguish "this search matched nothing" from "the catalog is
    /// empty". `None` until the section has loaded at least once.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.loader.is_settled() {
            return None;
        }
        let state = self.store.state();
        Some(if !self.loader.listing().items.is_empty() {
            EmptyState::NonEmpty
        } else if self.loader.search_active() || !state.filters.is_empty() {
            EmptyState::NoMatches
        } else {
            EmptyState::EmptyCatalog
        })
    }

    // ------------------------------------------------------------------
    // URL lifecycle
    // ------------------------------------------------------------------

    /// Feed the current URL in — on mount and on every external change
    /// (back/forward, another component rewriting the query string). The
    /// first call completes initialization and issues the initial fetch;
    /// later calls reconcile state, data, and deep link with wherever the
    /// URL went. Idempotent for an unchanged URL.
    pub fn url_changed(&mut self, query: &str, path: &str) -> Vec<Effect> {
        let update = self.store.sync_from_url(query);
        let mut effects = Vec::new();
        if update.changed {
            effects.extend(self.reconcile_data());
        }
        let action =
            self.resolver
                .observe_path(path, self.loader.listing(), self.loader.is_settled());
        effects.extend(action.map(resolver_effect));
        effects
    }

    // ------------------------------------------------------------------
    // Navigation handlers
    // ------------------------------------------------------------------

    pub fn change_page(&mut self, page: u32) -> Vec<Effect> {
        let update = self.store.change_page(page);
        self.after_store_update(update)
    }

    pub fn change_page_size(&mut self, size: u32) -> Vec<Effect> {
        let update = self.store.change_page_size(size);
        self.after_store_update(update)
    }

    pub fn reset_pagination(&mut self) -> Vec<Effect> {
        let update = self.store.reset_pagination();
        self.after_store_update(update)
    }

    pub fn set_filters(&mut self, patch: IndexMap<String, String>, reset_page: bool) -> Vec<Effect> {
        let update = self.store.set_filters(patch, reset_page);
        self.after_store_update(update)
    }

    pub fn clear_filters(&mut self) -> Vec<Effect> {
        let update = self.store.clear_filters();
        self.after_store_update(update)
    }

    /// Submit a search. An empty (or whitespace) query is a clear.
    pub fn submit_search(&mut self, query: &str) -> Vec<Effect> {
        let query = query.trim();
        if query.is_empty() {
            return self.clear_search();
        }
        let update = self.store.set_search_query(query);
        let mut effects = store_effects(update);
        // Resubmitting the identical query is a no-op unless the previous
        // attempt failed — then it is the manual retry.
        if self.active_search.as_deref() != Some(query) || self.loader.error().is_some() {
            self.active_search = Some(query.to_string());
            effects.push(Effect::Search(self.loader.request_search(query)));
        }
        effects
    }

    /// Leave search mode, restoring the pre-search listing when one was
    /// captured, otherwise refetching the current page.
    pub fn clear_search(&mut self) -> Vec<Effect> {
        let update = self.store.set_search_query("");
        let mut effects = store_effects(update);
        if self.active_search.take().is_none() && !self.loader.search_active() {
            return effects;
        }
        match self.loader.clear_search() {
            SearchRestore::Restored => {
                // The restore *is* the data; suppress the change detector.
                self.last_fetched = Some(self.current_params());
            }
            SearchRestore::NeedsRefetch => {
                self.last_fetched = None;
                effects.extend(self.fetch_if_needed());
            }
        }
        effects
    }

    /// Stash a freshly fetched character from router transient state so an
    /// immediately following deep link resolves without a fetch.
    pub fn offer_hint(&mut self, entity: CharacterSummary) -> Vec<Effect> {
        self.resolver.offer_hint(entity);
        let action = self
            .resolver
            .resolve(self.loader.listing(), self.loader.is_settled());
        action.map(resolver_effect).into_iter().collect()
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Apply a paginated fetch result. Stale responses (superseded by a
    /// newer request) are discarded without effect.
    pub fn page_loaded(&mut self, seq: u64, result: Result<Value, SourceError>) -> Vec<Effect> {
        let page_size = self.store.state().page_size;
        let listing = result.and_then(|v| source::normalize_listing(&v, Some(page_size)));
        match self.loader.complete_page(seq, listing) {
            Completion::Stale => Vec::new(),
            Completion::Applied => self.resolve_deep_link(),
        }
    }

    /// Apply a search result.
    pub fn search_loaded(&mut self, seq: u64, result: Result<Value, SourceError>) -> Vec<Effect> {
        let items = result.and_then(|v| source::normalize_search(&v));
        match self.loader.complete_search(seq, items) {
            Completion::Stale => Vec::new(),
            Completion::Applied => self.resolve_deep_link(),
        }
    }

    /// Apply a point-fetch result for a deep-linked character.
    pub fn character_loaded(
        &mut self,
        id: &CharacterId,
        result: Result<Value, SourceError>,
    ) -> Vec<Effect> {
        let entity = result.and_then(|v| source::normalize_character(&v));
        let action = self.resolver.complete_fetch(id, entity);
        action.map(resolver_effect).into_iter().collect()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn after_store_update(&mut self, update: StoreUpdate) -> Vec<Effect> {
        let changed = update.changed;
        let mut effects = store_effects(update);
        if changed {
            effects.extend(self.fetch_if_needed());
        }
        effects
    }

    /// The coordinator's observation point: fetch when the navigation
    /// parameters differ from the last issued request.
    fn fetch_if_needed(&mut self) -> Option<Effect> {
        if !self.store.is_initialized() || self.loader.search_active() {
            return None;
        }
        let params = self.current_params();
        if self.last_fetched.as_ref() == Some(&params) {
            return None;
        }
        let (page, page_size, filters) = params.clone();
        let request = self.loader.request_page(page, page_size, filters);
        self.last_fetched = Some(params);
        Some(Effect::FetchPage(request))
    }

    /// Bring the data layer in line after a URL-driven state change, which
    /// may enter search mode, leave it, or just move within the list.
    fn reconcile_data(&mut self) -> Vec<Effect> {
        let query = self.store.state().query.clone();
        if !query.is_empty() {
            if self.active_search.as_deref() == Some(query.as_str()) {
                return Vec::new();
            }
            self.active_search = Some(query.clone());
            return vec![Effect::Search(self.loader.request_search(&query))];
        }
        let mut effects = Vec::new();
        if self.loader.search_active() {
            self.active_search = None;
            match self.loader.clear_search() {
                SearchRestore::Restored => {
                    self.last_fetched = Some(self.current_params());
                    return effects;
                }
                SearchRestore::NeedsRefetch => self.last_fetched = None,
            }
        }
        effects.extend(self.fetch_if_needed());
        effects
    }

    fn resolve_deep_link(&mut self) -> Vec<Effect> {
        let action = self
            .resolver
            .resolve(self.loader.listing(), self.loader.is_settled());
        action.map(resolver_effect).into_iter().collect()
    }

    fn current_params(&self) -> (u32, u32, IndexMap<String, String>) {
        let s = self.store.state();
        (s.page, s.page_size, s.filters.clone())
    }
}

fn store_effects(update: StoreUpdate) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(query) = update.replace_query {
        effects.push(Effect::ReplaceQuery(query));
    }
    if update.scroll_to_top {
        effects.push(Effect::ScrollToTop);
    }
    effects
}

fn resolver_effect(action: ResolverAction) -> Effect {
    match action {
        ResolverAction::FetchById(id) => Effect::FetchCharacter(id),
        ResolverAction::RewritePath(path) => Effect::ReplacePath(path),
        ResolverAction::RedirectToBase(path) => Effect::Navigate(path),
    }
}

/// Run a session's effect loop to quiescence against a catalog source.
///
/// Fetch effects are executed synchronously and their completions fed back
/// in until only terminal effects (URL writes, scrolls, navigations)
/// remain; those are returned in order for the caller to apply. This is the
/// whole event loop of a browser session, minus the browser.
pub fn drive<S: CatalogSource>(
    session: &mut ListSession,
    catalog: &S,
    effects: Vec<Effect>,
) -> Vec<Effect> {
    let mut queue: VecDeque<Effect> = effects.into();
    let mut terminal = Vec::new();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::FetchPage(request) => {
                let result = catalog.list_page(
                    &session.resource,
                    request.page,
                    request.page_size,
                    &request.filters,
                );
                queue.extend(session.page_loaded(request.seq, result));
            }
            Effect::Search(request) => {
                let result = catalog.search(&session.resource, &request.query);
                queue.extend(session.search_loaded(request.seq, result));
            }
            Effect::FetchCharacter(id) => {
                let result = catalog.get_by_id(&session.resource, &id);
                queue.extend(session.character_loaded(&id, result));
            }
            terminal_effect => terminal.push(terminal_effect),
        }
    }
    terminal
}
