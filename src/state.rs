//! Per-section list state store.
//!
//! [`ListStore`] is the single writer of a section's [`ListState`]. Every
//! mutation re-encodes the state into the shared URL query string through
//! the codec in [`query`](crate::query), and reports what the host shell
//! must do next as a [`StoreUpdate`]: rewrite the address bar (always a
//! history *replace* — page flipping must not bury the back button under
//! one entry per page), scroll the list back to the top, or nothing.
//!
//! The store also runs the reverse direction: [`ListStore::sync_from_url`]
//! re-derives state from the URL on mount and on every external URL change
//! (back/forward navigation, another component rewriting the query string).
//! It adopts the decoded state only when it differs from memory, so applying
//! it twice without an intervening URL change is a no-op — that idempotence
//! is what makes back/forward restore prior pagination without fetch loops.
//!
//! Failure semantics: none. Malformed URL parameters default silently inside
//! the codec; nothing here errors or retries. Fetch failures belong to
//! [`fetch`](crate::fetch).

use crate::config::ListConfig;
use crate::query::{self, FILTER_CLEARED_VALUES, ListState, RESERVED_PARAMS};
use indexmap::IndexMap;

/// What the host must do after a store mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreUpdate {
    /// New full query string for the address bar. Always a history replace.
    pub replace_query: Option<String>,
    /// Scroll the list viewport back to the top.
    pub scroll_to_top: bool,
    /// The in-memory state changed; consumers should re-read it.
    pub changed: bool,
}

impl StoreUpdate {
    fn unchanged() -> Self {
        Self::default()
    }
}

/// Owner of one section's navigation state.
pub struct ListStore {
    section: String,
    config: ListConfig,
    state: ListState,
    /// Last known full URL query string, shared with other sections.
    query_string: String,
    initialized: bool,
}

impl ListStore {
    pub fn new(section: impl Into<String>, config: ListConfig) -> Self {
        let state = ListState::with_defaults(&config);
        Self {
            section: section.into(),
            config,
            state,
            query_string: String::new(),
            initialized: false,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// True after the first URL→state reconciliation. Consumers must not
    /// fetch before this, or a `?section_page=5` URL would briefly fetch
    /// page 1.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The store's view of the shared query string.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Re-derive state from the URL. Called on mount and whenever the URL
    /// changes externally. Adopts the decoded state only when it differs
    /// from memory; idempotent for a given query string.
    pub fn sync_from_url(&mut self, url_query: &str) -> StoreUpdate {
        let decoded = query::decode(&self.section, url_query, &self.config);
        self.query_string = url_query.strip_prefix('?').unwrap_or(url_query).to_string();
        let first = !self.initialized;
        self.initialized = true;
        if decoded == self.state && !first {
            return StoreUpdate::unchanged();
        }
        if decoded != self.state {
            log::debug!(
                "list-state[{}]: url sync page {} -> {}",
                self.section,
                self.state.page,
                decoded.page
            );
            self.state = decoded;
        }
        StoreUpdate {
            replace_query: None,
            scroll_to_top: false,
            changed: true,
        }
    }

    /// Jump to a page. Values below 1 clamp to 1.
    pub fn change_page(&mut self, page: u32) -> StoreUpdate {
        let page = page.max(1);
        if page == self.state.page {
            return StoreUpdate::unchanged();
        }
        log::debug!(
            "list-state[{}]: page {} -> {}",
            self.section,
            self.state.page,
            page
        );
        self.state.page = page;
        self.publish(true)
    }

    /// Change the page size and restart at page 1. Mid-list there is no
    /// well-defined "current position" at a new size, so the contract is
    /// always page 1. Out-of-set sizes fall back to the configured default.
    pub fn change_page_size(&mut self, size: u32) -> StoreUpdate {
        let size = self.config.sanitize_page_size(size);
        if size == self.state.page_size && self.state.page == 1 {
            return StoreUpdate::unchanged();
        }
        log::debug!(
            "list-state[{}]: page size {} -> {}, page reset",
            self.section,
            self.state.page_size,
            size
        );
        self.state.page_size = size;
        self.state.page = 1;
        self.publish(true)
    }

    /// Return to page 1 without touching page size, search, or filters.
    /// Used whenever search/filter criteria change, since a stale page
    /// number could exceed the new result's total pages.
    pub fn reset_pagination(&mut self) -> StoreUpdate {
        if self.state.page == 1 {
            return StoreUpdate::unchanged();
        }
        self.state.page = 1;
        self.publish(false)
    }

    /// Store a search query (trimmed) and reset pagination. An empty or
    /// whitespace-only query clears the search, likewise resetting.
    pub fn set_search_query(&mut self, q: &str) -> StoreUpdate {
        let q = q.trim();
        if q == self.state.query && self.state.page == 1 {
            return StoreUpdate::unchanged();
        }
        log::debug!("list-state[{}]: query {:?} -> {:?}", self.section, self.state.query, q);
        self.state.query = q.to_string();
        self.state.page = 1;
        self.publish(false)
    }

    /// Merge a filter patch. A value of `""` or `"all"` removes the key
    /// instead of storing it; reserved names are dropped with a warning.
    /// Resets pagination unless `reset_page` is false.
    pub fn set_filters(
        &mut self,
        patch: IndexMap<String, String>,
        reset_page: bool,
    ) -> StoreUpdate {
        let before = self.state.clone();
        for (name, value) in patch {
            if RESERVED_PARAMS.contains(&name.as_str()) {
                log::warn!(
                    "list-state[{}]: reserved name {name:?} rejected as filter key",
                    self.section
                );
                continue;
            }
            if FILTER_CLEARED_VALUES.contains(&value.as_str()) {
                self.state.filters.shift_remove(&name);
            } else {
                self.state.filters.insert(name, value);
            }
        }
        if reset_page {
            self.state.page = 1;
        }
        if self.state == before {
            return StoreUpdate::unchanged();
        }
        self.publish(false)
    }

    /// Remove every filter owned by this section, leaving page, page size,
    /// and search untouched.
    pub fn clear_filters(&mut self) -> StoreUpdate {
        if self.state.filters.is_empty() {
            return StoreUpdate::unchanged();
        }
        self.state.filters.clear();
        self.publish(false)
    }

    /// Re-encode state into the shared query string and build the update.
    fn publish(&mut self, scroll_to_top: bool) -> StoreUpdate {
        let next = query::write_query(&self.section, &self.state, &self.config, &self.query_string);
        let replace_query = if next == self.query_string {
            None
        } else {
            self.query_string = next.clone();
            Some(next)
        };
        StoreUpdate {
            replace_query,
            scroll_to_top,
            changed: true,
        }
    }
}
