//! URL query-string codec for list navigation state.
//!
//! Each list instance ("section") persists its pagination, page size, search
//! query, and filters in the page URL so reloads and back/forward navigation
//! restore the exact view. Sections are namespaced with a `{section}_`
//! prefix — `?discover_page=3&category-science_page=2` holds two independent
//! list states — and the bare names `page`/`pageSize`/`q` are reserved for
//! the sectionless (global) case.
//!
//! ## Minimal URLs
//!
//! Encoding omits anything equal to the section's default: page 1, the
//! configured default page size, an empty search query, and absent filters
//! produce no URL parameters at all. This keeps URLs short and makes
//! encoding idempotent.
//!
//! ## Merge, never replace
//!
//! The query string is shared by every section on the page, so writes are
//! merge patches: [`write_query`] removes the section's own stale keys and
//! appends its current ones while preserving every foreign key untouched.
//!
//! ## Hostile input
//!
//! URLs are hand-editable, so nothing read here is trusted verbatim:
//! unparseable or zero pages fall back to 1, out-of-set page sizes fall back
//! to the configured default, and reserved names never become filters.
//! Malformed parameters are silently defaulted, never an error.

use crate::config::ListConfig;
use indexmap::IndexMap;
use url::form_urlencoded;

/// Parameter names owned by the pagination machinery. Never valid as filter
/// keys, with or without a section prefix.
pub const RESERVED_PARAMS: &[&str] = &["page", "pageSize", "q"];

/// Filter values that mean "no filter": encoding skips them and decoding
/// drops them.
pub const FILTER_CLEARED_VALUES: &[&str] = &["", "all"];

/// Navigation state of one list section.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ListState {
    /// Current page, 1-based. Always at least 1.
    pub page: u32,
    /// Items per page. Always a member of the configured allowed set.
    pub page_size: u32,
    /// Active search query. Empty means no search.
    pub query: String,
    /// Active filters, name → value. Insertion-ordered so encoded URLs are
    /// deterministic.
    pub filters: IndexMap<String, String>,
}

impl ListState {
    /// The state every section starts with: page 1, default page size, no
    /// search, no filters.
    pub fn with_defaults(config: &ListConfig) -> Self {
        Self {
            page: 1,
            page_size: config.default_page_size,
            query: String::new(),
            filters: IndexMap::new(),
        }
    }

    /// True when encoding this state would write no URL parameters.
    pub fn is_default(&self, config: &ListConfig) -> bool {
        self.page == 1
            && self.page_size == config.default_page_size
            && self.query.is_empty()
            && self.filters.is_empty()
    }

    /// True when a search is active.
    pub fn searching(&self) -> bool {
        !self.query.is_empty()
    }
}

/// Build the full query key for a parameter name within a section.
fn param_key(section: &str, name: &str) -> String {
    if section.is_empty() {
        name.to_string()
    } else {
        format!("{section}_{name}")
    }
}

/// If `key` belongs to `section`, return the unprefixed parameter name.
fn owned_name<'a>(section: &str, key: &'a str) -> Option<&'a str> {
    if section.is_empty() {
        Some(key)
    } else {
        key.strip_prefix(section)?.strip_prefix('_')
    }
}

/// Decode a section's navigation state from a query string.
///
/// Accepts the string with or without a leading `?`. Unknown `{section}_*`
/// keys become filters; reserved names and cleared filter values are
/// dropped; invalid page/pageSize values fall back to defaults.
pub fn decode(section: &str, query: &str, config: &ListConfig) -> ListState {
    let mut state = ListState::with_defaults(config);
    for (key, value) in parse_pairs(query) {
        let Some(name) = owned_name(section, &key) else {
            continue;
        };
        match name {
            "page" => state.page = parse_page(&value),
            "pageSize" => state.page_size = parse_page_size(&value, config),
            "q" => state.query = value.trim().to_string(),
            _ => {
                if FILTER_CLEARED_VALUES.contains(&value.as_str()) {
                    continue;
                }
                state.filters.insert(name.to_string(), value);
            }
        }
    }
    state
}

/// Encode a section's navigation state as `(key, value)` pairs, omitting
/// defaults. The pairs are section-prefixed and ready to append to a query
/// string.
pub fn encode(section: &str, state: &ListState, config: &ListConfig) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if state.page > 1 {
        pairs.push((param_key(section, "page"), state.page.to_string()));
    }
    if state.page_size != config.default_page_size {
        pairs.push((param_key(section, "pageSize"), state.page_size.to_string()));
    }
    if !state.query.is_empty() {
        pairs.push((param_key(section, "q"), state.query.clone()));
    }
    for (name, value) in &state.filters {
        if RESERVED_PARAMS.contains(&name.as_str()) {
            log::warn!("section {section:?}: reserved filter key {name:?} not encoded");
            continue;
        }
        if FILTER_CLEARED_VALUES.contains(&value.as_str()) {
            continue;
        }
        pairs.push((param_key(section, name), value.clone()));
    }
    pairs
}

/// Merge a section's state into an existing query string.
///
/// Foreign keys — other sections', or unrelated concerns like auth redirect
/// targets — pass through untouched in their original order. The section's
/// own keys are rewritten from scratch, so parameters that returned to their
/// default disappear.
pub fn write_query(section: &str, state: &ListState, config: &ListConfig, existing: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in parse_pairs(existing) {
        if owned_name(section, &key).is_none() {
            serializer.append_pair(&key, &value);
        }
    }
    for (key, value) in encode(section, state, config) {
        serializer.append_pair(&key, &value);
    }
    serializer.finish()
}

fn parse_pairs(query: &str) -> Vec<(String, String)> {
    let trimmed = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(trimmed.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn parse_page(value: &str) -> u32 {
    match value.trim().parse::<u32>() {
        Ok(page) if page >= 1 => page,
        _ => 1,
    }
}

fn parse_page_size(value: &str, config: &ListConfig) -> u32 {
    match value.trim().parse::<u32>() {
        Ok(size) => config.sanitize_page_size(size),
        Err(_) => config.default_page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ListConfig {
        ListConfig::default()
    }

    #[test]
    fn decode_empty_query_yields_defaults() {
        let state = decode("discover", "", &config());
        assert_eq!(state, ListState::with_defaults(&config()));
    }

    #[test]
    fn decode_reads_namespaced_params() {
        let state = decode("discover", "?discover_page=3&discover_pageSize=48", &config());
        assert_eq!(state.page, 3);
        assert_eq!(state.page_size, 48);
        assert!(state.query.is_empty());
        assert!(state.filters.is_empty());
    }

    #[test]
    fn decode_ignores_other_sections() {
        let state = decode("discover", "?featured_page=9&discover_page=2", &config());
        assert_eq!(state.page, 2);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn decode_defaults_invalid_page() {
        let c = config();
        assert_eq!(decode("d", "?d_page=0", &c).page, 1);
        assert_eq!(decode("d", "?d_page=-3", &c).page, 1);
        assert_eq!(decode("d", "?d_page=abc", &c).page, 1);
    }

    #[test]
    fn decode_defaults_out_of_set_page_size() {
        let c = config();
        assert_eq!(decode("d", "?d_pageSize=25", &c).page_size, 48);
        assert_eq!(decode("d", "?d_pageSize=junk", &c).page_size, 48);
        assert_eq!(decode("d", "?d_pageSize=72", &c).page_size, 72);
    }

    #[test]
    fn decode_collects_filters() {
        let state = decode("d", "?d_category=science&d_sort=new", &config());
        assert_eq!(state.filters.get("category").map(String::as_str), Some("science"));
        assert_eq!(state.filters.get("sort").map(String::as_str), Some("new"));
    }

    #[test]
    fn decode_drops_cleared_filter_values() {
        let state = decode("d", "?d_category=all&d_sort=", &config());
        assert!(state.filters.is_empty());
    }

    #[test]
    fn decode_trims_search_query() {
        let state = decode("d", "?d_q=%20sherlock%20", &config());
        assert_eq!(state.query, "sherlock");
    }

    #[test]
    fn decode_global_section_uses_bare_names() {
        let state = decode("", "?page=4&q=ada&category=science", &config());
        assert_eq!(state.page, 4);
        assert_eq!(state.query, "ada");
        assert_eq!(state.filters.get("category").map(String::as_str), Some("science"));
    }

    #[test]
    fn prefix_match_is_exact() {
        // "discovery_page" must not leak into section "discover".
        let state = decode("discover", "?discovery_page=7", &config());
        assert_eq!(state.page, 1);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn encode_default_state_writes_nothing() {
        let c = config();
        assert!(encode("d", &ListState::with_defaults(&c), &c).is_empty());
    }

    #[test]
    fn encode_skips_reserved_filter_keys() {
        let c = config();
        let mut state = ListState::with_defaults(&c);
        state.filters.insert("page".into(), "99".into());
        state.filters.insert("category".into(), "science".into());
        let pairs = encode("d", &state, &c);
        assert_eq!(pairs, vec![("d_category".to_string(), "science".to_string())]);
    }

    #[test]
    fn write_query_preserves_foreign_keys() {
        let c = config();
        let mut state = ListState::with_defaults(&c);
        state.page = 2;
        let query = write_query("d", &state, &c, "?other_page=5&redirect=%2Fhome");
        assert_eq!(query, "other_page=5&redirect=%2Fhome&d_page=2");
    }

    #[test]
    fn write_query_removes_stale_owned_keys() {
        let c = config();
        let state = ListState::with_defaults(&c);
        let query = write_query("d", &state, &c, "?d_page=9&d_category=old&x=1");
        assert_eq!(query, "x=1");
    }

    #[test]
    fn write_query_percent_encodes_values() {
        let c = config();
        let mut state = ListState::with_defaults(&c);
        state.query = "tom & jerry".into();
        let query = write_query("d", &state, &c, "");
        assert_eq!(query, "d_q=tom+%26+jerry");
        assert_eq!(decode("d", &query, &c).query, "tom & jerry");
    }

    #[test]
    fn roundtrip_nontrivial_state() {
        let c = config();
        let mut state = ListState::with_defaults(&c);
        state.page = 5;
        state.page_size = 100;
        state.query = "holmes".into();
        state.filters.insert("category".into(), "mystery".into());
        let encoded = write_query("discover", &state, &c, "");
        assert_eq!(decode("discover", &encoded, &c), state);
    }
}
