//! End-to-end browsing sessions driven against scripted catalogs.
//!
//! These tests play the host shell: they feed URLs and user actions into a
//! [`ListSession`], perform its fetch effects (in order, out of order, or
//! failing, as each scenario needs), and assert on what a view would see.

use castlist::config::ListConfig;
use castlist::deeplink::DeepLinkState;
use castlist::fetch::{LoadingKind, PageRequest};
use castlist::session::{Effect, EmptyState, ListSession, drive};
use castlist::source::{CatalogSource, SourceError, StaticCatalog};
use castlist::types::{CharacterId, CharacterSummary};
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::cell::Cell;

const BASE: &str = "/dashboard/discover";

fn cast(n: usize) -> Vec<CharacterSummary> {
    (1..=n as u64)
        .map(|id| CharacterSummary {
            id: CharacterId::from(id),
            name: format!("Character {id}"),
            category: None,
            tagline: None,
            avatar_url: None,
        })
        .collect()
}

fn new_session() -> ListSession {
    ListSession::new("discover", BASE, "characters", ListConfig::default())
}

fn page_value(items: &[CharacterSummary], total: u64, pages: u32) -> Value {
    json!({"items": items, "totalCount": total, "totalPages": pages})
}

fn fetch_request(effects: &[Effect]) -> PageRequest {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::FetchPage(r) => Some(r.clone()),
            _ => None,
        })
        .expect("expected a page fetch")
}

/// Catalog wrapper that counts calls and can be told to fail listings.
struct ScriptedCatalog {
    inner: StaticCatalog,
    list_calls: Cell<u32>,
    point_calls: Cell<u32>,
    fail_lists: Cell<bool>,
}

impl ScriptedCatalog {
    fn new(characters: Vec<CharacterSummary>) -> Self {
        Self {
            inner: StaticCatalog::new(characters),
            list_calls: Cell::new(0),
            point_calls: Cell::new(0),
            fail_lists: Cell::new(false),
        }
    }
}

impl CatalogSource for ScriptedCatalog {
    fn list_page(
        &self,
        resource: &str,
        page: u32,
        page_size: u32,
        filters: &IndexMap<String, String>,
    ) -> Result<Value, SourceError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_lists.get() {
            return Err(SourceError::unavailable("catalog down"));
        }
        self.inner.list_page(resource, page, page_size, filters)
    }

    fn get_by_id(&self, resource: &str, id: &CharacterId) -> Result<Value, SourceError> {
        self.point_calls.set(self.point_calls.get() + 1);
        self.inner.get_by_id(resource, id)
    }

    fn search(&self, resource: &str, query: &str) -> Result<Value, SourceError> {
        self.inner.search(resource, query)
    }
}

// ---------------------------------------------------------------------------
// Pagination and reload
// ---------------------------------------------------------------------------

#[test]
fn reload_restores_page_and_size_from_url() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let effects = s.url_changed("?discover_page=2&discover_pageSize=24", BASE);

    let request = fetch_request(&effects);
    assert_eq!((request.page, request.page_size), (2, 24));

    drive(&mut s, &catalog, effects);
    assert_eq!(s.listing().items[0].name, "Character 25");
    assert_eq!(s.listing().total_pages, 3);
}

#[test]
fn back_button_restores_previous_page() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    let fx = s.change_page(2);
    drive(&mut s, &catalog, fx);
    assert_eq!(s.state().page, 2);

    // Browser back: the URL loses the page parameter.
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    assert_eq!(s.state().page, 1);
    assert_eq!(s.listing().items[0].name, "Character 1");
}

#[test]
fn loading_indicator_narrows_after_first_load() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();

    let effects = s.url_changed("", BASE);
    assert_eq!(s.loading(), LoadingKind::Full);
    drive(&mut s, &catalog, effects);
    assert_eq!(s.loading(), LoadingKind::None);

    s.change_page(2);
    assert_eq!(s.loading(), LoadingKind::Pagination);
}

#[test]
fn no_fetch_until_url_reconciled() {
    let mut s = new_session();
    let effects = s.change_page(5);
    assert!(!effects.iter().any(|e| matches!(e, Effect::FetchPage(_))));
}

// ---------------------------------------------------------------------------
// Race: last request wins
// ---------------------------------------------------------------------------

#[test]
fn fast_page_flips_apply_only_the_last_response() {
    let roster = cast(144);
    let mut s = new_session();
    let mount = fetch_request(&s.url_changed("", BASE));
    s.page_loaded(mount.seq, Ok(page_value(&roster[0..48], 144, 3)));

    // Click page 2, then page 3 before page 2 answers.
    let second = fetch_request(&s.change_page(2));
    let third = fetch_request(&s.change_page(3));

    // Page-3 response lands first; the late page-2 response must be dropped.
    s.page_loaded(third.seq, Ok(page_value(&roster[96..144], 144, 3)));
    s.page_loaded(second.seq, Ok(page_value(&roster[48..96], 144, 3)));

    assert_eq!(s.state().page, 3);
    assert_eq!(s.listing().items[0].name, "Character 97");
    assert!(s.error().is_none());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn clearing_a_search_restores_the_exact_pre_search_listing() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    let before = s.listing().clone();

    let fx = s.submit_search("character 5");
    drive(&mut s, &catalog, fx);
    assert!(s.search_active());
    assert_ne!(s.listing(), &before);
    // Search totals come from the result itself, single page.
    assert_eq!(s.listing().total_count, s.listing().items.len() as u64);

    let fx = s.submit_search("");
    drive(&mut s, &catalog, fx);
    assert!(!s.search_active());
    assert_eq!(s.listing(), &before);
}

#[test]
fn search_resets_pagination_and_url() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("?discover_page=2", BASE);
    drive(&mut s, &catalog, fx);

    let effects = s.submit_search("holmes");
    assert!(matches!(&effects[0], Effect::ReplaceQuery(q) if q == "discover_q=holmes"));
    assert_eq!(s.state().page, 1);
}

#[test]
fn restore_after_search_does_not_refetch() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    let lists_before = catalog.list_calls.get();

    let fx = s.submit_search("character 1");
    drive(&mut s, &catalog, fx);
    let fx = s.submit_search("");
    drive(&mut s, &catalog, fx);
    // The snapshot restore is the data; no paginated fetch was issued.
    assert_eq!(catalog.list_calls.get(), lists_before);
}

#[test]
fn clearing_a_mount_time_search_refetches() {
    // Landed straight on a search URL: there is no pre-search listing to
    // restore, so the clear falls back to a normal page fetch.
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("?discover_q=character+7", BASE);
    drive(&mut s, &catalog, fx);
    assert!(s.search_active());

    let fx = s.submit_search("");
    drive(&mut s, &catalog, fx);
    assert!(!s.search_active());
    assert_eq!(s.listing().items.len(), 48);
    assert_eq!(s.listing().total_count, 60);
}

#[test]
fn zero_result_search_is_no_matches_not_empty_catalog() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    let fx = s.submit_search("no such character");
    drive(&mut s, &catalog, fx);
    assert_eq!(s.empty_state(), Some(EmptyState::NoMatches));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn failed_fetch_keeps_previous_items_on_screen() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    let shown = s.listing().clone();

    catalog.fail_lists.set(true);
    let fx = s.change_page(2);
    drive(&mut s, &catalog, fx);

    assert!(s.error().is_some());
    assert_eq!(s.listing(), &shown);

    // Manual retry: re-navigating issues a fresh request and clears the
    // error.
    catalog.fail_lists.set(false);
    let fx = s.change_page(1);
    drive(&mut s, &catalog, fx);
    assert!(s.error().is_none());
    assert_eq!(s.listing().items[0].name, "Character 1");
}

// ---------------------------------------------------------------------------
// Deep links
// ---------------------------------------------------------------------------

#[test]
fn deep_link_on_current_page_resolves_without_point_fetch() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", &format!("{BASE}/42/character-42"));
    drive(&mut s, &catalog, fx);

    assert!(matches!(s.deep_link(), Some(DeepLinkState::ResolvedLocal(_))));
    assert_eq!(s.detail().unwrap().id, CharacterId::from(42));
    assert_eq!(catalog.point_calls.get(), 0);
}

#[test]
fn deep_link_off_page_point_fetches_exactly_once() {
    // Id 55 exists but is beyond the 48 items of page 1.
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", &format!("{BASE}/55/character-55"));
    drive(&mut s, &catalog, fx);

    assert!(matches!(s.deep_link(), Some(DeepLinkState::ResolvedRemote(_))));
    assert_eq!(s.detail().unwrap().name, "Character 55");
    assert_eq!(catalog.point_calls.get(), 1);
}

#[test]
fn wrong_slug_never_blocks_resolution() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", &format!("{BASE}/42/totally-wrong-slug"));
    let terminal = drive(&mut s, &catalog, fx);

    assert_eq!(s.detail().unwrap().id, CharacterId::from(42));
    // The slug is corrected cosmetically, in place.
    assert!(terminal.contains(&Effect::ReplacePath(format!("{BASE}/42/character-42"))));
}

#[test]
fn dead_deep_link_redirects_to_the_list() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", &format!("{BASE}/nonexistent/ghost"));
    let terminal = drive(&mut s, &catalog, fx);

    assert_eq!(s.deep_link(), Some(&DeepLinkState::NotFound));
    assert!(terminal.contains(&Effect::Navigate(BASE.to_string())));

    // The host performs the navigation; the detail view closes.
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);
    assert!(s.detail().is_none());
    assert_eq!(s.deep_link(), None);
}

#[test]
fn deep_link_waits_for_the_list_before_giving_up() {
    let roster = cast(60);
    let mut s = new_session();
    // Path observed while the first page load is still in flight.
    let mount = fetch_request(&s.url_changed("", &format!("{BASE}/55/character-55")));
    assert_eq!(s.deep_link(), Some(&DeepLinkState::Pending));

    // The list lands without id 55; only now does the point fetch go out.
    let effects = s.page_loaded(mount.seq, Ok(page_value(&roster[0..48], 60, 2)));
    assert!(matches!(effects[..], [Effect::FetchCharacter(ref id)] if *id == CharacterId::from(55)));
}

#[test]
fn hinted_entity_skips_the_point_fetch() {
    let catalog = ScriptedCatalog::new(cast(60));
    let mut s = new_session();
    let fx = s.url_changed("", BASE);
    drive(&mut s, &catalog, fx);

    // Router passes the just-clicked character along as transient state.
    let hinted = s.listing().items[3].clone();
    s.offer_hint(hinted.clone());
    let fx = s.url_changed("", &format!("{BASE}/{}/character-4", hinted.id));
    drive(&mut s, &catalog, fx);
    assert_eq!(s.detail(), Some(&hinted));
    assert_eq!(catalog.point_calls.get(), 0);
}
