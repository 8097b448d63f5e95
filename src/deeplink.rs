//! Deep-link resolution for character detail views.
//!
//! A detail URL has the shape `{base}/{id}/{slug}` — `/dashboard/discover/
//! 42/steve-jobs` opens character 42 on top of the Discover list. The id is
//! the only authoritative part; the slug is cosmetic (see
//! [`slug`](crate::slug)) and never participates in lookup.
//!
//! ## Resolution order
//!
//! 1. A freshly navigated entity may ride along as a *hint* (the host passes
//!    it from router transient state to skip a redundant fetch). A matching
//!    hint resolves immediately; its absence only costs latency.
//! 2. The section's currently loaded listing, by string-normalized id.
//! 3. Once the list has settled (finished its first load) and the id still
//!    isn't there — a deep link into another category or page — a single
//!    point fetch by id.
//! 4. Until the list settles, resolution stays [`DeepLinkState::Pending`];
//!    a premature not-found would punt valid deep links that just raced the
//!    first page load.
//!
//! A failed point fetch resolves [`DeepLinkState::NotFound`], which emits
//! one corrective navigation back to the section's base path so the app is
//! never stuck on a dead deep link. A successful resolution whose slug
//! doesn't match the entity's canonical slug emits a cosmetic path rewrite
//! — same entity, prettier URL.

use crate::slug;
use crate::source::SourceError;
use crate::types::{CharacterId, CharacterSummary, Listing};

/// A detail-view target parsed from the URL path.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepLink {
    pub id: CharacterId,
    /// Advisory name segment; may be empty or wrong without affecting
    /// resolution.
    pub slug: String,
}

/// Resolution progress for the current deep link.
#[derive(Debug, Clone, PartialEq)]
pub enum DeepLinkState {
    /// Waiting for the list to finish loading or a point fetch to return.
    Pending,
    /// Found in the currently loaded listing (or supplied as a hint).
    ResolvedLocal(CharacterSummary),
    /// Fetched directly by id.
    ResolvedRemote(CharacterSummary),
    /// The id does not exist; a corrective redirect has been requested.
    NotFound,
}

/// Follow-up the host must perform after a resolver step.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverAction {
    /// Point-fetch this character by id.
    FetchById(CharacterId),
    /// Rewrite the URL path (history replace) to the canonical slug —
    /// cosmetic, the resolved entity is unchanged.
    RewritePath(String),
    /// Navigate back to the section's base list path; the deep link is dead.
    RedirectToBase(String),
}

/// Parse `{base}/{id}/{slug}` into a [`DeepLink`].
///
/// Returns `None` for the bare base path (list view), a trailing slash, or
/// anything deeper than two extra segments. A missing slug segment parses
/// with an empty slug.
pub fn parse_detail_path(base: &str, path: &str) -> Option<DeepLink> {
    let base = base.trim_end_matches('/');
    let rest = path.strip_prefix(base)?;
    // Segment boundary: "/dashboard/discovery" must not match the base
    // "/dashboard/discover".
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let rest = rest.trim_start_matches('/').trim_end_matches('/');
    if rest.is_empty() {
        return None;
    }
    let mut segments = rest.split('/');
    let id = segments.next().filter(|s| !s.is_empty())?;
    let slug = segments.next().unwrap_or("");
    if segments.next().is_some() {
        return None;
    }
    Some(DeepLink {
        id: CharacterId::from(id),
        slug: slug.to_string(),
    })
}

/// Resolver for the detail view layered over one list section.
///
/// Reads the loader's listing, never writes it. Owns the deep-link state.
pub struct DeepLinkResolver {
    base_path: String,
    target: Option<DeepLink>,
    state: DeepLinkState,
    /// Id of the in-flight point fetch, if any.
    fetching: Option<CharacterId>,
    /// The single corrective redirect has been emitted for this target.
    redirected: bool,
    /// Best-effort lookaside from router transient state. Consumed on use.
    hint: Option<CharacterSummary>,
}

impl DeepLinkResolver {
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        Self {
            base_path,
            target: None,
            state: DeepLinkState::Pending,
            fetching: None,
            redirected: false,
            hint: None,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn target(&self) -> Option<&DeepLink> {
        self.target.as_ref()
    }

    /// Resolution state, when a detail view is open.
    pub fn state(&self) -> Option<&DeepLinkState> {
        self.target.as_ref().map(|_| &self.state)
    }

    /// The resolved character, when resolution has succeeded.
    pub fn detail(&self) -> Option<&CharacterSummary> {
        match &self.state {
            _ if self.target.is_none() => None,
            DeepLinkState::ResolvedLocal(c) | DeepLinkState::ResolvedRemote(c) => Some(c),
            _ => None,
        }
    }

    /// Stash a freshly fetched entity from router transient state. Purely a
    /// latency optimization; correctness never depends on it.
    pub fn offer_hint(&mut self, entity: CharacterSummary) {
        self.hint = Some(entity);
    }

    /// Track a URL path change. Opens, switches, or closes the detail view
    /// and attempts resolution against the given listing.
    pub fn observe_path(
        &mut self,
        path: &str,
        listing: &Listing,
        settled: bool,
    ) -> Option<ResolverAction> {
        match parse_detail_path(&self.base_path, path) {
            None => {
                if self.target.take().is_some() {
                    log::debug!("deeplink[{}]: detail closed", self.base_path);
                }
                self.state = DeepLinkState::Pending;
                self.fetching = None;
                self.redirected = false;
                None
            }
            Some(link) => {
                if self.target.as_ref() == Some(&link) {
                    return self.resolve(listing, settled);
                }
                log::debug!("deeplink[{}]: target {}", self.base_path, link.id);
                self.target = Some(link);
                self.state = DeepLinkState::Pending;
                self.fetching = None;
                self.redirected = false;
                self.resolve(listing, settled)
            }
        }
    }

    /// Attempt resolution of the current target. Call after every listing
    /// update; a no-op when there is no target or resolution is finished.
    pub fn resolve(&mut self, listing: &Listing, settled: bool) -> Option<ResolverAction> {
        let target = self.target.clone()?;
        if self.state != DeepLinkState::Pending {
            return None;
        }

        if let Some(hint) = self.hint.take_if(|h| h.id == target.id) {
            log::debug!("deeplink[{}]: {} resolved from hint", self.base_path, target.id);
            self.state = DeepLinkState::ResolvedLocal(hint);
            return self.canonical_rewrite(&target);
        }

        if let Some(found) = listing.find(&target.id) {
            self.state = DeepLinkState::ResolvedLocal(found.clone());
            return self.canonical_rewrite(&target);
        }

        if settled && self.fetching.is_none() {
            self.fetching = Some(target.id.clone());
            return Some(ResolverAction::FetchById(target.id));
        }

        None
    }

    /// Apply the result of a point fetch. Results for an id that is no
    /// longer the target (the user navigated on) are discarded.
    pub fn complete_fetch(
        &mut self,
        id: &CharacterId,
        result: Result<CharacterSummary, SourceError>,
    ) -> Option<ResolverAction> {
        if self.fetching.as_ref() != Some(id) {
            log::debug!("deeplink[{}]: discarding stale point fetch for {id}", self.base_path);
            return None;
        }
        self.fetching = None;
        let target = self.target.clone()?;
        match result {
            Ok(entity) => {
                self.state = DeepLinkState::ResolvedRemote(entity);
                self.canonical_rewrite(&target)
            }
            Err(e) => {
                log::debug!("deeplink[{}]: {} not found: {e}", self.base_path, target.id);
                self.state = DeepLinkState::NotFound;
                if self.redirected {
                    None
                } else {
                    self.redirected = true;
                    Some(ResolverAction::RedirectToBase(self.base_path.clone()))
                }
            }
        }
    }

    /// After a successful resolution, fix a cosmetically wrong slug.
    fn canonical_rewrite(&self, target: &DeepLink) -> Option<ResolverAction> {
        let entity = self.detail()?;
        let canonical = slug::to_slug(&entity.name);
        if target.slug == canonical {
            return None;
        }
        Some(ResolverAction::RewritePath(format!(
            "{}/{}/{}",
            self.base_path, target.id, canonical
        )))
    }
}
