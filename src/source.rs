//! External catalog interface and response normalization.
//!
//! The engine consumes — never implements — a paginated list API, a search
//! API, and a point-fetch API. [`CatalogSource`] models that surface; the
//! host wires it to real transport (HTTP, IPC, whatever), and this module
//! never sees verbs or headers.
//!
//! ## One normalization step
//!
//! The remote source is loosely shaped: the same list endpoint sometimes
//! nests pagination metadata under `data.pagination`, sometimes flattens it
//! to the top level, and counts arrive as numbers or numeric strings. All of
//! that variability is absorbed here, at the boundary: [`normalize_listing`]
//! maps every accepted shape into the canonical [`Listing`], and the rest of
//! the engine never touches raw JSON.
//!
//! [`StaticCatalog`] is an in-memory source over a fixture list, used by the
//! CLI `browse` command and the integration tests. It answers in the nested
//! wire shape so the normalizer is exercised on every call.

use crate::types::{CharacterId, CharacterSummary, Listing};
use indexmap::IndexMap;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("not found")]
    NotFound,
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// The remote data API the engine calls, abstracted from transport.
///
/// All three calls are idempotent reads; the engine relies on that for its
/// discard-instead-of-cancel staleness handling. Responses are raw JSON —
/// normalization into canonical types happens on the engine side of the
/// boundary.
pub trait CatalogSource {
    /// One page of a paginated resource listing.
    fn list_page(
        &self,
        resource: &str,
        page: u32,
        page_size: u32,
        filters: &IndexMap<String, String>,
    ) -> Result<Value, SourceError>;

    /// Point-fetch a single entity by id.
    fn get_by_id(&self, resource: &str, id: &CharacterId) -> Result<Value, SourceError>;

    /// Unpaginated search over a resource.
    fn search(&self, resource: &str, query: &str) -> Result<Value, SourceError>;
}

/// Normalize a list response into the canonical [`Listing`].
///
/// Accepted shapes:
/// - flat: `{"items": [...], "totalCount": n, "totalPages": m}`
///   (snake_case variants accepted too)
/// - nested: `{"data": {"items": [...], "pagination": {...}}}`
/// - bare array: `[...]` — no metadata, count = length, one page
///
/// When `totalPages` is missing it is derived from the count and
/// `page_size`, or defaults to 1 when not paginating.
pub fn normalize_listing(value: &Value, page_size: Option<u32>) -> Result<Listing, SourceError> {
    if let Some(array) = value.as_array() {
        let items = parse_items(array)?;
        return Ok(Listing::from_search(items));
    }

    let body = value.get("data").filter(|d| d.is_object()).unwrap_or(value);
    let array = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::malformed("no items array".to_string()))?;
    let items = parse_items(array)?;

    let meta = body.get("pagination").unwrap_or(body);
    let total_count = count_field(meta, &["totalCount", "total_count", "total"])
        .unwrap_or(items.len() as u64);
    let total_pages = count_field(meta, &["totalPages", "total_pages", "pages"])
        .map(|p| p.max(1) as u32)
        .unwrap_or_else(|| match page_size {
            Some(size) if size > 0 => total_count.div_ceil(size as u64).max(1) as u32,
            _ => 1,
        });

    Ok(Listing {
        items,
        total_count,
        total_pages,
    })
}

/// Normalize a search response into its item list. Accepts the same body
/// shapes as [`normalize_listing`]; pagination metadata, if any, is ignored
/// because search results are unpaginated by contract.
pub fn normalize_search(value: &Value) -> Result<Vec<CharacterSummary>, SourceError> {
    Ok(normalize_listing(value, None)?.items)
}

/// Normalize a point-fetch response. Accepts the entity directly or wrapped
/// under `data` or `character`.
pub fn normalize_character(value: &Value) -> Result<CharacterSummary, SourceError> {
    let body = value
        .get("data")
        .or_else(|| value.get("character"))
        .unwrap_or(value);
    serde_json::from_value(body.clone())
        .map_err(|e| SourceError::malformed(format!("bad character: {e}")))
}

fn parse_items(array: &[Value]) -> Result<Vec<CharacterSummary>, SourceError> {
    array
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone())
                .map_err(|e| SourceError::malformed(format!("bad item: {e}")))
        })
        .collect()
}

/// Read the first present count field, tolerating numbers and numeric
/// strings.
fn count_field(value: &Value, names: &[&str]) -> Option<u64> {
    names.iter().find_map(|name| {
        let v = value.get(name)?;
        v.as_u64().or_else(|| v.as_str()?.trim().parse().ok())
    })
}

/// In-memory catalog over a fixture list.
///
/// Filters match the `category` field; search is a case-insensitive
/// substring match on the name. Listing responses use the nested wire shape
/// and point fetches the `data`-wrapped shape, so every normalizer path is
/// covered by ordinary use.
pub struct StaticCatalog {
    characters: Vec<CharacterSummary>,
}

impl StaticCatalog {
    pub fn new(characters: Vec<CharacterSummary>) -> Self {
        Self { characters }
    }

    /// Load from a JSON array of character summaries.
    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let characters = serde_json::from_str(content)
            .map_err(|e| SourceError::malformed(format!("bad catalog: {e}")))?;
        Ok(Self::new(characters))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    fn matches(&self, c: &CharacterSummary, filters: &IndexMap<String, String>) -> bool {
        filters.iter().all(|(name, value)| match name.as_str() {
            "category" => c.category.as_deref() == Some(value.as_str()),
            // Unknown filters don't constrain the fixture catalog.
            _ => true,
        })
    }
}

impl CatalogSource for StaticCatalog {
    fn list_page(
        &self,
        _resource: &str,
        page: u32,
        page_size: u32,
        filters: &IndexMap<String, String>,
    ) -> Result<Value, SourceError> {
        let filtered: Vec<&CharacterSummary> = self
            .characters
            .iter()
            .filter(|c| self.matches(c, filters))
            .collect();
        let total = filtered.len() as u64;
        let pages = total.div_ceil(page_size.max(1) as u64).max(1);
        let start = (page.max(1) as usize - 1) * page_size as usize;
        let items: Vec<&CharacterSummary> = filtered
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok(json!({
            "data": {
                "items": items,
                "pagination": { "totalCount": total, "totalPages": pages }
            }
        }))
    }

    fn get_by_id(&self, _resource: &str, id: &CharacterId) -> Result<Value, SourceError> {
        let found = self
            .characters
            .iter()
            .find(|c| &c.id == id)
            .ok_or(SourceError::NotFound)?;
        Ok(json!({ "data": found }))
    }

    fn search(&self, _resource: &str, query: &str) -> Result<Value, SourceError> {
        let needle = query.to_lowercase();
        let items: Vec<&CharacterSummary> = self
            .characters
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect();
        Ok(json!({ "items": items }))
    }
}
