//! Shared types used across the engine.
//!
//! These types cross the boundary between the fetch layer, the state store,
//! and the host UI, and are serialized to/from JSON at the catalog boundary.
//! The listing shapes accepted from the remote source vary (see
//! [`source::normalize_listing`](crate::source::normalize_listing)); everything
//! past that boundary works with the canonical types below.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a character in the catalog.
///
/// The remote source is loosely typed and delivers ids sometimes as JSON
/// numbers, sometimes as strings. All comparisons inside the engine are
/// string-normalized, so `42` and `"42"` refer to the same character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for CharacterId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CharacterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CharacterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = CharacterId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer character id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(CharacterId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(CharacterId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(CharacterId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// One character as it appears in list views.
///
/// Only `id` and `name` are guaranteed by the source; everything else is
/// optional, and unknown fields are ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "avatar")]
    pub avatar_url: Option<String>,
}

/// One page of catalog results, as held by the fetch coordinator.
///
/// Replaced wholesale on every successful fetch — never mutated
/// field-by-field. `total_count` is the authoritative count from the remote
/// source when paginating; when the listing is the product of a search pass
/// (no server-side total) it equals `items.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub items: Vec<CharacterSummary>,
    pub total_count: u64,
    pub total_pages: u32,
}

impl Listing {
    /// The empty listing a section starts with at mount.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 1,
        }
    }

    /// Build a listing from a search result. Search responses carry no
    /// pagination metadata, so the count is the item count and there is a
    /// single page.
    pub fn from_search(items: Vec<CharacterSummary>) -> Self {
        let total_count = items.len() as u64;
        Self {
            items,
            total_count,
            total_pages: 1,
        }
    }

    /// Find a character by string-normalized id.
    pub fn find(&self, id: &CharacterId) -> Option<&CharacterSummary> {
        self.items.iter().find(|c| &c.id == id)
    }
}

impl Default for Listing {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_deserializes_from_number_and_string() {
        let from_num: CharacterId = serde_json::from_str("42").unwrap();
        let from_str: CharacterId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_num, from_str);
        assert_eq!(from_num.as_str(), "42");
    }

    #[test]
    fn id_display_matches_source() {
        assert_eq!(CharacterId::from(7).to_string(), "7");
        assert_eq!(CharacterId::from("abc").to_string(), "abc");
    }

    #[test]
    fn summary_ignores_unknown_fields() {
        let json = r#"{"id": 1, "name": "Ada", "popularity": 99, "verified": true}"#;
        let c: CharacterSummary = serde_json::from_str(json).unwrap();
        assert_eq!(c.name, "Ada");
        assert_eq!(c.id, CharacterId::from(1));
        assert!(c.category.is_none());
    }

    #[test]
    fn summary_accepts_avatar_alias() {
        let json = r#"{"id": "a", "name": "Ada", "avatar": "https://x/a.png"}"#;
        let c: CharacterSummary = serde_json::from_str(json).unwrap();
        assert_eq!(c.avatar_url.as_deref(), Some("https://x/a.png"));
    }

    #[test]
    fn empty_listing_has_one_page() {
        let l = Listing::empty();
        assert!(l.items.is_empty());
        assert_eq!(l.total_count, 0);
        assert_eq!(l.total_pages, 1);
    }

    #[test]
    fn search_listing_counts_items() {
        let items = vec![
            CharacterSummary {
                id: CharacterId::from(1),
                name: "Ada".into(),
                category: None,
                tagline: None,
                avatar_url: None,
            },
            CharacterSummary {
                id: CharacterId::from(2),
                name: "Alan".into(),
                category: None,
                tagline: None,
                avatar_url: None,
            },
        ];
        let l = Listing::from_search(items);
        assert_eq!(l.total_count, 2);
        assert_eq!(l.total_pages, 1);
    }

    #[test]
    fn find_compares_string_normalized() {
        let l = Listing::from_search(vec![CharacterSummary {
            id: CharacterId::from(42),
            name: "Steve".into(),
            category: None,
            tagline: None,
            avatar_url: None,
        }]);
        assert!(l.find(&CharacterId::from("42")).is_some());
        assert!(l.find(&CharacterId::from("43")).is_none());
    }
}
