//! Slug codec for character detail URLs.
//!
//! A slug is the human-readable path segment in `/{id}/{slug}` detail URLs.
//! It is cosmetic: the id is the only authoritative key, and two distinct
//! names may collapse to the same slug. The codec therefore optimizes for
//! stable, pretty URLs rather than injectivity.
//!
//! ## Transformation
//!
//! `to_slug` runs the name through a fixed pipeline:
//!
//! 1. Lowercase and fold Latin diacritics (`Café` → `cafe`)
//! 2. Map a fixed punctuation table to words (`Tom & Jerry` → `tom and jerry`),
//!    so names differing only by punctuation keep readable, distinct slugs
//! 3. Drop remaining non-alphanumerics
//! 4. Collapse whitespace/hyphen runs into single hyphens and trim them
//! 5. Empty results fall back to [`FALLBACK_SLUG`]
//!
//! `from_slug` is the lossy best-effort inverse (hyphens to spaces, title
//! case), used only for fallback display text — never for lookup.

/// Slug used when a name reduces to nothing (all punctuation, empty, etc.).
pub const FALLBACK_SLUG: &str = "character";

/// Punctuation characters that become words instead of separators.
const PUNCTUATION_WORDS: &[(char, &str)] = &[('&', "and"), ('+', "plus"), ('@', "at")];

/// Convert a character name into a URL-safe path segment.
///
/// - `"Steve Jobs"` → `"steve-jobs"`
/// - `"Tom & Jerry"` → `"tom-and-jerry"`
/// - `"Café -- Crème"` → `"cafe-creme"`
/// - `"!!!"` → `"character"` (fallback)
pub fn to_slug(name: &str) -> String {
    let mut buf = String::with_capacity(name.len());
    for c in name.chars() {
        if let Some(word) = punctuation_word(c) {
            buf.push(' ');
            buf.push_str(word);
            buf.push(' ');
            continue;
        }
        for folded in c.to_lowercase() {
            match fold_diacritic(folded) {
                Some(plain) => buf.push_str(plain),
                None if folded.is_ascii_alphanumeric() => buf.push(folded),
                // Everything else separates words: spaces, hyphens, leftover
                // punctuation, non-Latin symbols.
                None => buf.push(' '),
            }
        }
    }

    let slug = buf.split_whitespace().collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Best-effort display name for a slug: hyphens become spaces, words are
/// title-cased. Lossy — `"tom-and-jerry"` comes back as `"Tom And Jerry"`,
/// not `"Tom & Jerry"` — so only use it when the real name is unavailable.
pub fn from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn punctuation_word(c: char) -> Option<&'static str> {
    PUNCTUATION_WORDS
        .iter()
        .find(|(p, _)| *p == c)
        .map(|(_, w)| *w)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Fold a lowercased Latin character with diacritics to its ASCII base.
///
/// Covers the Latin-1 Supplement and the Latin Extended characters that show
/// up in character names. Anything not in the table passes through (and is
/// then dropped by the alphanumeric filter if non-ASCII).
fn fold_diacritic(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        'þ' => "th",
        'ð' => "d",
        _ => return None,
    };
    Some(folded)
}
