//! CLI output formatting.
//!
//! Display is information-centric: the primary line for every character is
//! its positional index and name, with category and tagline as indented
//! context lines. Navigation state renders as a one-line header so a
//! `browse` run reads as a session transcript:
//!
//! ```text
//! discover — page 2/3, 24 per page (60 characters)
//! 025 Character 25
//!     Category: science
//! 026 Character 26
//! ```
//!
//! Each concern has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::query::ListState;
use crate::types::{CharacterSummary, Listing};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// One-line header for a section's navigation state and result counts.
pub fn format_header(section: &str, state: &ListState, listing: &Listing) -> String {
    let section = if section.is_empty() { "(global)" } else { section };
    let mut header = format!(
        "{section} — page {}/{}, {} per page ({} characters)",
        state.page, listing.total_pages, state.page_size, listing.total_count
    );
    if !state.query.is_empty() {
        header.push_str(&format!(", search: {:?}", state.query));
    }
    for (name, value) in &state.filters {
        header.push_str(&format!(", {name}={value}"));
    }
    header
}

/// Format a listing as indexed lines with indented context.
///
/// Indices continue across pages: page 2 at 24 per page starts at 025.
pub fn format_listing(state: &ListState, listing: &Listing) -> Vec<String> {
    let offset = (state.page as usize - 1) * state.page_size as usize;
    let mut lines = Vec::new();
    for (i, c) in listing.items.iter().enumerate() {
        lines.push(format!("{} {}", format_index(offset + i + 1), c.name));
        if let Some(category) = &c.category {
            lines.push(format!("    Category: {category}"));
        }
        if let Some(tagline) = &c.tagline {
            lines.push(format!("    {tagline}"));
        }
    }
    if listing.items.is_empty() {
        lines.push("(no characters)".to_string());
    }
    lines
}

/// Format a resolved detail character.
pub fn format_detail(c: &CharacterSummary) -> Vec<String> {
    let mut lines = vec![format!("{} (id {})", c.name, c.id)];
    if let Some(category) = &c.category {
        lines.push(format!("    Category: {category}"));
    }
    if let Some(tagline) = &c.tagline {
        lines.push(format!("    {tagline}"));
    }
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
