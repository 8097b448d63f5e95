//! # castlist
//!
//! The list-state engine behind a character-chat product's browsing
//! surfaces: pagination, page size, search, and category filters, kept in
//! sync between in-memory state, the browser URL, and a remote paginated
//! catalog — plus deep-linked detail views that open a character by id
//! straight from a URL.
//!
//! # Architecture: State In, Effects Out
//!
//! The engine is sans-IO. Every operation is a synchronous state
//! transition that returns [`Effect`](session::Effect)s — URL writes,
//! scrolls, fetch requests — for the host shell to perform, and fetch
//! results come back through explicit completion calls:
//!
//! ```text
//! user event ──▶ ListSession ──▶ effects (URL write, fetch request)
//!                    ▲                         │ host performs I/O
//!                    └──── completions ◀───────┘
//! ```
//!
//! This split exists for three reasons:
//!
//! - **Testability**: races (a page-1 response arriving after page-2) are
//!   scripted in plain unit tests by completing requests out of order — no
//!   async runtime, no timeouts.
//! - **Host independence**: the same engine drives a browser shell, a
//!   server-rendered preview, or the bundled CLI, because the suspension
//!   point (the network) lives entirely on the host's side.
//! - **Single-threaded by construction**: all transitions are ordered with
//!   the user actions that caused them, so the URL can never disagree with
//!   the action that was applied last.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`query`] | URL query-string codec — section-namespaced encode/decode/merge of navigation state |
//! | [`state`] | Per-section state store — page/size/search/filter mutations, URL replace-sync, back/forward reconciliation |
//! | [`fetch`] | Fetch coordinator — sequence-numbered last-request-wins loading, search snapshot/restore, stale-while-error |
//! | [`deeplink`] | Deep-link resolver — `/{id}/{slug}` paths resolved against the loaded list, then by point fetch |
//! | [`slug`] | Slug codec — names to URL-safe path segments and (lossily) back |
//! | [`session`] | Facade wiring the above per section; the surface views consume |
//! | [`source`] | External catalog interface and the one response-normalization step |
//! | [`config`] | `ListConfig` — allowed page sizes and defaults, TOML-loadable |
//! | [`recent`] | Persisted recent-search list behind an injected key-value store |
//! | [`types`] | Shared data model: characters, ids, listings |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## URLs Are the Source of Truth at Rest
//!
//! A section's navigation state is whatever its URL parameters decode to;
//! memory is just the working copy. Reloads, shared links, and back/forward
//! all restore the exact view because every mutation is immediately encoded
//! back into the query string — always as a history *replace*, so flipping
//! through ten pages never buries the back button under ten entries.
//!
//! ## Defaults Are Omitted, Inputs Are Distrusted
//!
//! Encoding writes only what differs from the defaults, keeping URLs
//! minimal and idempotent. Decoding validates everything: hand-edited pages
//! below 1, page sizes outside the configured set, and reserved parameter
//! names all fall back silently rather than erroring — a malformed URL is a
//! fact of life, not an exception.
//!
//! ## Discard, Don't Cancel
//!
//! In-flight fetches are never cancelled; each request carries a sequence
//! number and any response that is not the latest issued is dropped on
//! arrival. The calls are idempotent reads, so discarding is exactly as
//! good as cancellation and far simpler than plumbing abort signals through
//! a host we don't control.
//!
//! ## Slugs Are Cosmetic
//!
//! Detail URLs carry `/{id}/{slug}`, but only the id resolves. A wrong or
//! stale slug never blocks resolution — it is corrected in place to the
//! canonical form once the entity is known. Names may collide after
//! slugification; that is fine, because nothing ever looks an entity up by
//! slug.

pub mod config;
pub mod deeplink;
pub mod fetch;
pub mod output;
pub mod query;
pub mod recent;
pub mod session;
pub mod slug;
pub mod source;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
