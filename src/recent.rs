//! Persisted recent-search list.
//!
//! The search box offers the user's last few queries across visits. That
//! state is process-wide rather than per-section, so it lives behind a
//! small injected key-value interface instead of a hidden global: hosts
//! hand in whatever storage they have (browser local storage, a file, an
//! in-memory map in tests) and the lifecycle is explicit — read once at
//! mount, write through on every change.
//!
//! Persistence is forgiving: missing or corrupt stored data loads as an
//! empty list. Losing recent searches is a shrug; failing to mount the
//! search box is not.

use crate::config::ListConfig;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Storage key under which the list is persisted.
const STORAGE_KEY: &str = "recent_searches";

/// Minimal keyed string storage the host injects.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// File-backed store: one JSON object per file, written on every set.
///
/// Write failures are logged and swallowed — persistence here is
/// best-effort by contract.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unparseable file starts
    /// empty.
    pub fn open(path: &Path) -> Self {
        let values = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    fn flush(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            log::warn!("recent-searches: failed to persist {}: {e}", self.path.display());
        }
    }
}

/// The recent-search list itself: deduplicated, most recent first, capped.
pub struct RecentSearches<S: KeyValueStore> {
    store: S,
    entries: Vec<String>,
    cap: usize,
}

impl<S: KeyValueStore> RecentSearches<S> {
    /// Load the persisted list from the store. Corrupt data loads empty.
    pub fn load(store: S, config: &ListConfig) -> Self {
        let cap = config.max_recent_searches;
        let mut entries: Vec<String> = store
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        entries.truncate(cap);
        Self {
            store,
            entries,
            cap,
        }
    }

    /// Most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a submitted query: moves it to the front, case-insensitively
    /// deduplicated, dropping the oldest entry past the cap. Blank queries
    /// are ignored.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.entries
            .retain(|e| !e.eq_ignore_ascii_case(query));
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.cap);
        self.persist();
    }

    /// Drop the whole list.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => self.store.set(STORAGE_KEY, &json),
            Err(e) => log::warn!("recent-searches: failed to serialize: {e}"),
        }
    }
}
