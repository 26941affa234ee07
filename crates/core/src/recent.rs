//! Recent search history: most-recent-first, deduplicated, capped, persisted under a
//! single storage key as a JSON array of strings.
//!
//! Persistence is best-effort. When storage is unavailable the history keeps working
//! for the current session only.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Result, SearchError};

// ---------------------------------------------------------------------------
// Storage backends
// ---------------------------------------------------------------------------

/// Durable string key-value storage.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Process-local storage; nothing survives the session.
#[derive(Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key, `<dir>/<key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SearchError::Storage(format!("{}: {e}", path.display()))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SearchError::Storage(format!("{}: {e}", self.dir.display())))?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| SearchError::Storage(format!("{}: {e}", path.display())))
    }
}

// ---------------------------------------------------------------------------
// Recent search store
// ---------------------------------------------------------------------------

pub struct RecentSearchStore {
    entries: Vec<String>,
    cap: usize,
    key: String,
    storage: Box<dyn Storage>,
}

impl RecentSearchStore {
    /// Create a store and load any persisted history.
    pub fn new(storage: Box<dyn Storage>, key: impl Into<String>, cap: usize) -> Self {
        let mut store = Self {
            entries: Vec::new(),
            cap,
            key: key.into(),
            storage,
        };
        store.entries = store.load();
        store
    }

    /// In-memory store, for sessions without durable storage.
    pub fn in_memory(cap: usize) -> Self {
        Self::new(Box::new(MemoryStorage::new()), "recent", cap)
    }

    fn load(&self) -> Vec<String> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return vec![],
            Err(e) => {
                warn!(error = %e, "Failed to load recent searches");
                return vec![];
            }
        };
        let stored: Vec<String> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Ignoring corrupted recent search history");
                return vec![];
            }
        };

        // Stored values may have been edited by hand; re-establish the invariants.
        let mut entries: Vec<String> = Vec::with_capacity(self.cap);
        for entry in stored {
            let entry = entry.trim();
            if !entry.is_empty() && !entries.iter().any(|e| e == entry) {
                entries.push(entry.to_string());
            }
        }
        entries.truncate(self.cap);
        debug!(count = entries.len(), "Loaded recent searches");
        entries
    }

    fn save(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to encode recent searches");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            warn!(error = %e, "Failed to save recent searches");
        }
    }

    /// Record a query: moves an existing entry to the front, otherwise inserts it,
    /// dropping the oldest past the cap. Blank queries are ignored.
    pub fn add(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.entries.retain(|e| e != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.cap);
        self.save();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    /// Entries in display order, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
