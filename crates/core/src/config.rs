//! Widget configuration: defaults plus overrides from `.centerfind.toml`.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

/// Runtime configuration for the search widget. Loaded from `.centerfind.toml` or defaults.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Origin of the search service, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Search endpoint path, queried as `?q=<query>&limit=<n>`.
    pub api_path: String,
    /// All-locations endpoint path, used to pre-load the fallback corpus.
    pub locations_path: String,
    pub api_timeout_ms: u64,
    pub debounce_ms: u64,
    pub max_recent_items: usize,
    pub min_search_length: usize,
    pub max_results: usize,
    /// Key under which recent searches are persisted.
    pub storage_key: String,
    /// Fall back to local filtering when the remote search fails.
    pub enable_fallback: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_path: "/api/v1/location/search".to_string(),
            locations_path: "/api/v1/location".to_string(),
            api_timeout_ms: 5000,
            debounce_ms: 300,
            max_recent_items: 5,
            min_search_length: 1,
            max_results: 10,
            storage_key: "centerSearchHistory".to_string(),
            enable_fallback: true,
        }
    }
}

impl SearchConfig {
    pub fn search_url(&self) -> String {
        join_url(&self.base_url, &self.api_path)
    }

    pub fn locations_url(&self) -> String {
        join_url(&self.base_url, &self.locations_path)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

// ---------------------------------------------------------------------------
// .centerfind.toml loading
// ---------------------------------------------------------------------------

/// Known keys in `.centerfind.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "base_url",
    "api_path",
    "locations_path",
    "api_timeout_ms",
    "debounce_ms",
    "max_recent_items",
    "min_search_length",
    "max_results",
    "storage_key",
    "enable_fallback",
];

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn read_usize(table: &toml::Table, key: &str) -> Option<usize> {
    let value = table.get(key)?.as_integer()?;
    match usize::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value, "Negative value in .centerfind.toml ignored");
            None
        }
    }
}

fn read_string(table: &toml::Table, key: &str) -> Option<String> {
    table.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Apply the keys of a parsed config table on top of `config`.
pub fn apply_config_table(config: &mut SearchConfig, table: &toml::Table) {
    for key in table.keys() {
        if !KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            let suggestion = KNOWN_CONFIG_KEYS
                .iter()
                .min_by_key(|k| edit_distance(key, k))
                .copied()
                .unwrap_or_default();
            if edit_distance(key, suggestion) <= 3 {
                warn!(
                    key = key.as_str(),
                    suggestion,
                    "Unknown key in .centerfind.toml — did you mean '{suggestion}'?"
                );
            } else {
                warn!(
                    key = key.as_str(),
                    "Unknown key in .centerfind.toml (known keys: {})",
                    KNOWN_CONFIG_KEYS.join(", ")
                );
            }
        }
    }

    if let Some(v) = read_string(table, "base_url") {
        config.base_url = v;
    }
    if let Some(v) = read_string(table, "api_path") {
        config.api_path = v;
    }
    if let Some(v) = read_string(table, "locations_path") {
        config.locations_path = v;
    }
    if let Some(v) = read_usize(table, "api_timeout_ms") {
        config.api_timeout_ms = v as u64;
    }
    if let Some(v) = read_usize(table, "debounce_ms") {
        config.debounce_ms = v as u64;
    }
    if let Some(v) = read_usize(table, "max_recent_items") {
        config.max_recent_items = v;
    }
    if let Some(v) = read_usize(table, "min_search_length") {
        // A zero minimum would send empty queries to the endpoint.
        config.min_search_length = v.max(1);
    }
    if let Some(v) = read_usize(table, "max_results") {
        config.max_results = v;
    }
    if let Some(v) = read_string(table, "storage_key") {
        config.storage_key = v;
    }
    if let Some(v) = table.get("enable_fallback").and_then(|v| v.as_bool()) {
        config.enable_fallback = v;
    }
}

/// Load widget configuration from `.centerfind.toml` in the given directory.
///
/// Returns a [`SearchConfig`] with defaults merged with any overrides from the config file.
/// If the file doesn't exist or can't be parsed, returns defaults with a warning.
/// Unknown keys trigger a warning with a typo suggestion.
pub fn load_centerfind_config(root: &Path) -> SearchConfig {
    let mut config = SearchConfig::default();
    let config_path = root.join(".centerfind.toml");

    if config_path.exists() {
        debug!(path = %config_path.display(), "Loading .centerfind.toml");
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match content.parse::<toml::Table>() {
                Ok(table) => apply_config_table(&mut config, &table),
                Err(e) => warn!(error = %e, "Failed to parse .centerfind.toml"),
            },
            Err(e) => warn!(error = %e, "Failed to read .centerfind.toml"),
        }
    }

    config
}
