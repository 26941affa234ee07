//! centerfind — facility search widget engine.
//!
//! Headless implementation of the community-center search bar: debounced querying
//! against a remote search endpoint, local fallback filtering with relevance ranking,
//! persisted recent searches, and a keyboard-driven result selection state machine.
//!
//! # Modules
//!
//! - [`types`] — `Location` and the widget's `SearchState`
//! - [`config`] — `SearchConfig` defaults and `.centerfind.toml` loading
//! - [`decode`] — Explicit decoder for the known search response schemas
//! - [`rank`] — Fallback substring filter, relevance scoring, highlighting
//! - [`recent`] — Recent search history over a pluggable `Storage` backend
//! - [`remote`] — HTTP search source with timeout
//! - [`executor`] — Remote-then-fallback query execution with cancellation
//! - [`debounce`] — Single-slot debounce timer owning its task handle
//! - [`widget`] — `SearchBar` state machine and render model
//! - [`error`] — Error type shared across the crate

pub mod config;
pub mod debounce;
pub mod decode;
pub mod error;
pub mod executor;
pub mod rank;
pub mod recent;
pub mod remote;
pub mod types;
pub mod widget;

use std::path::PathBuf;

pub use config::{load_centerfind_config, SearchConfig};
pub use error::{Result, SearchError};
pub use types::Location;

// ---------------------------------------------------------------------------
// Cross-platform path helpers
// ---------------------------------------------------------------------------

/// Platform-aware home directory: `HOME` on Unix, `USERPROFILE` on Windows.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok().map(PathBuf::from)
}

/// Platform-aware data directory: `~/.local/share/centerfind` on Unix, `%LOCALAPPDATA%/centerfind` on Windows.
///
/// Recent search history lives here between sessions.
pub fn data_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var("LOCALAPPDATA")
            .or_else(|_| std::env::var("APPDATA"))
            .ok()
            .map(|a| PathBuf::from(a).join("centerfind"))
    } else {
        home_dir().map(|h| h.join(".local/share/centerfind"))
    }
}
