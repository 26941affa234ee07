//! Core types shared across the widget: the canonical `Location` record and the
//! mutable `SearchState` owned by [`crate::widget::SearchBar`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A facility record: identity, display name, address, phone, and coordinates.
///
/// This is the canonical shape; remote responses in other schemas are normalized
/// into it by [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Location {
    pub fn new(id: u64, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            tel: None,
            lat: None,
            lng: None,
        }
    }

    pub fn with_tel(mut self, tel: impl Into<String>) -> Self {
        self.tel = Some(tel.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    /// `(lat, lng)` when both are known. The map is only moved for located records.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

/// Per-widget search state.
///
/// `filtered_results` never holds more than the configured `max_results`, and
/// `selected_index` is `None` or a valid index into the rendered results.
/// Recent searches are owned by [`crate::recent::RecentSearchStore`].
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub is_searching: bool,
    pub current_query: String,
    pub selected_index: Option<usize>,
    pub filtered_results: Vec<Location>,
}
