//! Local fallback search: case-insensitive substring filtering over name and address,
//! a deterministic relevance score, and match highlighting for rendering.
//!
//! Only used when the remote endpoint cannot answer; server-side ranking is trusted as-is.

use std::ops::Range;

use rayon::prelude::*;
use regex::RegexBuilder;

use crate::types::Location;

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

const SCORE_EXACT_NAME: u32 = 100;
const SCORE_NAME_PREFIX: u32 = 80;
const SCORE_NAME_SUBSTRING: u32 = 60;
const SCORE_ADDRESS_SUBSTRING: u32 = 40;
/// Names shorter than this earn one point per missing character.
const LENGTH_BONUS_BASE: usize = 20;

/// Relevance of `location` for `query`.
///
/// Name match is exclusive (exact, else prefix, else substring); the address bonus
/// and the short-name bonus stack on top of it.
pub fn relevance(location: &Location, query: &str) -> u32 {
    let query = query.to_lowercase();
    let name = location.name.to_lowercase();
    let address = location.address.to_lowercase();

    let mut score = if name == query {
        SCORE_EXACT_NAME
    } else if name.starts_with(&query) {
        SCORE_NAME_PREFIX
    } else if name.contains(&query) {
        SCORE_NAME_SUBSTRING
    } else {
        0
    };

    if address.contains(&query) {
        score += SCORE_ADDRESS_SUBSTRING;
    }

    score + LENGTH_BONUS_BASE.saturating_sub(name.chars().count()) as u32
}

/// Keep locations whose `"{name} {address}"` contains the query, in corpus order,
/// truncated to `limit`.
pub fn filter_locations(locations: &[Location], query: &str, limit: usize) -> Vec<Location> {
    let query = query.to_lowercase();
    let mut matches: Vec<Location> = locations
        .par_iter()
        .filter(|loc| format!("{} {}", loc.name, loc.address).to_lowercase().contains(&query))
        .cloned()
        .collect();
    matches.truncate(limit);
    matches
}

/// Sort by descending relevance. Stable: equal scores keep their input order.
pub fn rank(mut locations: Vec<Location>, query: &str) -> Vec<Location> {
    locations.sort_by_cached_key(|loc| std::cmp::Reverse(relevance(loc, query)));
    locations
}

/// Filter then rank: the complete fallback path.
pub fn fallback_search(locations: &[Location], query: &str, limit: usize) -> Vec<Location> {
    rank(filter_locations(locations, query, limit), query)
}

// ---------------------------------------------------------------------------
// Highlighting
// ---------------------------------------------------------------------------

/// Byte ranges of every case-insensitive occurrence of `query` in `text`.
pub fn highlight(text: &str, query: &str) -> Vec<Range<usize>> {
    if query.is_empty() || text.is_empty() {
        return vec![];
    }
    match RegexBuilder::new(&regex::escape(query)).case_insensitive(true).build() {
        Ok(re) => re.find_iter(text).map(|m| m.range()).collect(),
        Err(_) => vec![],
    }
}

/// Wrap each highlighted range of `text` in `open`/`close` markers.
pub fn mark(text: &str, ranges: &[Range<usize>], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * (open.len() + close.len()));
    let mut last = 0;
    for r in ranges {
        out.push_str(&text[last..r.start]);
        out.push_str(open);
        out.push_str(&text[r.clone()]);
        out.push_str(close);
        last = r.end;
    }
    out.push_str(&text[last..]);
    out
}

// ---------------------------------------------------------------------------
// District classification
// ---------------------------------------------------------------------------

/// Seongnam district an address belongs to, used for result badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum District {
    Sujeong,
    Bundang,
    Jungwon,
    Other,
}

impl District {
    pub fn of(address: &str) -> Self {
        if address.contains("수정구") {
            District::Sujeong
        } else if address.contains("분당구") {
            District::Bundang
        } else if address.contains("중원구") {
            District::Jungwon
        } else {
            District::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            District::Sujeong => "수정구",
            District::Bundang => "분당구",
            District::Jungwon => "중원구",
            District::Other => "",
        }
    }
}
