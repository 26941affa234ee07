//! `SearchBar`: the search widget's state machine.
//!
//! The widget is driven by explicit UI events (`focus`, `input`, `key`, `click_result`, ...)
//! and owns every timer and request it starts. Asynchronous work reports back through an
//! internal channel; the owner applies those reports with [`SearchBar::next_event`] or
//! [`SearchBar::settle`]. Each search carries a generation number and a cancellation token,
//! so results from a superseded query are discarded instead of overwriting newer ones.
//!
//! Rendering is a plain data model ([`View`], [`Panel`]) so any front-end can draw it.

use std::ops::Range;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::error::{Result, SearchError};
use crate::executor::{QueryExecutor, SearchOutput};
use crate::rank::{highlight, District};
use crate::recent::RecentSearchStore;
use crate::types::{Location, SearchState};

/// Zoom level applied when focusing the map on a selected result.
pub const FOCUS_ZOOM: u8 = 16;

/// Message shown when a search fails and no fallback could answer.
pub const SEARCH_ERROR_MESSAGE: &str = "검색 중 오류가 발생했습니다.";

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Externally-owned map. The widget moves it but never owns its lifecycle.
pub trait MapView: Send {
    fn pan_to(&mut self, lat: f64, lng: f64);
    fn set_zoom(&mut self, zoom: u8);
    /// Show the info popup for `location` at its marker.
    fn open_info(&mut self, location: &Location);
    /// A result was committed. Fires once per selection, located or not.
    fn result_selected(&mut self, location: &Location);
}

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

/// A rendered result row with highlight ranges into `name` and `address`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub location: Location,
    pub district: District,
    pub name_marks: Vec<Range<usize>>,
    pub address_marks: Vec<Range<usize>>,
}

impl ResultItem {
    fn new(location: &Location, query: &str) -> Self {
        Self {
            district: District::of(&location.address),
            name_marks: highlight(&location.name, query),
            address_marks: highlight(&location.address, query),
            location: location.clone(),
        }
    }
}

/// Content of the results dropdown.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Hidden,
    Loading,
    Results(Vec<ResultItem>),
    NoResults,
    Error(String),
}

/// Everything a front-end needs to draw the widget.
#[derive(Debug)]
pub struct View<'a> {
    pub input: &'a str,
    pub focused: bool,
    pub clear_button: bool,
    pub results: &'a Panel,
    pub selected: Option<usize>,
    /// The recent-search dropdown, when visible.
    pub recent: Option<&'a [String]>,
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

enum WidgetEvent {
    Debounced { ticket: u64, query: String },
    Completed { generation: u64, query: String, result: Result<SearchOutput> },
}

pub struct SearchBar {
    executor: Arc<QueryExecutor>,
    recent: RecentSearchStore,
    map: Box<dyn MapView>,
    min_search_length: usize,

    state: SearchState,
    input: String,
    focused: bool,
    panel: Panel,
    recent_visible: bool,

    debouncer: Debouncer,
    generation: u64,
    in_flight: Option<CancellationToken>,
    events_tx: mpsc::UnboundedSender<WidgetEvent>,
    events_rx: mpsc::UnboundedReceiver<WidgetEvent>,
}

impl SearchBar {
    pub fn new(
        config: &SearchConfig,
        executor: QueryExecutor,
        recent: RecentSearchStore,
        map: Box<dyn MapView>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        info!(corpus = executor.dataset().len(), recent = recent.len(), "Search bar initialized");
        Self {
            executor: Arc::new(executor),
            recent,
            map,
            min_search_length: config.min_search_length.max(1),
            state: SearchState::default(),
            input: String::new(),
            focused: false,
            panel: Panel::Hidden,
            recent_visible: false,
            debouncer: Debouncer::new(config.debounce_delay()),
            generation: 0,
            in_flight: None,
            events_tx,
            events_rx,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn recent_searches(&self) -> &[String] {
        self.recent.entries()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn view(&self) -> View<'_> {
        View {
            input: &self.input,
            focused: self.focused,
            clear_button: !self.input.trim().is_empty(),
            results: &self.panel,
            selected: self.state.selected_index,
            recent: self.recent_visible.then(|| self.recent.entries()),
        }
    }

    /// True while a debounce timer or a search is outstanding.
    pub fn is_busy(&self) -> bool {
        self.debouncer.is_pending() || self.in_flight.is_some()
    }

    // -- event loop ---------------------------------------------------------

    /// Wait for and apply one asynchronous event. Returns false when nothing is outstanding.
    pub async fn next_event(&mut self) -> bool {
        if !self.is_busy() {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply events until no timer or search is outstanding.
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    fn apply(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Debounced { ticket, query } => {
                if self.debouncer.complete(ticket) {
                    self.handle_search(&query);
                }
            }
            WidgetEvent::Completed { generation, query, result } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        query = query.as_str(),
                        "Discarding stale results"
                    );
                    return;
                }
                self.in_flight = None;
                self.state.is_searching = false;
                match result {
                    Ok(output) => {
                        debug!(
                            query = query.as_str(),
                            count = output.locations.len(),
                            origin = ?output.origin,
                            "Search complete"
                        );
                        self.state.filtered_results = output.locations;
                        self.render_results();
                    }
                    Err(SearchError::Cancelled) => {}
                    Err(e) => {
                        warn!(error = %e, query = query.as_str(), "Search failed");
                        self.state.filtered_results.clear();
                        self.panel = Panel::Error(SEARCH_ERROR_MESSAGE.to_string());
                    }
                }
            }
        }
    }

    // -- UI events ----------------------------------------------------------

    pub fn focus(&mut self) {
        self.focused = true;
        if self.input.trim().is_empty() {
            self.show_recent();
        }
    }

    pub fn blur(&mut self) {
        self.cancel_pending();
        self.focused = false;
        self.hide_results();
        self.hide_recent();
    }

    /// A keystroke changed the input text. Searches after the debounce delay.
    pub fn on_input(&mut self, text: &str) {
        self.input = text.to_string();
        let query = self.input.trim().to_string();
        let tx = self.events_tx.clone();
        self.debouncer.schedule(move |ticket| {
            let _ = tx.send(WidgetEvent::Debounced { ticket, query });
        });
    }

    /// Apply a key press. Returns the committed location when Enter selects a result.
    pub fn key(&mut self, key: Key) -> Option<Location> {
        let count = self.rendered_count();
        match key {
            Key::ArrowDown => {
                self.state.selected_index = match (count, self.state.selected_index) {
                    (0, _) => None,
                    (_, None) => Some(0),
                    (n, Some(i)) => Some((i + 1).min(n - 1)),
                };
            }
            Key::ArrowUp => {
                self.state.selected_index = match self.state.selected_index {
                    None | Some(0) => None,
                    Some(i) => Some(i - 1),
                };
            }
            Key::Enter => match self.state.selected_index {
                Some(index) => return self.select_result(index),
                None => self.execute_search(),
            },
            Key::Escape => {
                self.cancel_pending();
                self.hide_results();
                self.hide_recent();
                self.focused = false;
            }
        }
        None
    }

    /// Pointer moved over a result row.
    pub fn hover(&mut self, index: usize) {
        if index < self.rendered_count() {
            self.state.selected_index = Some(index);
        }
    }

    pub fn click_result(&mut self, index: usize) -> Option<Location> {
        self.select_result(index)
    }

    /// The clear button: empty the input and go back to the recent list.
    pub fn clear(&mut self) {
        self.cancel_pending();
        self.input.clear();
        self.focused = true;
        self.hide_results();
        self.show_recent();
        self.state.current_query.clear();
        self.state.selected_index = None;
    }

    /// The search button, or Enter with nothing selected: record and search now.
    pub fn execute_search(&mut self) {
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.debouncer.cancel();
        self.recent.add(&query);
        self.handle_search(&query);
    }

    /// A recent-search entry was clicked.
    pub fn choose_recent(&mut self, index: usize) {
        let Some(query) = self.recent.get(index).map(str::to_string) else {
            return;
        };
        self.debouncer.cancel();
        self.input = query.clone();
        self.handle_search(&query);
        self.hide_recent();
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
        self.hide_recent();
    }

    /// Programmatic search: set the input and search without debounce.
    pub fn search(&mut self, query: &str) {
        self.debouncer.cancel();
        self.input = query.to_string();
        self.handle_search(query.trim());
    }

    // -- internals ----------------------------------------------------------

    fn handle_search(&mut self, query: &str) {
        self.state.current_query = query.to_string();
        self.state.selected_index = None;

        if query.chars().count() < self.min_search_length {
            self.cancel_in_flight();
            self.hide_results();
            if query.is_empty() {
                self.show_recent();
            }
            return;
        }

        self.hide_recent();
        self.panel = Panel::Loading;
        self.state.is_searching = true;

        self.cancel_in_flight();
        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let executor = Arc::clone(&self.executor);
        let tx = self.events_tx.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let result = executor.execute(&query, &token).await;
            let _ = tx.send(WidgetEvent::Completed { generation, query, result });
        });
    }

    fn cancel_pending(&mut self) {
        self.debouncer.cancel();
        self.cancel_in_flight();
    }

    /// Cancel the outstanding search and invalidate any result it may still deliver.
    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            self.generation += 1;
            self.state.is_searching = false;
        }
    }

    fn render_results(&mut self) {
        if self.state.filtered_results.is_empty() {
            self.panel = Panel::NoResults;
            return;
        }
        let query = &self.state.current_query;
        self.panel = Panel::Results(
            self.state.filtered_results.iter().map(|loc| ResultItem::new(loc, query)).collect(),
        );
    }

    fn rendered_count(&self) -> usize {
        match &self.panel {
            Panel::Results(items) => items.len(),
            _ => 0,
        }
    }

    /// Commit a rendered row. Rows that are not on screen cannot be selected.
    fn select_result(&mut self, index: usize) -> Option<Location> {
        let Panel::Results(items) = &self.panel else {
            return None;
        };
        let result = items.get(index)?.location.clone();

        self.cancel_pending();
        self.recent.add(&result.name);
        self.focus_map(&result);

        self.input = result.name.clone();
        self.hide_results();
        self.hide_recent();
        self.focused = false;
        self.map.result_selected(&result);
        info!(id = result.id, name = result.name.as_str(), "Result selected");
        Some(result)
    }

    fn focus_map(&mut self, location: &Location) {
        if let Some((lat, lng)) = location.coordinates() {
            self.map.pan_to(lat, lng);
            self.map.set_zoom(FOCUS_ZOOM);
            self.map.open_info(location);
        }
    }

    fn hide_results(&mut self) {
        self.panel = Panel::Hidden;
        self.state.selected_index = None;
    }

    fn show_recent(&mut self) {
        if !self.recent.is_empty() {
            self.recent_visible = true;
        }
    }

    fn hide_recent(&mut self) {
        self.recent_visible = false;
    }
}

impl Drop for SearchBar {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
