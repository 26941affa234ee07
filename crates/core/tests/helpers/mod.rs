//! Shared fixtures for integration tests: a fake search source, a recording map,
//! and a local axum server standing in for the remote search endpoint.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use centerfind_core::remote::{SearchFuture, SearchSource};
use centerfind_core::widget::MapView;
use centerfind_core::{Location, SearchError};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

pub fn corpus() -> Vec<Location> {
    vec![
        Location::new(1, "Seongnam Center", "수정구 A").with_coordinates(37.44, 127.13),
        Location::new(2, "Bundang Hall", "분당구 B")
            .with_tel("031-111-2222")
            .with_coordinates(37.38, 127.12),
        Location::new(3, "Jungwon Center", "중원구 C").with_coordinates(37.43, 127.15),
    ]
}

// ---------------------------------------------------------------------------
// Fake search source
// ---------------------------------------------------------------------------

/// Answers by name substring over a fixed list, counting calls. Queries listed in
/// `delays` take that long to answer; `fail` makes every call a 503.
#[derive(Clone, Default)]
pub struct FakeSource {
    pub calls: Arc<AtomicUsize>,
    pub queries: Arc<Mutex<Vec<String>>>,
    pub locations: Vec<Location>,
    pub delays: HashMap<String, Duration>,
    pub fail: bool,
}

impl FakeSource {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl SearchSource for FakeSource {
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        Box::pin(async move {
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail {
                return Err(SearchError::Status(503));
            }
            let q = query.to_lowercase();
            Ok(self
                .locations
                .iter()
                .filter(|l| l.name.to_lowercase().contains(&q))
                .take(limit)
                .cloned()
                .collect())
        })
    }
}

// ---------------------------------------------------------------------------
// Recording map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    PanTo(f64, f64),
    Zoom(u8),
    Info(u64),
    Selected(u64),
}

#[derive(Clone, Default)]
pub struct RecordingMap {
    pub calls: Arc<Mutex<Vec<MapCall>>>,
}

impl RecordingMap {
    pub fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl MapView for RecordingMap {
    fn pan_to(&mut self, lat: f64, lng: f64) {
        self.calls.lock().unwrap().push(MapCall::PanTo(lat, lng));
    }

    fn set_zoom(&mut self, zoom: u8) {
        self.calls.lock().unwrap().push(MapCall::Zoom(zoom));
    }

    fn open_info(&mut self, location: &Location) {
        self.calls.lock().unwrap().push(MapCall::Info(location.id));
    }

    fn result_selected(&mut self, location: &Location) {
        self.calls.lock().unwrap().push(MapCall::Selected(location.id));
    }
}

// ---------------------------------------------------------------------------
// Local search endpoint
// ---------------------------------------------------------------------------

pub struct TestServer {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    limit: Option<usize>,
}

fn marker(loc: &Location) -> Value {
    json!({
        "id": loc.id,
        "name": loc.name,
        "tel": loc.tel,
        "address": loc.address,
        "lat": loc.lat,
        "lng": loc.lng,
    })
}

fn entity(loc: &Location) -> Value {
    json!({
        "id": loc.id,
        "locationName": { "locationName": loc.name },
        "locationNumber": { "locationNumber": loc.tel },
        "locationAddress": { "address": loc.address },
        "latitude": { "latitude": loc.lat },
        "longitude": { "longitude": loc.lng },
        "status": 1,
    })
}

async fn search_handler(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<SearchParams>,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let q = params.q.to_lowercase();
    let items: Vec<Value> = corpus()
        .iter()
        .filter(|l| format!("{} {}", l.name, l.address).to_lowercase().contains(&q))
        .take(params.limit.unwrap_or(10))
        .map(marker)
        .collect();
    Json(Value::Array(items))
}

async fn all_handler(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(corpus().iter().map(entity).collect()))
}

async fn failing_handler(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, &'static str) {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn wrong_shape_handler(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "results": [] }))
}

async fn slow_handler(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!([]))
}

/// Routes:
/// - `/api/v1/location/search` — marker-shaped matches
/// - `/api/v1/location` — every location, entity-shaped
/// - `/broken/search` — 500
/// - `/shape/search` — a JSON object instead of an array
/// - `/slow/search` — answers after 5s
pub async fn spawn_server() -> TestServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/api/v1/location/search", get(search_handler))
        .route("/api/v1/location", get(all_handler))
        .route("/broken/search", get(failing_handler))
        .route("/shape/search", get(wrong_shape_handler))
        .route("/slow/search", get(slow_handler))
        .with_state(Arc::clone(&hits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });

    TestServer { base_url: format!("http://{addr}"), hits, handle }
}

/// An address nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
