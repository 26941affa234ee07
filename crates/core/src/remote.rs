//! Remote search over HTTP.
//!
//! `GET <search_url>?q=<query>&limit=<n>` returning a JSON array of location records,
//! bounded by a per-request timeout. Non-2xx statuses and unrecognized bodies are errors.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::debug;

use crate::config::SearchConfig;
use crate::decode::decode_locations;
use crate::error::{Result, SearchError};
use crate::types::Location;

pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Location>>> + Send + 'a>>;

/// A place the executor can ask for matching locations before falling back to local search.
pub trait SearchSource: Send + Sync {
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a>;
}

pub struct RemoteSearch {
    client: reqwest::Client,
    search_url: String,
    locations_url: String,
    timeout: Duration,
}

impl RemoteSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            search_url: config.search_url(),
            locations_url: config.locations_url(),
            timeout: config.api_timeout(),
        })
    }

    async fn get_locations(&self, request: reqwest::RequestBuilder) -> Result<Vec<Location>> {
        let fut = async {
            let response = request.header(ACCEPT, "application/json").send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SearchError::Status(status.as_u16()));
            }
            let body = response.bytes().await?;
            decode_locations(&body)
        };
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Fetch the full location list, used to pre-load the fallback corpus.
    pub async fn fetch_all(&self) -> Result<Vec<Location>> {
        debug!(url = self.locations_url.as_str(), "Fetching location list");
        self.get_locations(self.client.get(&self.locations_url)).await
    }
}

impl SearchSource for RemoteSearch {
    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SearchFuture<'a> {
        Box::pin(async move {
            debug!(url = self.search_url.as_str(), query, limit, "Remote search");
            let limit = limit.to_string();
            let request =
                self.client.get(&self.search_url).query(&[("q", query), ("limit", limit.as_str())]);
            self.get_locations(request).await
        })
    }
}
