//! Bounded-time remote fetching with raw snapshots.
//!
//! [`RawFetcher::fetch_json`] distinguishes two failure classes:
//!
//! - **Transient** (connection failure, timeout, non-2xx status, body that
//!   is not JSON): logged and returned as `Ok(None)`. The caller decides
//!   whether to substitute cached or fallback data.
//! - **Fatal** (the snapshot cannot be written): returned as `Err`.
//!
//! Requests are never retried here.

use std::time::Duration;

use crate::SourceError;
use crate::raw_store::RawStore;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A single remote GET request.
#[derive(Debug, Clone)]
pub struct RemoteRequest<'a> {
    /// City namespace for the raw snapshot.
    pub city: &'a str,
    /// Label for log messages (e.g., `"NYC crime data"`).
    pub label: &'a str,
    /// Endpoint URL.
    pub url: &'a str,
    /// Query parameters, URL-encoded on send.
    pub query: Vec<(&'static str, String)>,
    /// Request timeout.
    pub timeout: Duration,
    /// Raw snapshot filename under `raw/<city>/`.
    pub snapshot: &'a str,
}

/// HTTP fetcher that persists a raw snapshot of every successful fetch.
#[derive(Debug, Clone)]
pub struct RawFetcher {
    client: reqwest::Client,
    store: RawStore,
}

impl RawFetcher {
    /// Creates a fetcher writing snapshots into `store`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(store: RawStore) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("safeworld/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, store })
    }

    /// Returns the snapshot store.
    #[must_use]
    pub const fn store(&self) -> &RawStore {
        &self.store
    }

    /// Fetches a JSON document.
    ///
    /// Returns `Ok(None)` on any transient failure. On success the body is
    /// written to the raw snapshot before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the snapshot cannot be written.
    pub async fn fetch_json(
        &self,
        request: &RemoteRequest<'_>,
    ) -> Result<Option<serde_json::Value>, SourceError> {
        log::info!("Fetching {} from {}", request.label, request.url);

        let response = match self
            .client
            .get(request.url)
            .query(&request.query)
            .timeout(request.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error fetching {}: {e}", request.label);
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::error!("Error fetching {}: HTTP {status}", request.label);
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::error!("Error reading {} response body: {e}", request.label);
                return Ok(None);
            }
        };

        let json: serde_json::Value = match serde_json::from_str(&body) {
            Ok(json) => json,
            Err(e) => {
                log::error!("{} response is not valid JSON: {e}", request.label);
                return Ok(None);
            }
        };

        let path = self
            .store
            .write_snapshot(request.city, request.snapshot, &json)?;
        log::info!("Saved raw {} to {}", request.label, path.display());

        Ok(Some(json))
    }
}
