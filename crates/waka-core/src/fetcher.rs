use crate::config::WakaTimeConfig;
use crate::error::{Result, WakaError};
use crate::range::RangeSelector;
use crate::types::SummariesResponse;

use base64::{engine::general_purpose::STANDARD, Engine};
use std::future::Future;
use tracing::{debug, warn};
use url::Url;

const SUMMARIES_PATH: &str = "users/current/summaries";

/// Retrieves raw per-day summaries from the upstream time-tracking API.
///
/// The API key is held here and only ever leaves the process inside the
/// `Authorization` header of the upstream request.
pub struct SummaryFetcher {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for SummaryFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryFetcher")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl SummaryFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: &WakaTimeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("waka-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WakaError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(client, config)
    }

    /// Create a fetcher that shares an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: &WakaTimeConfig) -> Result<Self> {
        let api_key = config
            .usable_api_key()
            .ok_or_else(|| WakaError::Config("WakaTime API key is not configured".into()))?
            .to_string();

        let endpoint = summaries_endpoint(&config.api_base)?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Full upstream URL for a range.
    pub fn request_url(&self, range: &RangeSelector) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("range", range.as_query());
        url
    }

    /// `Authorization` header value: the key as Basic username, empty password.
    pub fn authorization(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.api_key)))
    }

    /// Issue exactly one request for `range` and decode the body.
    pub async fn fetch(&self, range: &RangeSelector) -> Result<SummariesResponse> {
        let url = self.request_url(range);
        debug!("Fetching summaries from {}", url);

        let resp = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("Summaries request failed: {}", e);
                WakaError::upstream(None, e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error body: {}", e));
            warn!("Summaries endpoint returned {}", status);
            return Err(WakaError::upstream(Some(status.as_u16()), body));
        }

        let bytes = resp.bytes().await.map_err(|e| {
            warn!("Reading summaries body failed: {}", e);
            WakaError::upstream(Some(status.as_u16()), e.to_string())
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Summaries body is not valid JSON: {}", e);
            WakaError::upstream(Some(status.as_u16()), format!("Invalid JSON: {}", e))
        })
    }

    /// Like [`fetch`](Self::fetch), but abandons the request as soon as
    /// `cancel` completes.
    pub async fn fetch_with_cancel<C>(
        &self,
        range: &RangeSelector,
        cancel: C,
    ) -> Result<SummariesResponse>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("Summaries fetch cancelled");
                Err(WakaError::Cancelled)
            }
            result = self.fetch(range) => result,
        }
    }
}

fn summaries_endpoint(api_base: &str) -> Result<Url> {
    let base = format!("{}/", api_base.trim().trim_end_matches('/'));
    let base = Url::parse(&base)
        .map_err(|e| WakaError::Config(format!("Invalid API base '{}': {}", api_base, e)))?;
    match base.scheme() {
        "http" | "https" => {}
        other => {
            return Err(WakaError::Config(format!(
                "Scheme '{}' is not allowed for the API base (only http/https)",
                other
            )));
        }
    }
    base.join(SUMMARIES_PATH)
        .map_err(|e| WakaError::Config(format!("Invalid API base '{}': {}", api_base, e)))
}
