use waka_core::config::AppConfig;
use waka_core::error::Result;
use waka_core::SummaryFetcher;

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("waka-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    /// Fetcher for one request. Built per request so a missing key surfaces
    /// as a configuration error to the caller rather than at startup.
    pub fn fetcher(&self) -> Result<SummaryFetcher> {
        SummaryFetcher::with_client(self.http.clone(), &self.config.wakatime)
    }
}
