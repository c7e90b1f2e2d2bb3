use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::time::Duration;
use waka_analytics::{get_summary, SummaryOutput};
use waka_core::{RangeSelector, WakaError};

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── WakaTime summary ────────────────────────────────────────────────────

pub fn summary_routes() -> Router<AppState> {
    Router::new().route("/api/wakatime", get(wakatime_summary))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub range: Option<String>,
}

async fn wakatime_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Response, ApiError> {
    let range = RangeSelector::from_optional(
        params
            .range
            .as_deref()
            .or(Some(state.config.wakatime.default_range.as_str())),
    );

    let output = fetch_summary(&state, &range).await?;

    let max_age = state.config.server.cache_max_age_secs;
    let cache_control = format!("public, s-maxage={max_age}, max-age={max_age}");
    Ok(([(header::CACHE_CONTROL, cache_control)], Json(output)).into_response())
}

/// Fetch and aggregate, bounded by the configured wall-clock timeout.
///
/// Dropping this future (client disconnect) drops the upstream request too.
async fn fetch_summary(state: &AppState, range: &RangeSelector) -> Result<SummaryOutput, WakaError> {
    let fetcher = state.fetcher()?;
    tracing::debug!("Serving summary for range {}", range);

    match state.config.server.request_timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), get_summary(&fetcher, range))
            .await
            .unwrap_or_else(|_| Err(WakaError::upstream(None, format!("timed out after {}s", secs)))),
        None => get_summary(&fetcher, range).await,
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// HTTP rendering of a [`WakaError`].
#[derive(Debug)]
pub struct ApiError(pub WakaError);

impl From<WakaError> for ApiError {
    fn from(err: WakaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match &err {
            WakaError::Config(msg) => tracing::error!("Summary unavailable: {}", msg),
            WakaError::Upstream { status, .. } => {
                tracing::warn!("Upstream failure (status {:?}): {}", status, err)
            }
            WakaError::Cancelled => tracing::debug!("Summary request cancelled"),
        }

        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "error": err.to_string(),
            "status": err.upstream_status(),
        }));
        (status, [(header::CACHE_CONTROL, "no-store")], body).into_response()
    }
}
