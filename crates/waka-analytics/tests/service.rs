use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::time::Duration;
use waka_analytics::{get_summary, get_summary_with_cancel};
use waka_core::config::WakaTimeConfig;
use waka_core::{RangeSelector, SummaryFetcher, WakaError};

async fn fetcher_for(router: Router) -> SummaryFetcher {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    SummaryFetcher::new(&WakaTimeConfig {
        api_key: Some("test-key".into()),
        api_base: format!("http://{}/api/v1", addr),
        ..WakaTimeConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_get_summary_end_to_end() {
    let router = Router::new().route(
        "/api/v1/users/current/summaries",
        get(|| async {
            Json(serde_json::json!({
                "data": [
                    {
                        "languages": [{"name": "Go", "total_seconds": 3600}],
                        "editors": [{"name": "Neovim", "total_seconds": 3600}],
                        "projects": [{"name": "portfolio", "total_seconds": 3600}],
                        "grand_total": {"total_seconds": 3600},
                        "range": {"start": "2024-05-01T00:00:00Z", "end": "2024-05-01T23:59:59Z"}
                    },
                    {
                        "languages": [
                            {"name": "Go", "total_seconds": 1800},
                            {"name": "Rust", "total_seconds": 1800}
                        ],
                        "editors": [{"name": "Neovim", "total_seconds": 3600}],
                        "projects": [{"total_seconds": 3600}],
                        "grand_total": {"total_seconds": 3600},
                        "range": {"start": "2024-05-02T00:00:00Z", "end": "2024-05-02T23:59:59Z"}
                    }
                ]
            }))
        }),
    );
    let fetcher = fetcher_for(router).await;

    let out = get_summary(&fetcher, &RangeSelector::default()).await.unwrap();

    assert_eq!(out.total_seconds, 7200);
    assert_eq!(out.human_readable_total, "2h 0m");
    assert_eq!(out.languages[0].name, "Go");
    assert_eq!(out.languages[0].percent, 75.0);
    assert_eq!(out.editors[0].digital, "2h 0m");
    assert_eq!(out.projects.len(), 2);
    assert_eq!(out.range.start.as_deref(), Some("2024-05-01T00:00:00Z"));
    assert_eq!(out.range.end.as_deref(), Some("2024-05-02T23:59:59Z"));
}

#[tokio::test]
async fn test_get_summary_propagates_upstream_status() {
    let router = Router::new().route(
        "/api/v1/users/current/summaries",
        get(|| async { (StatusCode::NOT_FOUND, "{\"error\":\"Not found.\"}") }),
    );
    let fetcher = fetcher_for(router).await;

    let err = get_summary(&fetcher, &RangeSelector::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WakaError::Upstream { status: Some(404), .. }));
}

#[tokio::test]
async fn test_cancelled_summary_produces_no_output() {
    let router = Router::new().route(
        "/api/v1/users/current/summaries",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(serde_json::json!({ "data": [] }))
        }),
    );
    let fetcher = fetcher_for(router).await;

    let result = get_summary_with_cancel(
        &fetcher,
        &RangeSelector::default(),
        tokio::time::sleep(Duration::from_millis(50)),
    )
    .await;
    assert!(matches!(result, Err(WakaError::Cancelled)));
}
