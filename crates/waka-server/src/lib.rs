pub mod routes;
pub mod state;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use waka_core::config::AppConfig;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors_enabled = state.config.server.cors;

    let mut app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::summary_routes())
        .with_state(state);

    // Middleware stack.
    app = app.layer(TraceLayer::new_for_http());

    // The summary is public data; any origin may read it.
    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the HTTP server.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    if config.wakatime.usable_api_key().is_none() {
        tracing::warn!("No WakaTime API key configured — summary requests will fail!");
    }

    let state = AppState::new(config)?;
    let router = build_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Json;
    use tower::ServiceExt;

    /// Serve a fake summaries API on an ephemeral port; returns its API base.
    async fn spawn_upstream(upstream: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{}/api/v1", addr)
    }

    fn test_router(api_key: Option<&str>, api_base: String) -> Router {
        let mut config = AppConfig::default();
        config.wakatime.api_key = api_key.map(String::from);
        config.wakatime.api_base = api_base;
        let state = AppState::new(config).expect("Failed to create test app state");
        build_router(state)
    }

    fn ok_upstream() -> Router {
        Router::new().route(
            "/api/v1/users/current/summaries",
            get(|| async {
                Json(serde_json::json!({
                    "data": [{
                        "languages": [{"name": "Rust", "total_seconds": 5400}],
                        "grand_total": {"total_seconds": 5400}
                    }]
                }))
            }),
        )
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router(None, "http://127.0.0.1:9/api/v1".into());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_summary_success_sets_cache_and_cors_headers() {
        let base = spawn_upstream(ok_upstream()).await;
        let app = test_router(Some("test-key"), base);

        let req = Request::builder()
            .uri("/api/wakatime?range=last_30_days")
            .header("origin", "https://portfolio.example")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["cache-control"],
            "public, s-maxage=600, max-age=600"
        );
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");

        let json = body_json(resp).await;
        assert_eq!(json["total_seconds"], 5400);
        assert_eq!(json["human_readable_total"], "1h 30m");
        assert_eq!(json["languages"][0]["name"], "Rust");
        assert_eq!(json["languages"][0]["percent"], 100.0);
        assert!(json["cachedAt"].is_string());
    }

    #[tokio::test]
    async fn test_missing_key_is_server_error() {
        let app = test_router(None, "http://127.0.0.1:9/api/v1".into());

        let req = Request::builder()
            .uri("/api/wakatime")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()["cache-control"], "no-store");
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("API key"));
        assert!(json["status"].is_null());
    }

    #[tokio::test]
    async fn test_blank_key_is_server_error() {
        let base = spawn_upstream(ok_upstream()).await;
        let app = test_router(Some("   "), base);

        let req = Request::builder()
            .uri("/api/wakatime")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn test_upstream_404_is_bad_gateway() {
        let upstream = Router::new().route(
            "/api/v1/users/current/summaries",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        );
        let base = spawn_upstream(upstream).await;
        let app = test_router(Some("test-key"), base);

        let req = Request::builder()
            .uri("/api/wakatime")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(json["status"], 404);
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_bad_gateway() {
        let upstream = Router::new().route(
            "/api/v1/users/current/summaries",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                "{}"
            }),
        );
        let base = spawn_upstream(upstream).await;

        let mut config = AppConfig::default();
        config.wakatime.api_key = Some("test-key".into());
        config.wakatime.api_base = base;
        config.server.request_timeout_secs = Some(1);
        let app = build_router(AppState::new(config).unwrap());

        let req = Request::builder()
            .uri("/api/wakatime")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_cors_disabled_omits_header() {
        let base = spawn_upstream(ok_upstream()).await;
        let mut config = AppConfig::default();
        config.wakatime.api_key = Some("test-key".into());
        config.wakatime.api_base = base;
        config.server.cors = false;
        let app = build_router(AppState::new(config).unwrap());

        let req = Request::builder()
            .uri("/api/wakatime")
            .header("origin", "https://portfolio.example")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }
}
