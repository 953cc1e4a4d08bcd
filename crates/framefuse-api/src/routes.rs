//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::handlers::compose::{overlay_urls, reels_overlay, reels_overlay_urls, video_overlay};
use crate::handlers::health::{health, index};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    crate::error::set_production(state.config.is_production());
    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let compose_routes = Router::new()
        .route("/video-overlay", post(video_overlay))
        .route("/overlay-urls", post(overlay_urls))
        .route("/reels-overlay", post(reels_overlay))
        .route("/reels-overlay-urls", post(reels_overlay_urls))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let info_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/healthz", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(compose_routes)
        .merge(info_routes)
        .merge(metrics_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
        // Multipart bodies carry whole videos; both limits must agree.
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::ApiConfig;

    fn test_router_with_dir() -> (Router, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap().keep();
        let config = ApiConfig {
            uploads_dir: dir.clone(),
            rate_limit_rps: 1000,
            ..ApiConfig::default()
        };
        (create_router(AppState::new(config), None), dir)
    }

    fn test_router() -> Router {
        test_router_with_dir().0
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_post(uri: &str, parts: &[(&str, &[u8])]) -> Request<Body> {
        let boundary = "framefuse-test-boundary";
        let mut body = Vec::new();
        for (name, bytes) in parts {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; \
                     name=\"{name}\"; filename=\"{name}.mp4\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let response = test_router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["service"], "framefuse");
        assert!(body["endpoints"].is_object());
    }

    #[tokio::test]
    async fn test_missing_overlay_url_is_bad_request() {
        let response = test_router()
            .oneshot(json_post(
                "/video-overlay",
                r#"{"backgroundUrl": "http://example.com/bg.mp4"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("overlayUrl is required"));
    }

    #[tokio::test]
    async fn test_unknown_format_is_bad_request() {
        let response = test_router()
            .oneshot(json_post(
                "/video-overlay",
                r#"{
                    "backgroundUrl": "http://example.com/bg.mp4",
                    "overlayUrl": "http://example.com/fg.mp4",
                    "format": "cinema"
                }"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reels_urls_requires_both_videos() {
        let response = test_router()
            .oneshot(json_post(
                "/reels-overlay-urls",
                r#"{"topVideoUrl": "http://example.com/top.mp4"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reels_multipart_requires_top_video() {
        let response = test_router()
            .oneshot(multipart_post(
                "/reels-overlay",
                &[("bottomVideo", b"not a video".as_slice())],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("topVideo file is required"));
    }

    #[tokio::test]
    async fn test_reels_multipart_rejects_empty_upload() {
        let response = test_router()
            .oneshot(multipart_post(
                "/reels-overlay",
                &[
                    ("topVideo", b"".as_slice()),
                    ("bottomVideo", b"not a video".as_slice()),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("topVideo file is empty"));
    }

    #[tokio::test]
    async fn test_reels_multipart_cleans_spooled_files() {
        let (router, dir) = test_router_with_dir();
        let response = router
            .oneshot(multipart_post(
                "/reels-overlay",
                &[
                    ("topVideo", b"not a video".as_slice()),
                    ("bottomVideo", b"not a video".as_slice()),
                ],
            ))
            .await
            .unwrap();
        // Garbage bytes cannot render, whether or not a renderer is present.
        assert!(response.status().is_server_error());

        let leftovers: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("top-") || name.starts_with("bottom-"))
            .collect();
        assert!(leftovers.is_empty(), "spooled inputs left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = test_router()
            .oneshot(json_post("/video-overlay", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("error").is_some());
    }
}
