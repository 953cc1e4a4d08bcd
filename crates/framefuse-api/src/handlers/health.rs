//! Health and service banner handlers.

use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Service banner with the endpoint listing.
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": "framefuse",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /video-overlay": "Compose two videos with overlay, text, border and avatar options",
            "POST /overlay-urls": "Simplified two-video overlay from URLs",
            "POST /reels-overlay": "Split-vertical reels composition from uploaded files",
            "POST /reels-overlay-urls": "Split-vertical reels composition from URLs",
            "GET /uploads/{file}": "Download a rendered composition",
            "GET /health": "Liveness probe",
        },
    }))
}
