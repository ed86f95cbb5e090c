//! API route handlers
//!
//! - `health`: liveness, readiness and Prometheus metrics
//! - `query`: symptom analysis
//! - `datasets`: corpus info and reload

pub mod datasets;
pub mod health;
pub mod query;

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ServerError;

/// Service banner (GET /). No authentication.
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "Snoutiq Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/query",
            "/api/v1/datasets/info",
            "/api/v1/datasets/reload",
            "/health",
            "/ready",
            "/metrics"
        ]
    }))
}

/// 404 for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
