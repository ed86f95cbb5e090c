use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::ServerState;

/// Liveness. Always 200 while the process serves requests.
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let entries = state.pipeline.corpus().snapshot().len();
    Json(json!({
        "status": "healthy",
        "service": "snoutiq-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_secs(),
        "corpus_loaded": entries > 0,
        "entries": entries,
    }))
}

/// Readiness. 503 until a non-empty corpus is published.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let ready = state.pipeline.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if ready { "ready" } else { "not_ready" },
        "service": "snoutiq-server",
        "components": {
            "corpus": if ready { "loaded" } else { "empty" },
            "embedder": state.pipeline.embedder().model_name(),
            "generator": state.pipeline.generator().model_name(),
        }
    });
    (status, Json(body))
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    match (&state.prometheus, state.config.metrics_enabled) {
        (Some(handle), true) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "metrics disabled\n".to_string(),
        ),
    }
}
