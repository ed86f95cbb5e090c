use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use snoutiq::CorpusSummary;

use crate::error::ServerResult;
use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub total_entries: usize,
    pub categories: Vec<CategoryCount>,
    pub embedding_model: String,
    pub generation_model: String,
}

/// `GET /api/v1/datasets/info`
pub async fn dataset_info(State(state): State<Arc<ServerState>>) -> Json<DatasetInfo> {
    let snapshot = state.pipeline.corpus().snapshot();
    Json(DatasetInfo {
        total_entries: snapshot.len(),
        categories: snapshot
            .categories()
            .into_iter()
            .map(|(name, entries)| CategoryCount { name, entries })
            .collect(),
        embedding_model: state.pipeline.embedder().model_name().to_string(),
        generation_model: state.pipeline.generator().model_name().to_string(),
    })
}

/// `POST /api/v1/datasets/reload`
///
/// Rebuilds the corpus from the configured dataset directory. On failure the
/// previous corpus keeps serving.
pub async fn reload_datasets(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<serde_json::Value>> {
    let _guard = state.reload_lock.lock().await;
    let summary: CorpusSummary = state
        .pipeline
        .load_dataset_dir(&state.config.dataset_dir)
        .await?;

    tracing::info!(
        entries = summary.entries,
        rejected = summary.rejected.len(),
        skipped_files = summary.skipped_files.len(),
        "datasets_reloaded"
    );

    Ok(Json(json!({
        "success": true,
        "data": summary,
    })))
}
