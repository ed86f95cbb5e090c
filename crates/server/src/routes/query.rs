use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use snoutiq::{AnalysisResult, Species, SubjectProfile};

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

const MIN_QUERY_CHARS: usize = 10;
const MAX_QUERY_CHARS: usize = 1000;

/// Body of `POST /api/v1/query`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub vaccination_summary: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub query: String,
}

impl QueryRequest {
    /// Checks the request and splits it into the profile and trimmed query.
    pub fn validate(self) -> Result<(SubjectProfile, String), ServerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ServerError::Validation("name is required".into()));
        }
        let species = self.species.trim();
        if species.is_empty() {
            return Err(ServerError::Validation("species is required".into()));
        }
        if Species::normalize(species).is_none() {
            return Err(ServerError::Validation(format!(
                "species '{species}' is not supported; expected a dog or a cat"
            )));
        }

        let query = self.query.trim();
        let chars = query.chars().count();
        if chars == 0 {
            return Err(ServerError::Validation("query is required".into()));
        }
        if !(MIN_QUERY_CHARS..=MAX_QUERY_CHARS).contains(&chars) {
            return Err(ServerError::Validation(format!(
                "query must be between {MIN_QUERY_CHARS} and {MAX_QUERY_CHARS} characters"
            )));
        }

        let profile = SubjectProfile {
            name: name.to_string(),
            species: species.to_string(),
            breed: non_blank(self.breed),
            age: non_blank(self.age),
            weight: non_blank(self.weight),
            sex: non_blank(self.sex),
            vaccination_summary: non_blank(self.vaccination_summary),
            medical_history: non_blank(self.medical_history),
        };
        Ok((profile, query.to_string()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub data: AnalysisResult,
}

/// Analyze a pet's symptoms.
///
/// `POST /api/v1/query` (also `POST /query`)
pub async fn analyze_symptoms(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> ServerResult<Json<QueryResponse>> {
    let Json(request) = body?;
    let (profile, query) = request.validate()?;

    let data = state.pipeline.analyze(&profile, &query).await?;
    Ok(Json(QueryResponse {
        success: true,
        data,
    }))
}
