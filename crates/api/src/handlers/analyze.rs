//! Handler for `POST /api/analyze`.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use solar_core::report::AnalysisSummary;
use solar_core::types::DbId;

use crate::engine::analysis;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::required;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub project_id: Option<DbId>,
}

/// POST /api/analyze
pub async fn run(
    State(state): State<AppState>,
    AppJson(input): AppJson<AnalyzeRequest>,
) -> AppResult<Json<AnalysisSummary>> {
    let project_id = required(input.project_id, "projectId")?;
    let summary = analysis::analyze_project(&state.pool, &state.detector, project_id).await?;
    Ok(Json(summary))
}
