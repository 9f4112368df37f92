//! Handlers for the `/report` resource.

use axum::extract::{Query, State};
use axum::Json;
use solar_core::panel_map::PanelMap;
use solar_core::report::InspectionReport;
use solar_core::scoring::effective_panel_count;
use solar_db::repositories::UploadRepo;

use crate::error::AppResult;
use crate::handlers::require_project;
use crate::query::ProjectIdParams;
use crate::state::AppState;

/// GET /api/report?projectId=
///
/// Recomputed from stored defects on every call.
pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<InspectionReport>> {
    let project_id = params.require()?;
    let project = require_project(&state.pool, project_id).await?;
    let uploads = UploadRepo::list_by_project(&state.pool, project_id).await?;

    let upload_count = uploads.len();
    let defects = uploads.into_iter().flat_map(|u| u.defects).collect();

    Ok(Json(InspectionReport::build(
        project_id,
        project.panel_count,
        upload_count,
        defects,
        chrono::Utc::now(),
    )))
}

/// GET /api/report/map?projectId=
pub async fn map(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<PanelMap>> {
    let project_id = params.require()?;
    let project = require_project(&state.pool, project_id).await?;
    let uploads = UploadRepo::list_by_project(&state.pool, project_id).await?;

    let panels = effective_panel_count(project.panel_count, uploads.len());
    let defects: Vec<_> = uploads.into_iter().flat_map(|u| u.defects).collect();

    Ok(Json(PanelMap::build(panels, &defects)))
}
