//! Handlers for the `/upload` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use solar_core::error::CoreError;
use solar_core::types::DbId;
use solar_db::models::upload::{CreateUpload, Upload, UploadReceipt};
use solar_db::repositories::UploadRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::{require_project, required};
use crate::query::ProjectIdParams;
use crate::response::OkResponse;
use crate::state::AppState;

/// Body of `DELETE /api/upload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUpload {
    pub project_id: Option<DbId>,
    pub upload_id: Option<DbId>,
}

/// GET /api/upload?projectId=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<Vec<Upload>>> {
    let project_id = params.require()?;
    require_project(&state.pool, project_id).await?;
    let uploads = UploadRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(uploads))
}

/// POST /api/upload
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUpload>,
) -> AppResult<(StatusCode, Json<UploadReceipt>)> {
    input.validate()?;
    require_project(&state.pool, input.project_id).await?;
    let upload = UploadRepo::create(&state.pool, &input).await?;
    tracing::info!(
        project_id = %upload.project_id,
        upload_id = %upload.id,
        kind = upload.kind.name(),
        "Upload stored",
    );
    Ok((StatusCode::CREATED, Json(UploadReceipt::from(&upload))))
}

/// DELETE /api/upload
pub async fn delete(
    State(state): State<AppState>,
    AppJson(input): AppJson<DeleteUpload>,
) -> AppResult<Json<OkResponse>> {
    let project_id = required(input.project_id, "projectId")?;
    let upload_id = required(input.upload_id, "uploadId")?;
    if UploadRepo::delete(&state.pool, project_id, upload_id).await? {
        Ok(Json(OkResponse::ok()))
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Upload",
            id: upload_id,
        }))
    }
}
