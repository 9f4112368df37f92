//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use solar_core::error::CoreError;
use solar_core::types::DbId;
use solar_db::models::project::{CreateProject, Project, UpdateProject};
use solar_db::repositories::ProjectRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::{require_project, required};
use crate::response::OkResponse;
use crate::state::AppState;

/// Body of `DELETE /api/projects`.
#[derive(Debug, Deserialize)]
pub struct DeleteProject {
    pub id: Option<DbId>,
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    input.validate()?;
    let project = ProjectRepo::create(&state.pool, &input, chrono::Utc::now()).await?;
    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Project>> {
    let project = require_project(&state.pool, id).await?;
    Ok(Json(project))
}

/// PATCH /api/projects
pub async fn update(
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    input.validate()?;
    let id = input.id;
    let project = ProjectRepo::update(&state.pool, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /api/projects
pub async fn delete(
    State(state): State<AppState>,
    AppJson(input): AppJson<DeleteProject>,
) -> AppResult<Json<OkResponse>> {
    let id = required(input.id, "id")?;
    let deleted = ProjectRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(project_id = %id, "Project deleted");
        Ok(Json(OkResponse::ok()))
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}
