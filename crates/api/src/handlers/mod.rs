pub mod analyze;
pub mod project;
pub mod report;
pub mod upload;

use solar_core::error::CoreError;
use solar_core::types::DbId;
use solar_db::models::project::Project;
use solar_db::repositories::ProjectRepo;
use solar_db::DbPool;

use crate::error::{AppError, AppResult};

/// Load a project or fail with 404.
pub(crate) async fn require_project(pool: &DbPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Unwrap a required body field or fail with 400.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Core(CoreError::Validation(format!("{field} required"))))
}
