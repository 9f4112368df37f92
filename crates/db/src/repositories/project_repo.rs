//! Repository for the `projects` collection.

use solar_core::types::{DbId, Timestamp};

use crate::models::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use crate::repositories::UploadRepo;
use crate::store::StoreError;
use crate::DbPool;

/// Key of the document holding every project.
pub const PROJECTS_KEY: &str = "projects";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new draft project, returning the created record.
    pub async fn create(
        pool: &DbPool,
        input: &CreateProject,
        now: Timestamp,
    ) -> Result<Project, StoreError> {
        let project = Project::from_create(input, now);
        let stored = project.clone();
        pool.modify(PROJECTS_KEY, move |all: &mut Vec<Project>| all.push(stored))
            .await?;
        Ok(project)
    }

    /// Find a project by id.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Project>, StoreError> {
        let all: Vec<Project> = pool.load(PROJECTS_KEY).await?;
        Ok(all.into_iter().find(|p| p.id == id))
    }

    /// List all projects in creation order.
    pub async fn list(pool: &DbPool) -> Result<Vec<Project>, StoreError> {
        pool.load(PROJECTS_KEY).await
    }

    /// Set a project's status. Returns the stored record, or `None` if the
    /// project no longer exists (nothing is written then).
    pub async fn set_status(
        pool: &DbPool,
        id: DbId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, StoreError> {
        pool.try_modify(PROJECTS_KEY, move |all: &mut Vec<Project>| {
            all.iter_mut().find(|p| p.id == id).map(|p| {
                p.status = status;
                p.clone()
            })
        })
        .await
    }

    /// Mark a project complete with its new health score, leaving every
    /// other field as currently stored.
    pub async fn complete_analysis(
        pool: &DbPool,
        id: DbId,
        health_score: f64,
    ) -> Result<Option<Project>, StoreError> {
        pool.try_modify(PROJECTS_KEY, move |all: &mut Vec<Project>| {
            all.iter_mut().find(|p| p.id == id).map(|p| {
                p.status = ProjectStatus::Complete;
                p.health_score = Some(health_score);
                p.clone()
            })
        })
        .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no project with `input.id` exists.
    pub async fn update(
        pool: &DbPool,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError> {
        let input = input.clone();
        pool.try_modify(PROJECTS_KEY, move |all: &mut Vec<Project>| {
            all.iter_mut().find(|p| p.id == input.id).map(|p| {
                p.apply(&input);
                p.clone()
            })
        })
        .await
    }

    /// Delete a project and its uploads. Returns `true` if the project
    /// existed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, StoreError> {
        let removed = pool
            .try_modify(PROJECTS_KEY, move |all: &mut Vec<Project>| {
                let idx = all.iter().position(|p| p.id == id)?;
                all.remove(idx);
                Some(())
            })
            .await?
            .is_some();
        UploadRepo::delete_all_for_project(pool, id).await?;
        Ok(removed)
    }
}
