//! Repository for per-project upload collections.

use solar_core::defect::Defect;
use solar_core::types::{DbId, Timestamp};

use crate::models::upload::{CreateUpload, Upload};
use crate::store::StoreError;
use crate::DbPool;

/// Key of the document holding a project's uploads.
pub fn uploads_key(project_id: DbId) -> String {
    format!("uploads-{project_id}")
}

/// Provides CRUD operations for uploads.
pub struct UploadRepo;

impl UploadRepo {
    /// List a project's uploads in upload order.
    pub async fn list_by_project(
        pool: &DbPool,
        project_id: DbId,
    ) -> Result<Vec<Upload>, StoreError> {
        pool.load(&uploads_key(project_id)).await
    }

    /// Insert a new, unprocessed upload.
    pub async fn create(pool: &DbPool, input: &CreateUpload) -> Result<Upload, StoreError> {
        let upload = Upload::from_create(input);
        let stored = upload.clone();
        pool.modify(&uploads_key(input.project_id), move |all: &mut Vec<Upload>| {
            all.push(stored)
        })
        .await?;
        Ok(upload)
    }

    /// Attach analysis results to the stored upload.
    ///
    /// An upload already processed keeps its defects (see
    /// [`Upload::record_analysis`]). Returns the stored record afterwards,
    /// or `None` if the upload no longer exists.
    pub async fn record_analysis(
        pool: &DbPool,
        project_id: DbId,
        upload_id: DbId,
        defects: Vec<Defect>,
        at: Timestamp,
    ) -> Result<Option<Upload>, StoreError> {
        pool.try_modify(&uploads_key(project_id), move |all: &mut Vec<Upload>| {
            all.iter_mut().find(|u| u.id == upload_id).map(|u| {
                u.record_analysis(defects, at);
                u.clone()
            })
        })
        .await
    }

    /// Delete one upload. Returns `true` if it existed.
    pub async fn delete(
        pool: &DbPool,
        project_id: DbId,
        upload_id: DbId,
    ) -> Result<bool, StoreError> {
        let removed = pool
            .try_modify(&uploads_key(project_id), move |all: &mut Vec<Upload>| {
                let idx = all.iter().position(|u| u.id == upload_id)?;
                all.remove(idx);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }

    /// Drop a project's entire upload collection.
    pub async fn delete_all_for_project(pool: &DbPool, project_id: DbId) -> Result<bool, StoreError> {
        pool.drop_collection(&uploads_key(project_id)).await
    }
}
