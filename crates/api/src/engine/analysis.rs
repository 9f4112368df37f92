//! Project analysis: run detection over every unprocessed upload and
//! score the project.

use solar_core::defect::{Defect, DefectOrigin};
use solar_core::error::CoreError;
use solar_core::report::AnalysisSummary;
use solar_core::scoring::{calculate_health_score, effective_panel_count};
use solar_core::types::DbId;
use solar_db::models::project::ProjectStatus;
use solar_db::models::upload::Upload;
use solar_db::repositories::{ProjectRepo, UploadRepo};
use solar_db::DbPool;
use solar_detector::{DetectionChain, DetectionRequest};

use crate::error::{AppError, AppResult};
use crate::handlers::require_project;

/// Analyze a project and persist the outcome.
///
/// Uploads are processed one at a time. An upload that already carries a
/// `processedAt` timestamp keeps its stored defects and is not sent to the
/// detector again, so re-running is idempotent for old images. Detector
/// failures never surface here: the chain always ends in the mock.
///
/// Every write touches only the fields analysis owns, on the record as
/// stored at that moment. Edits made while detection runs are kept, and a
/// project or upload deleted meanwhile stays deleted.
pub async fn analyze_project(
    pool: &DbPool,
    detector: &DetectionChain,
    project_id: DbId,
) -> AppResult<AnalysisSummary> {
    let project = require_project(pool, project_id).await?;
    let uploads = UploadRepo::list_by_project(pool, project_id).await?;
    if uploads.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No images uploaded".into(),
        )));
    }

    ProjectRepo::set_status(pool, project_id, ProjectStatus::Processing)
        .await?
        .ok_or_else(|| not_found(project_id))?;
    tracing::info!(%project_id, uploads = uploads.len(), "Analysis started");

    let analyzed = match analyze_uploads(pool, detector, project_id, uploads).await {
        Ok(analyzed) => analyzed,
        Err(e) => {
            restore_status(pool, project_id, project.status).await;
            return Err(e);
        }
    };

    let upload_count = analyzed.len();
    let all_defects: Vec<Defect> = analyzed.into_iter().flat_map(|u| u.defects).collect();

    // Score against the panel count as stored now, not as first read.
    let panel_count = require_project(pool, project_id).await?.panel_count;
    let health_score = calculate_health_score(
        effective_panel_count(panel_count, upload_count),
        &all_defects,
    );

    ProjectRepo::complete_analysis(pool, project_id, health_score)
        .await?
        .ok_or_else(|| not_found(project_id))?;

    tracing::info!(
        %project_id,
        health_score,
        defects = all_defects.len(),
        "Analysis complete",
    );

    Ok(AnalysisSummary::new(project_id, health_score, all_defects))
}

/// Run detection over each unprocessed upload and record the result.
///
/// Returns the uploads as stored after recording, skipping any deleted
/// while the run was in progress.
async fn analyze_uploads(
    pool: &DbPool,
    detector: &DetectionChain,
    project_id: DbId,
    uploads: Vec<Upload>,
) -> AppResult<Vec<Upload>> {
    let mut analyzed = Vec::with_capacity(uploads.len());

    for upload in uploads {
        if upload.is_processed() {
            analyzed.push(upload);
            continue;
        }

        let request = DetectionRequest {
            image: &upload.data_url,
            kind: upload.kind,
            origin: DefectOrigin::new(project_id, upload.id),
        };
        let detection = detector.detect(&request).await;
        tracing::info!(
            %project_id,
            upload_id = %upload.id,
            method = %detection.method,
            defects = detection.defects.len(),
            "Upload analyzed",
        );

        let stored = UploadRepo::record_analysis(
            pool,
            project_id,
            upload.id,
            detection.defects,
            chrono::Utc::now(),
        )
        .await?;
        match stored {
            Some(stored) => analyzed.push(stored),
            None => tracing::info!(
                %project_id,
                upload_id = %upload.id,
                "Upload deleted during analysis, result dropped",
            ),
        }
    }

    Ok(analyzed)
}

/// Put the project back to `previous` after a failed run.
async fn restore_status(pool: &DbPool, project_id: DbId, previous: ProjectStatus) {
    if let Err(e) = ProjectRepo::set_status(pool, project_id, previous).await {
        tracing::error!(%project_id, error = %e, "Failed to restore project status");
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::Value;
    use solar_core::defect::{DefectType, ImageKind, Severity};
    use solar_db::models::project::{CreateProject, UpdateProject};
    use solar_db::models::upload::CreateUpload;
    use solar_db::store::{DocumentBackend, MemoryBackend, Store};
    use solar_db::StoreError;
    use solar_detector::{DefectDetector, DetectionMethod, DetectorError};
    use tokio::sync::Notify;

    use super::*;

    /// Reports one critical crack per image and counts its calls.
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DefectDetector for Counting {
        fn method(&self) -> DetectionMethod {
            DetectionMethod::Primary
        }

        async fn detect(
            &self,
            request: &DetectionRequest<'_>,
        ) -> Result<Vec<Defect>, DetectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![request.origin.defect(
                DefectType::Crack,
                Severity::Critical,
                "counted",
                0.9,
            )])
        }
    }

    /// Blocks every detection until released, announcing when it starts.
    struct Gated {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl DefectDetector for Gated {
        fn method(&self) -> DetectionMethod {
            DetectionMethod::Primary
        }

        async fn detect(
            &self,
            request: &DetectionRequest<'_>,
        ) -> Result<Vec<Defect>, DetectorError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(vec![request.origin.defect(
                DefectType::Soiling,
                Severity::Info,
                "gated",
                0.8,
            )])
        }
    }

    fn gated_chain() -> (Arc<DetectionChain>, Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let chain = DetectionChain::new(vec![Box::new(Gated {
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        })]);
        (Arc::new(chain), started, release)
    }

    /// Memory backend whose upload writes fail once armed.
    #[derive(Default)]
    struct FailingUploads {
        inner: MemoryBackend,
        armed: AtomicBool,
    }

    #[async_trait]
    impl DocumentBackend for FailingUploads {
        async fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.inner.read(key).await
        }

        async fn write(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
            if self.armed.load(Ordering::SeqCst) && key.starts_with("uploads-") {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.write(key, doc).await
        }

        async fn remove(&self, key: &str) -> Result<bool, StoreError> {
            self.inner.remove(key).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn counting_chain() -> (DetectionChain, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = DetectionChain::new(vec![Box::new(Counting {
            calls: Arc::clone(&calls),
        })]);
        (chain, calls)
    }

    async fn seed(pool: &DbPool, panel_count: u32, images: usize) -> DbId {
        let project = ProjectRepo::create(
            pool,
            &CreateProject {
                panel_count: Some(panel_count),
                ..Default::default()
            },
            chrono::Utc::now(),
        )
        .await
        .unwrap();
        for i in 0..images {
            UploadRepo::create(
                pool,
                &CreateUpload {
                    project_id: project.id,
                    filename: Some(format!("img-{i}.jpg")),
                    kind: Some(ImageKind::Thermal),
                    data_url: "data:image/jpeg;base64,AAAA".into(),
                },
            )
            .await
            .unwrap();
        }
        project.id
    }

    #[tokio::test]
    async fn analyzes_every_upload_and_completes_project() {
        let pool = DbPool::in_memory();
        let (chain, calls) = counting_chain();
        let project_id = seed(&pool, 100, 2).await;

        let summary = analyze_project(&pool, &chain, project_id).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.total_defects, 2);
        assert_eq!(summary.counts.critical_count, 2);
        // Two criticals on a hundred panels: 100 - (16 / 100) * 100.
        assert_eq!(summary.health_score, 84.0);

        let project = ProjectRepo::find_by_id(&pool, project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Complete);
        assert_eq!(project.health_score, Some(84.0));

        let uploads = UploadRepo::list_by_project(&pool, project_id).await.unwrap();
        assert!(uploads.iter().all(|u| u.is_processed() && u.defects.len() == 1));
    }

    #[tokio::test]
    async fn rerun_reuses_stored_defects() {
        let pool = DbPool::in_memory();
        let (chain, calls) = counting_chain();
        let project_id = seed(&pool, 0, 3).await;

        let first = analyze_project(&pool, &chain, project_id).await.unwrap();
        let second = analyze_project(&pool, &chain, project_id).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(first.defects, second.defects);
        assert_eq!(first.health_score, second.health_score);
    }

    #[tokio::test]
    async fn only_new_uploads_reach_the_detector() {
        let pool = DbPool::in_memory();
        let (chain, calls) = counting_chain();
        let project_id = seed(&pool, 0, 1).await;
        analyze_project(&pool, &chain, project_id).await.unwrap();

        UploadRepo::create(
            &pool,
            &CreateUpload {
                project_id,
                filename: None,
                kind: None,
                data_url: "data:,".into(),
            },
        )
        .await
        .unwrap();

        let summary = analyze_project(&pool, &chain, project_id).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.total_defects, 2);
    }

    #[tokio::test]
    async fn no_uploads_is_rejected_without_touching_status() {
        let pool = DbPool::in_memory();
        let (chain, calls) = counting_chain();
        let project_id = seed(&pool, 10, 0).await;

        let result = analyze_project(&pool, &chain, project_id).await;
        assert_matches!(
            result,
            Err(AppError::Core(CoreError::Validation(msg))) if msg == "No images uploaded"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let project = ProjectRepo::find_by_id(&pool, project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Draft);
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let pool = DbPool::in_memory();
        let (chain, _) = counting_chain();

        assert_matches!(
            analyze_project(&pool, &chain, uuid::Uuid::new_v4()).await,
            Err(AppError::Core(CoreError::NotFound { entity: "Project", .. }))
        );
    }

    #[tokio::test]
    async fn edits_made_during_analysis_survive() {
        let pool = DbPool::in_memory();
        let project_id = seed(&pool, 0, 1).await;
        let (chain, started, release) = gated_chain();

        let run = tokio::spawn({
            let pool = pool.clone();
            let chain = Arc::clone(&chain);
            async move { analyze_project(&pool, &chain, project_id).await }
        });
        started.notified().await;

        ProjectRepo::update(
            &pool,
            &UpdateProject {
                id: project_id,
                name: Some("after".into()),
                location: None,
                date: None,
                panel_count: Some(500),
                status: None,
                health_score: None,
            },
        )
        .await
        .unwrap();
        release.notify_one();

        let summary = run.await.unwrap().unwrap();
        // One info defect on the updated 500 panels: 100 - (1 / 500) * 100.
        assert_eq!(summary.health_score, 99.8);

        let project = ProjectRepo::find_by_id(&pool, project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(project.name, "after");
        assert_eq!(project.panel_count, 500);
        assert_eq!(project.status, ProjectStatus::Complete);
    }

    #[tokio::test]
    async fn delete_during_analysis_stays_deleted() {
        let pool = DbPool::in_memory();
        let project_id = seed(&pool, 0, 1).await;
        let (chain, started, release) = gated_chain();

        let run = tokio::spawn({
            let pool = pool.clone();
            let chain = Arc::clone(&chain);
            async move { analyze_project(&pool, &chain, project_id).await }
        });
        started.notified().await;

        assert!(ProjectRepo::delete(&pool, project_id).await.unwrap());
        release.notify_one();

        assert_matches!(
            run.await.unwrap(),
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        assert!(ProjectRepo::find_by_id(&pool, project_id)
            .await
            .unwrap()
            .is_none());
        assert!(UploadRepo::list_by_project(&pool, project_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn concurrent_runs_record_defects_once() {
        let pool = DbPool::in_memory();
        let project_id = seed(&pool, 0, 1).await;
        let (chain, started, release) = gated_chain();

        let spawn_run = || {
            let pool = pool.clone();
            let chain = Arc::clone(&chain);
            tokio::spawn(async move { analyze_project(&pool, &chain, project_id).await })
        };
        let first = spawn_run();
        started.notified().await;
        let second = spawn_run();
        started.notified().await;

        release.notify_one();
        release.notify_one();
        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        assert_eq!(first.defects, second.defects);
        let uploads = UploadRepo::list_by_project(&pool, project_id).await.unwrap();
        assert_eq!(uploads[0].defects, first.defects);
    }

    #[tokio::test]
    async fn failed_write_restores_previous_status() {
        let backend = Arc::new(FailingUploads::default());
        let pool = Store::new(backend.clone());
        let (chain, _) = counting_chain();
        let project_id = seed(&pool, 10, 1).await;
        backend.armed.store(true, Ordering::SeqCst);

        assert_matches!(
            analyze_project(&pool, &chain, project_id).await,
            Err(AppError::Store(StoreError::Io(_)))
        );

        let project = ProjectRepo::find_by_id(&pool, project_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Draft);
        assert!(project.health_score.is_none());
    }
}
