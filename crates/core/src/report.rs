//! Derived, non-persisted views over a project's defects.

use serde::Serialize;

use crate::defect::Defect;
use crate::scoring::{
    calculate_health_score, effective_panel_count, estimate_power_loss, HealthBand,
    SeverityCounts,
};
use crate::types::{DbId, Timestamp};

/// Inspection report recomputed from stored defects at request time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    pub project_id: DbId,
    pub generated_at: Timestamp,
    pub health_score: f64,
    pub health_band: HealthBand,
    /// The project's recorded panel count (0 when unknown), not the
    /// estimate used for scoring.
    pub total_panels: u32,
    pub defects_found: usize,
    #[serde(flatten)]
    pub counts: SeverityCounts,
    pub estimated_power_loss: f64,
    pub defects: Vec<Defect>,
}

impl InspectionReport {
    pub fn build(
        project_id: DbId,
        panel_count: u32,
        upload_count: usize,
        defects: Vec<Defect>,
        generated_at: Timestamp,
    ) -> Self {
        let health_score =
            calculate_health_score(effective_panel_count(panel_count, upload_count), &defects);
        Self {
            project_id,
            generated_at,
            health_score,
            health_band: HealthBand::from_score(health_score),
            total_panels: panel_count,
            defects_found: defects.len(),
            counts: SeverityCounts::tally(&defects),
            estimated_power_loss: estimate_power_loss(&defects),
            defects,
        }
    }
}

/// Result of an analysis run over all of a project's uploads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub project_id: DbId,
    pub health_score: f64,
    pub health_band: HealthBand,
    pub total_defects: usize,
    #[serde(flatten)]
    pub counts: SeverityCounts,
    pub estimated_power_loss: f64,
    pub defects: Vec<Defect>,
}

impl AnalysisSummary {
    /// Summarize `defects` given an already computed health score.
    pub fn new(project_id: DbId, health_score: f64, defects: Vec<Defect>) -> Self {
        Self {
            project_id,
            health_score,
            health_band: HealthBand::from_score(health_score),
            total_defects: defects.len(),
            counts: SeverityCounts::tally(&defects),
            estimated_power_loss: estimate_power_loss(&defects),
            defects,
        }
    }
}
