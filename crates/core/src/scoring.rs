//! Health score and power-loss arithmetic.
//!
//! Both calculations are pure and total: every input list produces a
//! value, and the same list always produces the same value.

use serde::Serialize;

use crate::defect::{Defect, DefectType, Severity};

// ---------------------------------------------------------------------------
// Penalties
// ---------------------------------------------------------------------------

/// Score penalty contributed by a critical defect.
pub const CRITICAL_PENALTY: f64 = 8.0;
/// Score penalty contributed by a warning defect.
pub const WARNING_PENALTY: f64 = 3.0;
/// Score penalty contributed by an info defect.
pub const INFO_PENALTY: f64 = 1.0;

/// Maximum (and empty-installation) health score.
pub const MAX_HEALTH_SCORE: f64 = 100.0;

/// Panels assumed per uploaded image when a project has no panel count.
pub const PANELS_PER_UPLOAD_ESTIMATE: u32 = 10;

// ---------------------------------------------------------------------------
// Health score
// ---------------------------------------------------------------------------

fn severity_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => CRITICAL_PENALTY,
        Severity::Warning => WARNING_PENALTY,
        Severity::Info => INFO_PENALTY,
    }
}

/// Aggregate 0–100 health score for an installation.
///
/// Formula: `max(0, 100 - (penalty / total_panels) * 100)`, rounded to
/// one decimal. An installation with no panels scores 100.
pub fn calculate_health_score(total_panels: u32, defects: &[Defect]) -> f64 {
    if total_panels == 0 {
        return MAX_HEALTH_SCORE;
    }

    let penalty: f64 = defects.iter().map(|d| severity_penalty(d.severity)).sum();
    let score = (MAX_HEALTH_SCORE - (penalty / total_panels as f64) * 100.0).max(0.0);
    round_one_decimal(score)
}

/// Panel count used for scoring: the project's own count when set,
/// otherwise [`PANELS_PER_UPLOAD_ESTIMATE`] per uploaded image.
pub fn effective_panel_count(panel_count: u32, upload_count: usize) -> u32 {
    if panel_count > 0 {
        panel_count
    } else {
        u32::try_from(upload_count)
            .unwrap_or(u32::MAX)
            .saturating_mul(PANELS_PER_UPLOAD_ESTIMATE)
    }
}

// ---------------------------------------------------------------------------
// Power loss
// ---------------------------------------------------------------------------

/// Power loss (percent) assumed for a hotspot with no temperature reading.
const DEFAULT_HOTSPOT_LOSS: f64 = 2.0;
/// Percent of power lost per °C of hotspot temperature delta.
const HOTSPOT_LOSS_PER_DEGREE: f64 = 0.1;

fn defect_power_loss(defect: &Defect) -> f64 {
    match defect.defect_type {
        DefectType::StringFailure => 15.0,
        DefectType::Hotspot => match defect.temp_delta {
            Some(delta) if delta != 0.0 => delta * HOTSPOT_LOSS_PER_DEGREE,
            _ => DEFAULT_HOTSPOT_LOSS,
        },
        DefectType::JunctionBox => 5.0,
        DefectType::Crack => 3.0,
        DefectType::BypassDiode => 8.0,
        DefectType::Soiling => 1.5,
        DefectType::Shading => 2.0,
        DefectType::Delamination => 4.0,
        DefectType::Unknown => 0.0,
    }
}

/// Heuristic additive power-loss estimate in percent, rounded to one
/// decimal. Not capped: enough defects can exceed 100.
pub fn estimate_power_loss(defects: &[Defect]) -> f64 {
    round_one_decimal(defects.iter().map(defect_power_loss).sum())
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Number of defects per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl SeverityCounts {
    pub fn tally(defects: &[Defect]) -> Self {
        let mut counts = Self::default();
        for d in defects {
            match d.severity {
                Severity::Critical => counts.critical_count += 1,
                Severity::Warning => counts.warning_count += 1,
                Severity::Info => counts.info_count += 1,
            }
        }
        counts
    }
}

/// Coarse rating of a health score, as shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    /// `good` at 80 and above, `fair` at 50 and above, `poor` below.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
