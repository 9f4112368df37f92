//! Randomized stand-in detector for demos without a reachable model.
//!
//! Output shape is fixed (up to one hotspot, one soiling patch on RGB
//! images and one string failure) but whether each appears, and its
//! numbers, are random.

use async_trait::async_trait;
use rand::Rng;
use solar_core::classification::{DETECTION_GRID_COLS, DETECTION_GRID_ROWS};
use solar_core::defect::{Defect, DefectType, GridLocation, ImageKind, Severity};

use crate::{DefectDetector, DetectionMethod, DetectionRequest, DetectorError};

/// Gate draws above which each archetype is emitted.
const HOTSPOT_GATE: f64 = 0.3;
const HOTSPOT_CRITICAL_GATE: f64 = 0.7;
const SOILING_GATE: f64 = 0.5;
const STRING_FAILURE_GATE: f64 = 0.8;

#[derive(Debug, Default, Clone, Copy)]
pub struct MockDetector;

impl MockDetector {
    pub fn new() -> Self {
        Self
    }

    /// Generate defects using the thread-local RNG.
    pub fn generate(&self, request: &DetectionRequest<'_>) -> Vec<Defect> {
        Self::generate_with(&mut rand::rng(), request)
    }

    /// Generate defects from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, request: &DetectionRequest<'_>) -> Vec<Defect> {
        let origin = request.origin;
        let mut defects = Vec::new();

        let hotspot_draw: f64 = rng.random();
        if hotspot_draw > HOTSPOT_GATE {
            let delta = rng.random_range(15.0..40.0);
            let severity = if hotspot_draw > HOTSPOT_CRITICAL_GATE {
                Severity::Critical
            } else {
                Severity::Warning
            };
            let mut d = origin.defect(
                DefectType::Hotspot,
                severity,
                format!("Abnormal temperature zone detected, estimated {delta:.1}°C above ambient"),
                rng.random_range(0.75..0.95),
            );
            d.temp_delta = Some(delta);
            d.location = Some(random_cell(rng));
            d.remediation = strings(&[
                "Inspect affected cell for micro-cracks",
                "Check bypass diode functionality",
                "Monitor during next inspection cycle",
            ]);
            defects.push(d);
        }

        let soiling_draw: f64 = rng.random();
        if soiling_draw > SOILING_GATE && request.kind == ImageKind::Rgb {
            let mut d = origin.defect(
                DefectType::Soiling,
                Severity::Info,
                "Moderate soiling detected on panel surface, estimated 3-5% power loss",
                0.8,
            );
            d.location = Some(random_cell(rng));
            d.remediation = strings(&["Schedule panel cleaning", "Verify drainage is not blocked"]);
            defects.push(d);
        }

        let string_draw: f64 = rng.random();
        if string_draw > STRING_FAILURE_GATE {
            let mut d = origin.defect(
                DefectType::StringFailure,
                Severity::Critical,
                "Entire string showing uniform temperature anomaly, possible string inverter failure or wiring issue",
                0.85,
            );
            d.temp_delta = Some(rng.random_range(20.0..35.0));
            d.location = Some(GridLocation {
                row: rng.random_range(0..DETECTION_GRID_ROWS),
                col: 0,
            });
            d.remediation = strings(&[
                "Check string inverter status and error codes",
                "Inspect wiring connections at combiner box",
                "Measure string voltage and compare to adjacent strings",
                "Priority: Schedule immediate repair",
            ]);
            defects.push(d);
        }

        defects
    }
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R) -> GridLocation {
    GridLocation {
        row: rng.random_range(0..DETECTION_GRID_ROWS),
        col: rng.random_range(0..DETECTION_GRID_COLS),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[async_trait]
impl DefectDetector for MockDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Mock
    }

    async fn detect(&self, request: &DetectionRequest<'_>) -> Result<Vec<Defect>, DetectorError> {
        Ok(self.generate(request))
    }
}
