//! Mapping from raw detector classes to defect records.
//!
//! The primary detector is an object-detection model trained on eight
//! classes. Each detection carries a class index, a confidence and a
//! normalized bounding box; this module turns that triple into a
//! [`Defect`] with type, severity, remediation, temperature estimate and
//! grid location.

use crate::defect::{Defect, DefectOrigin, DefectType, GridLocation, Severity};

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Rows of the fixed grid detections are projected onto.
///
/// The grid is independent of the project's real panel count or layout.
pub const DETECTION_GRID_ROWS: u32 = 6;
/// Columns of the fixed detection grid.
pub const DETECTION_GRID_COLS: u32 = 10;

// ---------------------------------------------------------------------------
// Class table
// ---------------------------------------------------------------------------

pub const CLASS_HOTSPOT: u32 = 0;
pub const CLASS_HOTSPOT_MULTI: u32 = 1;
pub const CLASS_BYPASS_DIODE: u32 = 2;
pub const CLASS_STRING_FAILURE: u32 = 3;
pub const CLASS_CRACKING: u32 = 4;
pub const CLASS_SOILING: u32 = 5;
pub const CLASS_SHADOWING: u32 = 6;
pub const CLASS_DELAMINATION: u32 = 7;

/// Confidence above which a hotspot is reported as critical.
pub const HOTSPOT_CRITICAL_CONFIDENCE: f64 = 0.7;

/// Base of the synthesized hotspot temperature delta (°C).
const HOTSPOT_BASE_DELTA: f64 = 15.0;
/// Additional °C per unit of confidence.
const HOTSPOT_DELTA_PER_CONFIDENCE: f64 = 25.0;

const FALLBACK_REMEDIATION: &[&str] = &["Schedule follow-up inspection"];

/// Model-facing class name, used in defect descriptions.
pub fn class_name(class_id: u32) -> &'static str {
    match class_id {
        CLASS_HOTSPOT => "Hotspot",
        CLASS_HOTSPOT_MULTI => "Hotspot-Multi",
        CLASS_BYPASS_DIODE => "Bypass-Diode",
        CLASS_STRING_FAILURE => "String-Failure",
        CLASS_CRACKING => "Cracking",
        CLASS_SOILING => "Soiling",
        CLASS_SHADOWING => "Shadowing",
        CLASS_DELAMINATION => "Delamination",
        _ => "Unknown defect",
    }
}

/// Defect type for a class. Both hotspot classes collapse to
/// [`DefectType::Hotspot`]; unknown indices are treated as hotspots too.
pub fn defect_type_for_class(class_id: u32) -> DefectType {
    match class_id {
        CLASS_BYPASS_DIODE => DefectType::BypassDiode,
        CLASS_STRING_FAILURE => DefectType::StringFailure,
        CLASS_CRACKING => DefectType::Crack,
        CLASS_SOILING => DefectType::Soiling,
        CLASS_SHADOWING => DefectType::Shading,
        CLASS_DELAMINATION => DefectType::Delamination,
        _ => DefectType::Hotspot,
    }
}

fn is_hotspot_class(class_id: u32) -> bool {
    matches!(class_id, CLASS_HOTSPOT | CLASS_HOTSPOT_MULTI)
}

/// Severity for a class at the given confidence.
///
/// String failures are always critical. Hotspots are critical above
/// [`HOTSPOT_CRITICAL_CONFIDENCE`], otherwise warning.
pub fn severity_for_class(class_id: u32, confidence: f64) -> Severity {
    match class_id {
        CLASS_STRING_FAILURE => Severity::Critical,
        CLASS_HOTSPOT | CLASS_HOTSPOT_MULTI => {
            if confidence > HOTSPOT_CRITICAL_CONFIDENCE {
                Severity::Critical
            } else {
                Severity::Warning
            }
        }
        CLASS_BYPASS_DIODE | CLASS_CRACKING | CLASS_DELAMINATION => Severity::Warning,
        _ => Severity::Info,
    }
}

/// Ordered remediation steps for a class.
pub fn remediation_for_class(class_id: u32) -> &'static [&'static str] {
    match class_id {
        CLASS_HOTSPOT => &[
            "Inspect affected cell for micro-cracks",
            "Check bypass diode functionality",
            "Monitor during next inspection cycle",
        ],
        CLASS_HOTSPOT_MULTI => &[
            "Multiple cells affected: schedule immediate inspection",
            "Check for systemic wiring issues",
            "Measure IV curve of affected string",
        ],
        CLASS_BYPASS_DIODE => &[
            "Test bypass diode with IV curve tracer",
            "Replace bypass diode if failed",
            "Check junction box connections",
        ],
        CLASS_STRING_FAILURE => &[
            "Check string inverter status and error codes",
            "Inspect wiring at combiner box",
            "Measure string voltage vs adjacent strings",
            "Priority: Schedule immediate repair",
        ],
        CLASS_CRACKING => &[
            "Document crack location and extent",
            "Monitor for power degradation",
            "Plan panel replacement at next maintenance window",
        ],
        CLASS_SOILING => &[
            "Schedule panel cleaning",
            "Check if drainage is blocked",
            "Install bird deterrents if bird droppings",
        ],
        CLASS_SHADOWING => &[
            "Identify and remove obstruction if possible",
            "Consider panel repositioning",
            "Install vegetation management plan",
        ],
        CLASS_DELAMINATION => &[
            "Document extent of delamination",
            "Check warranty coverage",
            "Plan panel replacement, delamination is progressive",
        ],
        _ => FALLBACK_REMEDIATION,
    }
}

/// Synthesized temperature delta for hotspot classes; `None` otherwise.
pub fn temp_delta_for_class(class_id: u32, confidence: f64) -> Option<f64> {
    is_hotspot_class(class_id)
        .then(|| HOTSPOT_BASE_DELTA + confidence * HOTSPOT_DELTA_PER_CONFIDENCE)
}

/// Project a normalized `[x1, y1, x2, y2]` box onto the detection grid
/// using its centre point.
///
/// Coordinates outside `[0, 1]` are clamped to the nearest edge cell.
pub fn grid_location(bbox: [f64; 4]) -> GridLocation {
    let [x1, y1, x2, y2] = bbox;
    let cx = (x1 + x2) / 2.0;
    let cy = (y1 + y2) / 2.0;
    GridLocation {
        row: project_axis(cy, DETECTION_GRID_ROWS),
        col: project_axis(cx, DETECTION_GRID_COLS),
    }
}

fn project_axis(centre: f64, cells: u32) -> u32 {
    // `as` saturates negatives and NaN to 0.
    ((centre * cells as f64).floor() as u32).min(cells - 1)
}

/// Build a complete defect record from one raw detection.
pub fn defect_from_detection(
    origin: &DefectOrigin,
    class_id: u32,
    confidence: f64,
    bbox: [f64; 4],
) -> Defect {
    let description = format!(
        "{} detected ({:.1}% confidence)",
        class_name(class_id),
        confidence * 100.0
    );

    let mut defect = origin.defect(
        defect_type_for_class(class_id),
        severity_for_class(class_id, confidence),
        description,
        confidence,
    );
    defect.temp_delta = temp_delta_for_class(class_id, confidence);
    defect.location = Some(grid_location(bbox));
    defect.remediation = remediation_for_class(class_id)
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    defect
}
