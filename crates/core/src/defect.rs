//! Defect records and the enumerations they are built from.
//!
//! A [`Defect`] is created once by the detection adapter and never mutated
//! afterwards. Field names serialize in camelCase to match the persisted
//! upload documents and the browser client.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Defect type
// ---------------------------------------------------------------------------

/// Kind of anomaly found on a panel.
///
/// Persisted documents may contain type strings this build does not know;
/// those deserialize to [`DefectType::Unknown`] instead of failing the
/// whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectType {
    Hotspot,
    Crack,
    Soiling,
    StringFailure,
    JunctionBox,
    BypassDiode,
    Shading,
    Delamination,
    #[serde(other)]
    Unknown,
}

impl DefectType {
    /// Every recognised type, in display order.
    pub const ALL: [DefectType; 8] = [
        Self::Hotspot,
        Self::Crack,
        Self::Soiling,
        Self::StringFailure,
        Self::JunctionBox,
        Self::BypassDiode,
        Self::Shading,
        Self::Delamination,
    ];

    /// Parse a wire name such as `"string_failure"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hotspot" => Some(Self::Hotspot),
            "crack" => Some(Self::Crack),
            "soiling" => Some(Self::Soiling),
            "string_failure" => Some(Self::StringFailure),
            "junction_box" => Some(Self::JunctionBox),
            "bypass_diode" => Some(Self::BypassDiode),
            "shading" => Some(Self::Shading),
            "delamination" => Some(Self::Delamination),
            _ => None,
        }
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Hotspot => "hotspot",
            Self::Crack => "crack",
            Self::Soiling => "soiling",
            Self::StringFailure => "string_failure",
            Self::JunctionBox => "junction_box",
            Self::BypassDiode => "bypass_diode",
            Self::Shading => "shading",
            Self::Delamination => "delamination",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hotspot => "Hotspot",
            Self::Crack => "Cell Crack",
            Self::Soiling => "Soiling",
            Self::StringFailure => "String Failure",
            Self::JunctionBox => "Junction Box",
            Self::BypassDiode => "Bypass Diode",
            Self::Shading => "Shading",
            Self::Delamination => "Delamination",
            Self::Unknown => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "critical" => Some(Self::Critical),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Ordering weight: higher is worse.
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 2,
            Self::Warning => 1,
            Self::Info => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Image kind
// ---------------------------------------------------------------------------

/// Capture mode of an uploaded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Thermal,
    #[default]
    Rgb,
}

impl ImageKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Thermal => "thermal",
            Self::Rgb => "rgb",
        }
    }
}

// ---------------------------------------------------------------------------
// Defect record
// ---------------------------------------------------------------------------

/// Cell on the panel grid where a defect was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLocation {
    pub row: u32,
    pub col: u32,
}

/// A single detected anomaly on a panel image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: DbId,
    pub project_id: DbId,
    pub upload_id: DbId,
    #[serde(rename = "type")]
    pub defect_type: DefectType,
    pub severity: Severity,
    pub description: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
    /// Estimated temperature above ambient, in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GridLocation>,
    #[serde(default)]
    pub remediation: Vec<String>,
}

/// The project and upload a batch of detections belongs to.
///
/// Detectors receive one of these per image and stamp it onto every
/// defect they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefectOrigin {
    pub project_id: DbId,
    pub upload_id: DbId,
}

impl DefectOrigin {
    pub fn new(project_id: DbId, upload_id: DbId) -> Self {
        Self {
            project_id,
            upload_id,
        }
    }

    /// Start a new defect with a fresh id and no optional fields set.
    pub fn defect(
        &self,
        defect_type: DefectType,
        severity: Severity,
        description: impl Into<String>,
        confidence: f64,
    ) -> Defect {
        Defect {
            id: uuid::Uuid::new_v4(),
            project_id: self.project_id,
            upload_id: self.upload_id,
            defect_type,
            severity,
            description: description.into(),
            confidence,
            temp_delta: None,
            location: None,
            remediation: Vec::new(),
        }
    }
}
