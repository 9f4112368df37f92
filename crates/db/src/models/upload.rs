//! Upload entity model and DTOs.

use serde::{Deserialize, Serialize};
use solar_core::defect::{Defect, ImageKind};
use solar_core::types::{DbId, Timestamp};
use validator::Validate;

/// Filename recorded when the client does not send one.
pub const DEFAULT_FILENAME: &str = "image.jpg";

/// An uploaded image and, once analyzed, the defects found in it.
///
/// Immutable once `processed_at` is set, apart from deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: DbId,
    pub project_id: DbId,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// Encoded image payload (typically a base64 data URL).
    pub data_url: String,
    pub processed_at: Option<Timestamp>,
    #[serde(default)]
    pub defects: Vec<Defect>,
}

impl Upload {
    pub fn from_create(input: &CreateUpload) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            project_id: input.project_id,
            filename: input
                .filename
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            kind: input.kind.unwrap_or_default(),
            data_url: input.data_url.clone(),
            processed_at: None,
            defects: Vec::new(),
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    /// Attach the analysis result. Has no effect on an already processed
    /// upload; returns whether the defects were recorded.
    pub fn record_analysis(&mut self, defects: Vec<Defect>, at: Timestamp) -> bool {
        if self.is_processed() {
            return false;
        }
        self.defects = defects;
        self.processed_at = Some(at);
        true
    }
}

/// DTO for adding an image to a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpload {
    pub project_id: DbId,
    #[validate(length(max = 255, message = "filename must be at most 255 characters"))]
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ImageKind>,
    #[validate(length(min = 1, message = "dataUrl is required"))]
    pub data_url: String,
}

/// Response body for a created upload; omits the image payload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub id: DbId,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
}

impl From<&Upload> for UploadReceipt {
    fn from(upload: &Upload) -> Self {
        Self {
            id: upload.id,
            filename: upload.filename.clone(),
            kind: upload.kind,
        }
    }
}
