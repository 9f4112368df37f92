//! Client for the primary object-detection service.
//!
//! The service exposes `POST /detect` taking `{"image": <payload>}` and
//! answering with normalized bounding boxes:
//!
//! ```text
//! {"detections": [{"class_id": 0, "confidence": 0.91, "bbox": [x1, y1, x2, y2]}]}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use solar_core::classification::defect_from_detection;
use solar_core::defect::{Defect, DefectOrigin};

use crate::{ensure_success, DefectDetector, DetectionMethod, DetectionRequest, DetectorError};

/// One box reported by the detector.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f64,
    /// Normalized `[x1, y1, x2, y2]`.
    pub bbox: [f64; 4],
}

#[derive(Debug, Deserialize)]
pub struct DetectResponse {
    pub detections: Vec<RawDetection>,
}

/// HTTP client for the primary detector.
pub struct PrimaryDetector {
    client: reqwest::Client,
    base_url: String,
}

impl PrimaryDetector {
    /// Create a client for the service at `base_url` (e.g.
    /// `http://localhost:8765`) with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DetectorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a detector reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Convert raw detections into defect records for one upload.
pub fn defects_from_detections(origin: &DefectOrigin, detections: &[RawDetection]) -> Vec<Defect> {
    detections
        .iter()
        .map(|det| {
            defect_from_detection(
                origin,
                det.class_id,
                det.confidence.clamp(0.0, 1.0),
                det.bbox,
            )
        })
        .collect()
}

#[async_trait]
impl DefectDetector for PrimaryDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Primary
    }

    async fn detect(&self, request: &DetectionRequest<'_>) -> Result<Vec<Defect>, DetectorError> {
        let body = serde_json::json!({ "image": request.image });

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .json(&body)
            .send()
            .await?;
        let text = ensure_success(response).await?.text().await?;

        let parsed: DetectResponse =
            serde_json::from_str(&text).map_err(|e| DetectorError::Parse(e.to_string()))?;

        tracing::debug!(
            upload_id = %request.origin.upload_id,
            detections = parsed.detections.len(),
            "Primary detector responded",
        );

        // An empty list is a valid answer: the panel is clean.
        Ok(defects_from_detections(&request.origin, &parsed.detections))
    }
}
