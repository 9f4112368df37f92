//! Fallback detection through a hosted multimodal chat-completion API.
//!
//! The model is asked to answer with a bare JSON array of defects. Replies
//! wrapped in markdown code fences are unwrapped before parsing; anything
//! that still does not parse as an array is treated as a failure so the
//! chain can move on.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use solar_core::defect::{Defect, DefectOrigin, DefectType, GridLocation, Severity};

use crate::{ensure_success, DefectDetector, DetectionMethod, DetectionRequest, DetectorError};

/// Upper bound on generated tokens per image.
const MAX_COMPLETION_TOKENS: u32 = 2000;

const DEFAULT_DESCRIPTION: &str = "Detected anomaly";
const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const ANALYSIS_PROMPT: &str = r#"You are an expert solar panel inspection analyst. Analyze this drone image of solar panels.

Identify any defects visible in the image. For thermal images, look for:
- Hotspots (abnormal temperature zones indicating cell damage)
- String failures (entire rows/columns at uniform abnormal temperature)
- Junction box overheating (localized hotspot at panel edge/connection point)
- Bypass diode failures (1/3 of panel at different temperature)

For RGB/visual images, look for:
- Physical cracks or fractures in cells
- Soiling (dirt, bird droppings, debris)
- Shading from vegetation, structures, or other panels
- Delamination (yellowing, bubbling of encapsulant)

Return a JSON array of defects found. Each defect should have:
{
  "type": "hotspot" | "crack" | "soiling" | "string_failure" | "junction_box" | "bypass_diode" | "shading" | "delamination",
  "severity": "critical" | "warning" | "info",
  "description": "specific description of the defect",
  "confidence": 0.0-1.0,
  "tempDelta": number (estimated temp difference in °C, for thermal only),
  "remediation": ["action 1", "action 2"]
}

If no defects are found, return an empty array [].
Be specific about locations within the image. Only report defects you're confident about.
Return ONLY valid JSON. No markdown, no explanation."#;

/// A defect as described by the model. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionDefect {
    #[serde(rename = "type")]
    pub defect_type: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub confidence: Option<f64>,
    pub temp_delta: Option<f64>,
    pub row: Option<u32>,
    pub col: Option<u32>,
    pub remediation: Option<Vec<String>>,
}

impl VisionDefect {
    /// Fill defaults and clamp into a defect record.
    ///
    /// A missing or blank type becomes a hotspot; a type the service does
    /// not know is kept as [`DefectType::Unknown`].
    pub fn into_defect(self, origin: &DefectOrigin) -> Defect {
        let defect_type = match self
            .defect_type
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            None => DefectType::Hotspot,
            Some(name) => DefectType::from_name(name).unwrap_or(DefectType::Unknown),
        };
        let severity = self
            .severity
            .as_deref()
            .and_then(Severity::from_name)
            .unwrap_or(Severity::Warning);
        let confidence = self
            .confidence
            .filter(|c| !c.is_nan())
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        let mut defect = origin.defect(
            defect_type,
            severity,
            self.description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            confidence,
        );
        defect.temp_delta = self.temp_delta;
        defect.location = match (self.row, self.col) {
            (Some(row), Some(col)) => Some(GridLocation { row, col }),
            _ => None,
        };
        defect.remediation = self.remediation.unwrap_or_default();
        defect
    }
}

/// Chat-completion client used as the secondary detector.
pub struct VisionDetector {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    fence: Regex,
}

impl VisionDetector {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DetectorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let fence =
            Regex::new(r"(?i)```(?:json)?\s*").map_err(|e| DetectorError::Config(e.to_string()))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            fence,
        })
    }

    fn request_body(&self, request: &DetectionRequest<'_>) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": ANALYSIS_PROMPT },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": format!(
                                "This is a {} drone image of a solar panel array. Analyze it for defects.",
                                request.kind.name()
                            ),
                        },
                        {
                            "type": "image_url",
                            "image_url": { "url": request.image, "detail": "high" },
                        },
                    ],
                },
            ],
            "max_completion_tokens": MAX_COMPLETION_TOKENS,
        })
    }

    /// Strip code fences and parse the model's reply as a defect array.
    pub fn parse_content(&self, content: &str) -> Result<Vec<VisionDefect>, DetectorError> {
        let cleaned = self.fence.replace_all(content, "");
        serde_json::from_str(cleaned.trim()).map_err(|e| DetectorError::Parse(e.to_string()))
    }
}

#[async_trait]
impl DefectDetector for VisionDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Vision
    }

    async fn detect(&self, request: &DetectionRequest<'_>) -> Result<Vec<Defect>, DetectorError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await?;
        let reply: serde_json::Value = ensure_success(response).await?.json().await?;

        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("[]");
        let parsed = self.parse_content(content)?;

        Ok(parsed
            .into_iter()
            .map(|d| d.into_defect(&request.origin))
            .collect())
    }
}
