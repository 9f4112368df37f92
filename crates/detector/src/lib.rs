//! Defect detection adapters.
//!
//! Three strategies turn an image into [`Defect`] records:
//!
//! - [`primary::PrimaryDetector`]: the object-detection model service.
//! - [`vision::VisionDetector`]: a hosted multimodal chat-completion API.
//! - [`mock::MockDetector`]: randomized demo output, never fails.
//!
//! [`chain::DetectionChain`] tries them in that order and returns the
//! first success.

pub mod chain;
pub mod config;
pub mod mock;
pub mod primary;
pub mod vision;

use async_trait::async_trait;
use serde::Serialize;
use solar_core::defect::{Defect, DefectOrigin, ImageKind};

pub use chain::{Detection, DetectionChain};
pub use config::DetectorConfig;

/// One image to run detection over.
#[derive(Debug, Clone, Copy)]
pub struct DetectionRequest<'a> {
    /// Encoded image payload, passed to remote services unchanged.
    pub image: &'a str,
    pub kind: ImageKind,
    pub origin: DefectOrigin,
}

/// Which strategy produced a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Primary,
    Vision,
    Mock,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Vision => "vision",
            Self::Mock => "mock",
        })
    }
}

/// Errors from a single detection strategy.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Detector API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered but its output could not be understood.
    #[error("Unparseable detector output: {0}")]
    Parse(String),

    /// The strategy could not be constructed.
    #[error("Detector misconfigured: {0}")]
    Config(String),
}

/// A single detection strategy.
#[async_trait]
pub trait DefectDetector: Send + Sync {
    fn method(&self) -> DetectionMethod;

    async fn detect(&self, request: &DetectionRequest<'_>) -> Result<Vec<Defect>, DetectorError>;
}

/// Fail with [`DetectorError::ApiError`] unless the response is 2xx.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, DetectorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(DetectorError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
