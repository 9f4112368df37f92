//! Ordered fallback over detection strategies.

use serde::Serialize;
use solar_core::defect::Defect;

use crate::config::DetectorConfig;
use crate::mock::MockDetector;
use crate::primary::PrimaryDetector;
use crate::vision::VisionDetector;
use crate::{DefectDetector, DetectionMethod, DetectionRequest};

/// Defects for one image plus the strategy that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub defects: Vec<Defect>,
    pub method: DetectionMethod,
}

/// Tries each strategy in order and returns the first success, falling
/// back to [`MockDetector`] when all of them fail.
pub struct DetectionChain {
    strategies: Vec<Box<dyn DefectDetector>>,
    fallback: MockDetector,
}

impl DetectionChain {
    pub fn new(strategies: Vec<Box<dyn DefectDetector>>) -> Self {
        Self {
            strategies,
            fallback: MockDetector::new(),
        }
    }

    /// Build the production chain: primary detector (unless disabled),
    /// then the vision API (when a key is configured).
    ///
    /// A strategy whose client cannot be constructed is left out and
    /// logged rather than aborting startup.
    pub fn from_config(config: &DetectorConfig) -> Self {
        let mut strategies: Vec<Box<dyn DefectDetector>> = Vec::new();

        if config.use_primary {
            match PrimaryDetector::new(config.primary_url.clone(), config.primary_timeout) {
                Ok(primary) => strategies.push(Box::new(primary)),
                Err(e) => tracing::error!(error = %e, "Primary detector disabled"),
            }
        }

        if let Some(key) = &config.vision_api_key {
            match VisionDetector::new(
                config.vision_api_url.clone(),
                key.clone(),
                config.vision_model.clone(),
                config.vision_timeout,
            ) {
                Ok(vision) => strategies.push(Box::new(vision)),
                Err(e) => tracing::error!(error = %e, "Vision detector disabled"),
            }
        }

        Self::new(strategies)
    }

    /// Methods tried before the mock fallback, in order.
    pub fn methods(&self) -> Vec<DetectionMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    pub async fn detect(&self, request: &DetectionRequest<'_>) -> Detection {
        for strategy in &self.strategies {
            match strategy.detect(request).await {
                Ok(defects) => {
                    return Detection {
                        defects,
                        method: strategy.method(),
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        method = %strategy.method(),
                        upload_id = %request.origin.upload_id,
                        error = %e,
                        "Detector failed, falling through",
                    );
                }
            }
        }

        Detection {
            defects: self.fallback.generate(request),
            method: DetectionMethod::Mock,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use solar_core::defect::{DefectOrigin, DefectType, ImageKind, Severity};

    use super::*;
    use crate::DetectorError;

    struct Scripted {
        method: DetectionMethod,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DefectDetector for Scripted {
        fn method(&self) -> DetectionMethod {
            self.method
        }

        async fn detect(
            &self,
            request: &DetectionRequest<'_>,
        ) -> Result<Vec<Defect>, DetectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DetectorError::Parse("scripted failure".into()));
            }
            Ok(vec![request.origin.defect(
                DefectType::Crack,
                Severity::Warning,
                "scripted",
                0.6,
            )])
        }
    }

    fn scripted(method: DetectionMethod, fail: bool) -> (Box<dyn DefectDetector>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Scripted {
                method,
                fail,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    fn request() -> DetectionRequest<'static> {
        DetectionRequest {
            image: "data:,",
            kind: ImageKind::Rgb,
            origin: DefectOrigin::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let (primary, primary_calls) = scripted(DetectionMethod::Primary, false);
        let (vision, vision_calls) = scripted(DetectionMethod::Vision, false);
        let chain = DetectionChain::new(vec![primary, vision]);

        let detection = chain.detect(&request()).await;

        assert_eq!(detection.method, DetectionMethod::Primary);
        assert_eq!(detection.defects.len(), 1);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(vision_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_falls_through_to_next_strategy() {
        let (primary, primary_calls) = scripted(DetectionMethod::Primary, true);
        let (vision, vision_calls) = scripted(DetectionMethod::Vision, false);
        let chain = DetectionChain::new(vec![primary, vision]);

        let detection = chain.detect(&request()).await;

        assert_eq!(detection.method, DetectionMethod::Vision);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(vision_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_failing_ends_in_mock() {
        let (primary, _) = scripted(DetectionMethod::Primary, true);
        let (vision, _) = scripted(DetectionMethod::Vision, true);
        let chain = DetectionChain::new(vec![primary, vision]);

        let detection = chain.detect(&request()).await;
        assert_eq!(detection.method, DetectionMethod::Mock);
    }

    #[tokio::test]
    async fn empty_chain_uses_mock() {
        let chain = DetectionChain::new(Vec::new());
        assert_eq!(chain.detect(&request()).await.method, DetectionMethod::Mock);
    }

    #[test]
    fn config_controls_strategy_order() {
        let mut config = DetectorConfig::default();
        assert_eq!(
            DetectionChain::from_config(&config).methods(),
            vec![DetectionMethod::Primary]
        );

        config.vision_api_key = Some("sk-test".into());
        assert_eq!(
            DetectionChain::from_config(&config).methods(),
            vec![DetectionMethod::Primary, DetectionMethod::Vision]
        );

        config.use_primary = false;
        assert_eq!(
            DetectionChain::from_config(&config).methods(),
            vec![DetectionMethod::Vision]
        );
    }
}
