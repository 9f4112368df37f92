use std::time::Duration;

/// Detection settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Whether to call the primary detector service at all.
    pub use_primary: bool,
    /// Base URL of the primary detector service.
    pub primary_url: String,
    /// Timeout for a single primary detector call.
    pub primary_timeout: Duration,
    /// Bearer token for the vision API. The vision strategy is skipped when unset.
    pub vision_api_key: Option<String>,
    /// Chat-completions endpoint of the vision API.
    pub vision_api_url: String,
    /// Model name sent to the vision API.
    pub vision_model: String,
    /// Timeout for a single vision API call.
    pub vision_timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            use_primary: true,
            primary_url: "http://localhost:8765".into(),
            primary_timeout: Duration::from_secs(30),
            vision_api_key: None,
            vision_api_url: "https://api.openai.com/v1/chat/completions".into(),
            vision_model: "gpt-5-mini".into(),
            vision_timeout: Duration::from_secs(60),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                      |
    /// |-------------------------|----------------------------------------------|
    /// | `USE_DETECTOR`          | `true` (any value but `false` enables)       |
    /// | `DETECTOR_URL`          | `http://localhost:8765`                      |
    /// | `DETECTOR_TIMEOUT_SECS` | `30`                                         |
    /// | `OPENAI_API_KEY`        | unset                                        |
    /// | `VISION_API_URL`        | `https://api.openai.com/v1/chat/completions` |
    /// | `VISION_MODEL`          | `gpt-5-mini`                                 |
    /// | `VISION_TIMEOUT_SECS`   | `60`                                         |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let use_primary = std::env::var("USE_DETECTOR")
            .map(|v| v.trim() != "false")
            .unwrap_or(true);

        let primary_url = std::env::var("DETECTOR_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.primary_url);

        let primary_timeout: u64 = std::env::var("DETECTOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("DETECTOR_TIMEOUT_SECS must be a valid u64");

        let vision_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let vision_api_url = std::env::var("VISION_API_URL").unwrap_or(defaults.vision_api_url);
        let vision_model = std::env::var("VISION_MODEL").unwrap_or(defaults.vision_model);

        let vision_timeout: u64 = std::env::var("VISION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("VISION_TIMEOUT_SECS must be a valid u64");

        Self {
            use_primary,
            primary_url,
            primary_timeout: Duration::from_secs(primary_timeout),
            vision_api_key,
            vision_api_url,
            vision_model,
            vision_timeout: Duration::from_secs(vision_timeout),
        }
    }
}
