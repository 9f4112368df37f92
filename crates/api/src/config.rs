use solar_detector::DetectorConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Must cover an
    /// analyze run over every upload of a project.
    pub request_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 25 MiB). Uploads
    /// carry base64 images inline, well past axum's 2 MB default.
    pub max_body_bytes: usize,
    /// Directory holding the JSON documents (default: `data`).
    pub data_dir: String,
    /// Detection strategy settings.
    pub detector: DetectorConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                      |
    /// | `MAX_BODY_BYTES`       | `26214400`                 |
    /// | `DATA_DIR`             | `data`                     |
    ///
    /// Detector variables are documented on [`DetectorConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "26214400".into())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_body_bytes,
            data_dir,
            detector: DetectorConfig::from_env(),
        }
    }
}
