use std::sync::Arc;

use solar_detector::DetectionChain;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Document store.
    pub pool: solar_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Detector fallback chain used by the analyze endpoint.
    pub detector: Arc<DetectionChain>,
}
