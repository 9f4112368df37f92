use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the document store is reachable.
    pub store_healthy: bool,
}

/// GET /health -- returns service and store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = solar_db::health_check(&state.pool).await.is_ok();

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
