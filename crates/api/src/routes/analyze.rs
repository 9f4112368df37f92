use axum::routing::post;
use axum::Router;

use crate::handlers::analyze;
use crate::state::AppState;

/// Routes mounted at `/analyze`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze::run))
}
