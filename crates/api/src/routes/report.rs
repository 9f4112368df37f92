//! Route definitions for the `/report` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/report`.
///
/// ```text
/// GET /?projectId=      -> get
/// GET /map?projectId=   -> map
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report::get))
        .route("/map", get(report::map))
}
