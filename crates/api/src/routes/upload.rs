//! Route definitions for the `/upload` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Routes mounted at `/upload`.
///
/// ```text
/// GET    /?projectId=   -> list
/// POST   /              -> create
/// DELETE /              -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(upload::list).post(upload::create).delete(upload::delete),
    )
}
