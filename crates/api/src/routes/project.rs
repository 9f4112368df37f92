//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// PATCH  /        -> update   (id in body)
/// DELETE /        -> delete   (id in body)
/// GET    /{id}    -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list)
                .post(project::create)
                .patch(project::update)
                .delete(project::delete),
        )
        .route("/{id}", get(project::get_by_id))
}
