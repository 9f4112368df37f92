pub mod analyze;
pub mod health;
pub mod project;
pub mod report;
pub mod upload;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                  list, create, update (PATCH), delete
/// /projects/{id}             get
///
/// /upload                    list (?projectId=), create, delete
///
/// /analyze                   run analysis (POST)
///
/// /report                    inspection report (?projectId=)
/// /report/map                panel heat map (?projectId=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/upload", upload::router())
        .nest("/analyze", analyze::router())
        .nest("/report", report::router())
}
