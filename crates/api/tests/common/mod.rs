#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use solar_core::defect::{Defect, DefectType, GridLocation, Severity};
use solar_db::DbPool;
use solar_detector::{
    DefectDetector, DetectionChain, DetectionMethod, DetectionRequest, DetectorConfig,
    DetectorError,
};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use solar_api::config::ServerConfig;
use solar_api::routes;
use solar_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:3000` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_body_bytes: 10 * 1024 * 1024,
        data_dir: "unused".to_string(),
        detector: DetectorConfig::default(),
    }
}

/// Deterministic detector: one located warning crack per image, counting
/// how often it is called.
pub struct StubDetector {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DefectDetector for StubDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Primary
    }

    async fn detect(&self, request: &DetectionRequest<'_>) -> Result<Vec<Defect>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut defect = request.origin.defect(
            DefectType::Crack,
            Severity::Warning,
            "Crack detected (90.0% confidence)",
            0.9,
        );
        defect.location = Some(GridLocation { row: 0, col: 0 });
        Ok(vec![defect])
    }
}

/// A chain holding only [`StubDetector`], plus its call counter.
pub fn stub_chain() -> (Arc<DetectionChain>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let chain = DetectionChain::new(vec![Box::new(StubDetector {
        calls: Arc::clone(&calls),
    })]);
    (Arc::new(chain), calls)
}

/// Build the full application router with all middleware layers, using the
/// given store and detector chain.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_app(pool: DbPool, detector: Arc<DetectionChain>) -> Router {
    let config = test_config();
    let body_limit = config.max_body_bytes;

    let state = AppState {
        pool,
        config: Arc::new(config),
        detector,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:3000".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// [`build_app`] with a fresh [`stub_chain`].
pub fn build_test_app(pool: DbPool) -> Router {
    build_app(pool, stub_chain().0)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn delete_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::DELETE, uri, body).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a project through the API and return its id.
pub async fn create_project(pool: &DbPool, body: serde_json::Value) -> String {
    let response = post_json(build_test_app(pool.clone()), "/api/projects", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Upload an image through the API and return its id.
pub async fn upload_image(pool: &DbPool, project_id: &str, kind: &str) -> String {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/upload",
        serde_json::json!({
            "projectId": project_id,
            "filename": format!("{kind}.jpg"),
            "type": kind,
            "dataUrl": "data:image/jpeg;base64,/9j/4AAQ",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}
