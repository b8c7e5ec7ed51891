#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use veille_api::config::ServerConfig;
use veille_api::router::build_app_router;
use veille_api::state::AppState;
use veille_events::EventBus;
use veille_pipeline::report::{RenderError, ReportCompiler, ReportDocument, ReportRenderer};
use veille_pipeline::runner::ScheduleRunner;
use veille_pipeline::scheduler::JobScheduler;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Writes a tiny fake PDF instead of laying out a real one.
pub struct FakePdf;

impl ReportRenderer for FakePdf {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        Ok(format!("%PDF-1.4 {}", document.name).into_bytes())
    }
}

/// Build the full application router over `pool`, with reports written to
/// the system temp directory and email disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_reports(pool, &std::env::temp_dir())
}

/// Same as [`build_test_app`] with an explicit reports directory.
pub fn build_test_app_with_reports(pool: PgPool, reports_dir: &Path) -> Router {
    let config = test_config();
    let bus = Arc::new(EventBus::default());
    let scheduler = Arc::new(JobScheduler::new(Arc::new(ScheduleRunner::new(
        pool.clone(),
        Arc::clone(&bus),
    ))));
    let reports = Arc::new(ReportCompiler::new(
        pool.clone(),
        Arc::new(FakePdf),
        None,
        reports_dir,
        Arc::clone(&bus),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: bus,
        scheduler,
        reports,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

/// POST without a body.
pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
