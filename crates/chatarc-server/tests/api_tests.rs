//! Integration tests for the exports HTTP API
//!
//! These run the real router against the in-memory store and a stub export
//! tool, so the full request path is exercised without a database or the
//! external CLI.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chatarc_server::db::ExportStore;
use serde_json::{json, Value};
use tower::ServiceExt;

use chatarc_server::archive::{ExportError, ExportRateLimiter, ExportRequest, MessageExporter};
use chatarc_server::config::ExporterConfig;
use chatarc_server::db::MemoryExportStore;
use chatarc_server::features::{self, FeatureState};
use chatarc_server::metrics::Metrics;
use chatarc_server::models::{ExportJob, JobStatus};

struct StubExporter {
    payload: Vec<Value>,
}

#[async_trait]
impl MessageExporter for StubExporter {
    async fn export(&self, _req: &ExportRequest) -> Result<Vec<Value>, ExportError> {
        Ok(self.payload.clone())
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryExportStore>,
}

fn test_app_with(limit: u32, token: Option<&str>) -> TestApp {
    let store = Arc::new(MemoryExportStore::new());
    let state = FeatureState {
        store: store.clone(),
        exporter: Arc::new(StubExporter { payload: vec![] }),
        limiter: Arc::new(ExportRateLimiter::new(limit, Duration::from_secs(60))),
        metrics: Arc::new(Metrics::new()),
        exporter_config: Arc::new(ExporterConfig {
            token: token.map(String::from),
            default_channel_id: Some("123456".to_string()),
            ..ExporterConfig::default()
        }),
    };
    TestApp {
        router: features::router(state),
        store,
    }
}

fn test_app() -> TestApp {
    test_app_with(10, Some("test-token"))
}

fn create_request(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/exports")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> Value {
    json!({
        "start_at": "2024-01-01T00:00:00Z",
        "end_at": "2024-01-02T00:00:00Z"
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_export_is_accepted() {
    let app = test_app();

    let response = app.router.oneshot(create_request(valid_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = body_json(response).await;
    let job_id = json["job_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(job_id).is_ok());
}

#[tokio::test]
async fn test_create_export_rejects_naive_timestamp() {
    let app = test_app();
    let body = json!({
        "start_at": "2024-01-01T00:00:00",
        "end_at": "2024-01-02T00:00:00Z"
    });

    let response = app.router.oneshot(create_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_create_export_rejects_inverted_range() {
    let app = test_app();
    let body = json!({
        "start_at": "2024-01-02T00:00:00Z",
        "end_at": "2024-01-01T00:00:00Z"
    });

    let response = app.router.oneshot(create_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_export_rejects_non_json_format() {
    let app = test_app();
    let mut body = valid_body();
    body["format"] = json!("Csv");

    let response = app.router.oneshot(create_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Only Json format is supported");
}

#[tokio::test]
async fn test_create_export_without_token_is_config_error() {
    let app = test_app_with(10, None);

    let response = app.router.oneshot(create_request(valid_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn test_create_export_rate_limited_at_window_capacity() {
    let app = test_app_with(2, Some("test-token"));

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(create_request(valid_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let response = app.router.oneshot(create_request(valid_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "rate_limited");

    // The denied request never created a job record.
    assert_eq!(app.store.list_recent_jobs(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_export_returns_job() {
    let app = test_app();

    let job = ExportJob::pending(
        "123456".to_string(),
        "2024-01-01T00:00:00Z".parse().unwrap(),
        "2024-01-02T00:00:00Z".parse().unwrap(),
    );
    app.store.insert_job(&job).await.unwrap();

    let request = Request::builder()
        .uri(format!("/exports/{}", job.job_id))
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["job_id"], job.job_id.to_string());
    assert_eq!(json["status"], "pending");
    assert_eq!(json["channel_id"], "123456");
}

#[tokio::test]
async fn test_get_unknown_export_is_404() {
    let app = test_app();

    let request = Request::builder()
        .uri(format!("/exports/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_get_malformed_id_is_404() {
    let app = test_app();

    let request = Request::builder()
        .uri("/exports/not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_lists_jobs_newest_first() {
    let app = test_app();

    for channel in ["a", "b", "c"] {
        let job = ExportJob::pending(
            channel.to_string(),
            "2024-01-01T00:00:00Z".parse().unwrap(),
            "2024-01-02T00:00:00Z".parse().unwrap(),
        );
        app.store.insert_job(&job).await.unwrap();
    }

    let request = Request::builder()
        .uri("/status")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["channel_id"], "c");
    assert_eq!(items[2]["channel_id"], "a");
}

#[tokio::test]
async fn test_accepted_job_eventually_completes() {
    let app = test_app();

    let response = app.router.oneshot(create_request(valid_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    let job_id: uuid::Uuid = json["job_id"].as_str().unwrap().parse().unwrap();

    // The stub exporter returns immediately; give the spawned runner a beat.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let job = app.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.message_count, Some(0));
}
