//! Export routes
//!
//! HTTP surface for the export engine: submit a job, poll a job, list recent
//! jobs. Submission is asynchronous; a `202 Accepted` means the job was
//! recorded and scheduled, not that it finished.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::commands::{handle_create_export, CreateExportCommand, CreateExportError};
use super::queries::{
    handle_get_export, handle_list_exports, GetExportError, GetExportQuery, ListExportsQuery,
};
use super::types::CreateExportRequest;
use crate::error::AppError;
use crate::features::FeatureState;

/// Create export routes
pub fn exports_routes() -> Router<FeatureState> {
    Router::new()
        .route("/exports", post(create_export))
        .route("/exports/:job_id", get(get_export))
        .route("/status", get(list_exports))
}

/// Submit a new export job
///
/// POST /exports
async fn create_export(
    State(state): State<FeatureState>,
    Json(request): Json<CreateExportRequest>,
) -> Result<Response, AppError> {
    state.metrics.inc_http_requests();

    let window = request.validate().map_err(|e| {
        state.metrics.inc_http_errors();
        AppError::BadRequest(e.to_string())
    })?;

    let command = CreateExportCommand {
        start_at: window.start_at,
        end_at: window.end_at,
        media: request.media.unwrap_or(false),
        filter: request.filter,
    };

    match handle_create_export(state.clone(), command).await {
        Ok(job_id) => Ok((StatusCode::ACCEPTED, Json(json!({ "job_id": job_id }))).into_response()),
        Err(CreateExportError::AdmissionDenied) => {
            state.metrics.inc_http_errors();
            Err(AppError::RateLimited)
        },
        Err(CreateExportError::NotConfigured(msg)) => {
            state.metrics.inc_http_errors();
            Err(AppError::Config(msg))
        },
        Err(CreateExportError::Store(e)) => {
            state.metrics.inc_http_errors();
            Err(AppError::Store(e))
        },
    }
}

/// Get a specific export job by ID
///
/// GET /exports/:job_id
async fn get_export(
    State(state): State<FeatureState>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    state.metrics.inc_http_requests();

    let query = GetExportQuery { job_id };
    match handle_get_export(state.store.as_ref(), query).await {
        Ok(job) => Ok((StatusCode::OK, Json(json!(job))).into_response()),
        Err(GetExportError::NotFound) => {
            state.metrics.inc_http_errors();
            Err(AppError::NotFound("export job not found".to_string()))
        },
        Err(GetExportError::Store(e)) => {
            state.metrics.inc_http_errors();
            Err(AppError::Store(e))
        },
    }
}

/// List recent export jobs, newest first
///
/// GET /status?limit=20
async fn list_exports(
    State(state): State<FeatureState>,
    Query(query): Query<ListExportsQuery>,
) -> Result<Response, AppError> {
    state.metrics.inc_http_requests();

    match handle_list_exports(state.store.as_ref(), query).await {
        Ok(response) => Ok((StatusCode::OK, Json(json!(response))).into_response()),
        Err(e) => {
            state.metrics.inc_http_errors();
            Err(AppError::Store(e))
        },
    }
}
