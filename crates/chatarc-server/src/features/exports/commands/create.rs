//! Create export command
//!
//! The orchestration façade: validates configuration, consults the admission
//! controller, creates the job record in `pending`, and schedules asynchronous
//! execution. Returns the new job id immediately without waiting for the
//! export to finish.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::archive::{ExportParams, JobRunner};
use crate::db::DbError;
use crate::features::FeatureState;
use crate::models::ExportJob;

/// Command to create a new export job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExportCommand {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub media: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Errors that can occur when creating an export job
#[derive(Debug, thiserror::Error)]
pub enum CreateExportError {
    /// Window limit exceeded; no job is created
    #[error("rate limit exceeded")]
    AdmissionDenied,
    /// Required credentials or default target missing; no job is created
    #[error("{0}")]
    NotConfigured(String),
    /// A database error occurred
    #[error("Database error: {0}")]
    Store(#[from] DbError),
}

impl Request<Result<Uuid, CreateExportError>> for CreateExportCommand {}

/// Handles the create export command
///
/// Checks configuration before admission so an unconfigured server reports
/// its real problem instead of burning window capacity.
pub async fn handle(
    state: FeatureState,
    command: CreateExportCommand,
) -> Result<Uuid, CreateExportError> {
    if state.exporter_config.token.is_none() {
        return Err(CreateExportError::NotConfigured(
            "missing export token".to_string(),
        ));
    }
    let channel_id = state
        .exporter_config
        .default_channel_id
        .clone()
        .ok_or_else(|| CreateExportError::NotConfigured("missing default channel".to_string()))?;

    if !state.limiter.try_admit() {
        return Err(CreateExportError::AdmissionDenied);
    }

    let job = ExportJob::pending(channel_id, command.start_at, command.end_at);
    state.store.insert_job(&job).await?;
    state.metrics.inc_exports();

    let job_id = job.job_id;
    debug!(%job_id, "export job accepted");

    // Fire and forget: the caller learns only of acceptance, never completion.
    let runner = JobRunner::new(state.store.clone(), state.exporter.clone());
    let params = ExportParams {
        media: command.media,
        filter: command.filter,
    };
    tokio::spawn(async move {
        runner.execute(job, params).await;
    });

    Ok(job_id)
}
