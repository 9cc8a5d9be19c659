//! Get export query
//!
//! Query to get a single export job by ID.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{DbError, ExportStore};
use crate::models::ExportJob;

/// Query to get an export job by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetExportQuery {
    pub job_id: String,
}

/// Error type for get export query
#[derive(Debug, thiserror::Error)]
pub enum GetExportError {
    #[error("Export job not found")]
    NotFound,
    #[error("Database error: {0}")]
    Store(#[from] DbError),
}

impl Request<Result<ExportJob, GetExportError>> for GetExportQuery {}

pub async fn handle(
    store: &dyn ExportStore,
    query: GetExportQuery,
) -> Result<ExportJob, GetExportError> {
    // A malformed id cannot name a job; treat it as absent rather than a
    // client error, matching the job query endpoint's 404 contract.
    let job_id = Uuid::parse_str(&query.job_id).map_err(|_| GetExportError::NotFound)?;

    store
        .get_job(job_id)
        .await?
        .ok_or(GetExportError::NotFound)
}
