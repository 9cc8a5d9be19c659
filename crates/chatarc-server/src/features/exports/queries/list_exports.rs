//! List exports query
//!
//! Query for the most recent export jobs, newest first.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::db::{DbError, ExportStore};
use crate::models::ExportJob;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Query parameters for listing export jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListExportsQuery {
    pub limit: Option<i64>,
}

/// Response for the list query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListExportsResponse {
    pub items: Vec<ExportJob>,
}

impl Request<Result<ListExportsResponse, DbError>> for ListExportsQuery {}

pub async fn handle(
    store: &dyn ExportStore,
    query: ListExportsQuery,
) -> Result<ListExportsResponse, DbError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let items = store.list_recent_jobs(limit).await?;
    Ok(ListExportsResponse { items })
}
