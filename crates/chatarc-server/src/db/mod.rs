//! Persistence layer for export jobs and archived messages.
//!
//! The engine talks to storage through the [`ExportStore`] trait so the job
//! lifecycle can be exercised against [`memory::MemoryExportStore`] in tests
//! while production uses [`pg::PgExportStore`] over sqlx/PostgreSQL.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ExportJob, JobPatch, MessageRecord};

pub mod memory;
pub mod pg;

pub use memory::MemoryExportStore;
pub use pg::PgExportStore;

/// Storage errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Table-style operations over the export job and message stores.
#[async_trait]
pub trait ExportStore: Send + Sync {
    /// Insert a freshly created job record.
    async fn insert_job(&self, job: &ExportJob) -> Result<(), DbError>;

    /// Apply a partial update to an existing job record.
    async fn update_job(&self, job_id: Uuid, patch: JobPatch) -> Result<(), DbError>;

    /// Fetch a single job, or `None` when absent.
    async fn get_job(&self, job_id: Uuid) -> Result<Option<ExportJob>, DbError>;

    /// List the most recently created jobs, newest first.
    async fn list_recent_jobs(&self, limit: i64) -> Result<Vec<ExportJob>, DbError>;

    /// Insert message rows, silently ignoring rows whose `message_id` already
    /// exists. Never errors on duplicate keys.
    async fn upsert_messages(&self, rows: &[MessageRecord]) -> Result<(), DbError>;

    /// Count how many of the given ids are already present in the message
    /// store. Duplicate ids in the input count once.
    async fn count_existing_by_ids(&self, ids: &[String]) -> Result<i64, DbError>;
}
