//! In-process store.
//!
//! Implements [`ExportStore`] over plain maps. Used by the test suites to
//! exercise the lifecycle engine and HTTP surface without PostgreSQL; also
//! keeps a per-job status transition log so tests can assert ordering.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{DbError, ExportStore};
use crate::models::{ExportJob, JobPatch, JobStatus, MessageRecord};

#[derive(Default)]
struct Inner {
    jobs: HashMap<Uuid, ExportJob>,
    // Insertion order, oldest first.
    job_order: Vec<Uuid>,
    messages: HashMap<String, MessageRecord>,
    transitions: HashMap<Uuid, Vec<JobStatus>>,
}

/// Map-backed [`ExportStore`].
#[derive(Default)]
pub struct MemoryExportStore {
    inner: Mutex<Inner>,
}

impl MemoryExportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status this job has held, in write order (starting at `pending`).
    pub fn status_history(&self, job_id: Uuid) -> Vec<JobStatus> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.transitions.get(&job_id).cloned().unwrap_or_default()
    }

    /// Number of stored message rows.
    pub fn message_count(&self) -> usize {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.messages.len()
    }
}

#[async_trait]
impl ExportStore for MemoryExportStore {
    async fn insert_job(&self, job: &ExportJob) -> Result<(), DbError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.jobs.insert(job.job_id, job.clone());
        inner.job_order.push(job.job_id);
        inner.transitions.insert(job.job_id, vec![job.status]);
        Ok(())
    }

    async fn update_job(&self, job_id: Uuid, patch: JobPatch) -> Result<(), DbError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        let job = inner
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| DbError::Decode(format!("no such job: {job_id}")))?;

        if let Some(status) = patch.status {
            job.status = status;
        }
        if let Some(message_count) = patch.message_count {
            job.message_count = Some(message_count);
        }
        if let Some(inserted_count) = patch.inserted_count {
            job.inserted_count = Some(inserted_count);
        }
        if let Some(error) = patch.error {
            job.error = Some(error);
        }
        if let Some(duration_ms) = patch.duration_ms {
            job.duration_ms = Some(duration_ms);
        }

        if let Some(status) = patch.status {
            inner.transitions.entry(job_id).or_default().push(status);
        }
        Ok(())
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<ExportJob>, DbError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.jobs.get(&job_id).cloned())
    }

    async fn list_recent_jobs(&self, limit: i64) -> Result<Vec<ExportJob>, DbError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .job_order
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .filter_map(|id| inner.jobs.get(id).cloned())
            .collect())
    }

    async fn upsert_messages(&self, rows: &[MessageRecord]) -> Result<(), DbError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        for row in rows {
            // First writer wins; later jobs never reassign a record.
            inner
                .messages
                .entry(row.message_id.clone())
                .or_insert_with(|| row.clone());
        }
        Ok(())
    }

    async fn count_existing_by_ids(&self, ids: &[String]) -> Result<i64, DbError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        Ok(unique
            .into_iter()
            .filter(|id| inner.messages.contains_key(*id))
            .count() as i64)
    }
}
