//! Job lifecycle state machine.
//!
//! One runner task owns one job: it persists the `running` transition, drives
//! the export collaborator, reconciles the result against prior data, and
//! always lands the job in exactly one terminal state. No error escapes
//! [`JobRunner::execute`]; a job is never left stuck in `running` by a fault
//! this side of the terminal write.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, warn};

use chatarc_common::text::truncate_error;

use super::exporter::{ExportError, ExportRequest, MessageExporter};
use super::reconcile::{reconcile, EffectiveResult};
use crate::db::{DbError, ExportStore};
use crate::models::{ExportJob, JobPatch, MessageRecord};

/// Per-request execution options not persisted on the job record.
#[derive(Debug, Clone, Default)]
pub struct ExportParams {
    pub media: bool,
    pub filter: Option<String>,
}

#[derive(Debug, Error)]
enum ExecutionError {
    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Store(#[from] DbError),
}

/// Executes one export job from `running` to a terminal state.
pub struct JobRunner {
    store: Arc<dyn ExportStore>,
    exporter: Arc<dyn MessageExporter>,
}

impl JobRunner {
    pub fn new(store: Arc<dyn ExportStore>, exporter: Arc<dyn MessageExporter>) -> Self {
        Self { store, exporter }
    }

    /// Run the job to completion. Infallible from the caller's perspective:
    /// every outcome, expected or not, ends in a persisted terminal state.
    /// Only a failing terminal write itself is beyond recovery; it is logged
    /// and the process moves on.
    pub async fn execute(&self, job: ExportJob, params: ExportParams) {
        let job_id = job.job_id;
        let started = Instant::now();
        info!(%job_id, channel_id = %job.channel_id, "export job started");

        let outcome = self.run(&job, &params).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        let patch = match outcome {
            Ok(result) if result.ok => {
                info!(
                    %job_id,
                    message_count = result.message_count,
                    duration_ms,
                    "export job completed"
                );
                JobPatch::completed(result.message_count, result.inserted_count, duration_ms)
            }
            Ok(result) => {
                // Expected under overlapping time ranges; kept distinct from
                // execution failures so operators can filter it.
                warn!(
                    %job_id,
                    message_count = result.message_count,
                    inserted_count = result.inserted_count,
                    duration_ms,
                    "export job overlaps previously archived data"
                );
                JobPatch::integrity_mismatch(
                    result.message_count,
                    result.inserted_count,
                    duration_ms,
                )
            }
            Err(e) => {
                error!(%job_id, error = %e, duration_ms, "export job failed");
                JobPatch::failed(truncate_error(&e.to_string()), duration_ms)
            }
        };

        if let Err(e) = self.store.update_job(job_id, patch).await {
            error!(%job_id, error = %e, "failed to persist terminal job state");
        }
    }

    async fn run(
        &self,
        job: &ExportJob,
        params: &ExportParams,
    ) -> Result<EffectiveResult, ExecutionError> {
        // Persist `running` first so observers can see in-flight jobs.
        self.store
            .update_job(job.job_id, JobPatch::running())
            .await?;

        let request = ExportRequest {
            channel_id: job.channel_id.clone(),
            start_at: job.start_at,
            end_at: job.end_at,
            media: params.media,
            filter: params.filter.clone(),
        };
        let payload = self.exporter.export(&request).await?;

        let rows = normalize_rows(job, payload);
        let ids: Vec<String> = rows.iter().map(|r| r.message_id.clone()).collect();

        // Pre-check before the insert: the duplicate-ignoring write mode makes
        // row counts useless for telling novel data from overlap afterwards.
        let preexisting = self.store.count_existing_by_ids(&ids).await?;
        self.store.upsert_messages(&rows).await?;

        Ok(reconcile(&ids, preexisting))
    }
}

/// Normalize raw export payloads into message rows tagged with this job.
///
/// Only `id` is interpreted; everything else is carried as opaque payload.
fn normalize_rows(job: &ExportJob, payload: Vec<serde_json::Value>) -> Vec<MessageRecord> {
    payload
        .into_iter()
        .map(|m| {
            let author = m.get("author");
            MessageRecord {
                message_id: m.get("id").map(value_to_string).unwrap_or_default(),
                job_id: job.job_id,
                channel_id: job.channel_id.clone(),
                author_id: author.and_then(|a| a.get("id")).map(value_to_string),
                author_name: author
                    .and_then(|a| a.get("name"))
                    .and_then(|v| v.as_str())
                    .map(String::from),
                content: m.get("content").and_then(|v| v.as_str()).map(String::from),
                timestamp: m
                    .get("timestamp")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                attachments: m.get("attachments").cloned(),
                embeds: m.get("embeds").cloned(),
                raw: m,
            }
        })
        .collect()
}

/// Ids come back as strings or numbers depending on exporter version.
fn value_to_string(v: &serde_json::Value) -> String {
    match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    }
}
