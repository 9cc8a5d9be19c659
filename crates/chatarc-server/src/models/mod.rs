//! Domain models shared by the archive engine, store, and API features.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error string written to jobs that failed reconciliation.
///
/// Kept distinct from execution-failure diagnostics so operators can filter
/// overlapping-range jobs separately from broken exports.
pub const INTEGRITY_MISMATCH_ERROR: &str = "integrity_mismatch";

/// Lifecycle state of an export job.
///
/// Progression is monotonic: `pending -> running -> (completed | failed)`.
/// Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// One request to archive messages in a bounded time range.
///
/// `channel_id`, `start_at`, and `end_at` are immutable once created. Counts,
/// error, and duration are set only when the job reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub job_id: Uuid,
    pub channel_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ExportJob {
    /// Create a new job in `pending` with a fresh id.
    pub fn pending(channel_id: String, start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            channel_id,
            start_at,
            end_at,
            status: JobStatus::Pending,
            message_count: None,
            inserted_count: None,
            error: None,
            duration_ms: None,
            created_at: Utc::now(),
        }
    }
}

/// Partial update applied to a job record.
///
/// Only fields set to `Some` are written; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub message_count: Option<i64>,
    pub inserted_count: Option<i64>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
}

impl JobPatch {
    /// Mark a job as running.
    pub fn running() -> Self {
        Self {
            status: Some(JobStatus::Running),
            ..Self::default()
        }
    }

    /// Terminal success: counts reconciled, zero overlap with prior data.
    pub fn completed(message_count: i64, inserted_count: i64, duration_ms: i64) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            message_count: Some(message_count),
            inserted_count: Some(inserted_count),
            error: None,
            duration_ms: Some(duration_ms),
        }
    }

    /// Terminal failure from reconciliation overlap. Counts are still recorded.
    pub fn integrity_mismatch(message_count: i64, inserted_count: i64, duration_ms: i64) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            message_count: Some(message_count),
            inserted_count: Some(inserted_count),
            error: Some(INTEGRITY_MISMATCH_ERROR.to_string()),
            duration_ms: Some(duration_ms),
        }
    }

    /// Terminal failure from execution. Counts are left unset.
    pub fn failed(error: String, duration_ms: i64) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error: Some(error),
            duration_ms: Some(duration_ms),
            ..Self::default()
        }
    }

    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.message_count.is_none()
            && self.inserted_count.is_none()
            && self.error.is_none()
            && self.duration_ms.is_none()
    }
}

/// One archived message row.
///
/// Content fields are opaque payloads forwarded from the export tool; the
/// engine interprets only `message_id` (dedup key) and `job_id` (provenance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: String,
    pub job_id: Uuid,
    pub channel_id: String,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub content: Option<String>,
    pub timestamp: Option<String>,
    pub attachments: Option<serde_json::Value>,
    pub embeds: Option<serde_json::Value>,
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "running", "completed", "failed"] {
            let status: JobStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("done".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_pending_job_has_no_terminal_fields() {
        let job = ExportJob::pending("123".to_string(), Utc::now(), Utc::now());
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.message_count.is_none());
        assert!(job.inserted_count.is_none());
        assert!(job.error.is_none());
        assert!(job.duration_ms.is_none());
    }

    #[test]
    fn test_failed_patch_leaves_counts_unset() {
        let patch = JobPatch::failed("boom".to_string(), 12);
        assert_eq!(patch.status, Some(JobStatus::Failed));
        assert!(patch.message_count.is_none());
        assert!(patch.inserted_count.is_none());
        assert_eq!(patch.duration_ms, Some(12));
    }

    #[test]
    fn test_integrity_mismatch_patch_records_counts() {
        let patch = JobPatch::integrity_mismatch(10, 7, 34);
        assert_eq!(patch.status, Some(JobStatus::Failed));
        assert_eq!(patch.message_count, Some(10));
        assert_eq!(patch.inserted_count, Some(7));
        assert_eq!(patch.error.as_deref(), Some(INTEGRITY_MISMATCH_ERROR));
    }
}
