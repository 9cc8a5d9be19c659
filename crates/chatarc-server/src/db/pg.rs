//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{DbError, ExportStore};
use crate::models::{ExportJob, JobPatch, JobStatus, MessageRecord};

const SELECT_JOB_COLUMNS: &str = "SELECT job_id, channel_id, start_at, end_at, status, \
     message_count, inserted_count, error, duration_ms, created_at FROM exports";

/// Bind parameters per message row in the batch insert.
const MESSAGE_BIND_COUNT: usize = 10;

/// Rows per INSERT statement. Postgres caps a statement at 65535 bind
/// parameters, and a day of an active channel easily exceeds that in one
/// export.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Store implementation over a sqlx connection pool.
#[derive(Clone)]
pub struct PgExportStore {
    pool: PgPool,
}

impl PgExportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row; status is decoded separately so unknown values surface as a
/// decode error instead of a silent default.
#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: Uuid,
    channel_id: String,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    status: String,
    message_count: Option<i64>,
    inserted_count: Option<i64>,
    error: Option<String>,
    duration_ms: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for ExportJob {
    type Error = DbError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status: JobStatus = row.status.parse().map_err(DbError::Decode)?;
        Ok(ExportJob {
            job_id: row.job_id,
            channel_id: row.channel_id,
            start_at: row.start_at,
            end_at: row.end_at,
            status,
            message_count: row.message_count,
            inserted_count: row.inserted_count,
            error: row.error,
            duration_ms: row.duration_ms,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ExportStore for PgExportStore {
    async fn insert_job(&self, job: &ExportJob) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO exports (job_id, channel_id, start_at, end_at, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(job.job_id)
        .bind(&job.channel_id)
        .bind(job.start_at)
        .bind(job.end_at)
        .bind(job.status.to_string())
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_job(&self, job_id: Uuid, patch: JobPatch) -> Result<(), DbError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE exports SET ");
        let mut fields = qb.separated(", ");
        if let Some(status) = patch.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status.to_string());
        }
        if let Some(message_count) = patch.message_count {
            fields.push("message_count = ");
            fields.push_bind_unseparated(message_count);
        }
        if let Some(inserted_count) = patch.inserted_count {
            fields.push("inserted_count = ");
            fields.push_bind_unseparated(inserted_count);
        }
        if let Some(error) = patch.error {
            fields.push("error = ");
            fields.push_bind_unseparated(error);
        }
        if let Some(duration_ms) = patch.duration_ms {
            fields.push("duration_ms = ");
            fields.push_bind_unseparated(duration_ms);
        }
        qb.push(" WHERE job_id = ");
        qb.push_bind(job_id);

        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<ExportJob>, DbError> {
        let row = sqlx::query_as::<_, JobRow>(&format!("{SELECT_JOB_COLUMNS} WHERE job_id = $1"))
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ExportJob::try_from).transpose()
    }

    async fn list_recent_jobs(&self, limit: i64) -> Result<Vec<ExportJob>, DbError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{SELECT_JOB_COLUMNS} ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExportJob::try_from).collect()
    }

    async fn upsert_messages(&self, rows: &[MessageRecord]) -> Result<(), DbError> {
        if rows.is_empty() {
            return Ok(());
        }

        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO messages (message_id, job_id, channel_id, author_id, author_name, \
                 content, \"timestamp\", attachments, embeds, raw) ",
            );
            qb.push_values(chunk, |mut b, row| {
                b.push_bind(&row.message_id)
                    .push_bind(row.job_id)
                    .push_bind(&row.channel_id)
                    .push_bind(row.author_id.as_ref())
                    .push_bind(row.author_name.as_ref())
                    .push_bind(row.content.as_ref())
                    .push_bind(row.timestamp.as_ref())
                    .push_bind(row.attachments.as_ref())
                    .push_bind(row.embeds.as_ref())
                    .push_bind(&row.raw);
            });
            // Conflict-resolution mode, not suppressed errors: re-inserting an
            // existing message_id must never raise.
            qb.push(" ON CONFLICT (message_id) DO NOTHING");

            qb.build().execute(&self.pool).await?;
        }

        Ok(())
    }

    async fn count_existing_by_ids(&self, ids: &[String]) -> Result<i64, DbError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE message_id = ANY($1)")
                .bind(ids)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
