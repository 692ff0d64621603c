//! Broadcast job repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::broadcast::{BroadcastJob, BroadcastStatus, CreateBroadcastRequest};
use crate::utils::errors::DownMateError;

const BROADCAST_COLUMNS: &str =
    "id, message, target, status, scheduled_at, created_by, created_at";

#[derive(Debug, Clone)]
pub struct BroadcastRepository {
    pool: PgPool,
}

impl BroadcastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new broadcast job; status starts as Pending
    pub async fn create(&self, request: CreateBroadcastRequest) -> Result<BroadcastJob, DownMateError> {
        let job = sqlx::query_as::<_, BroadcastJob>(
            r#"
            INSERT INTO broadcasts (id, message, target, status, scheduled_at, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, message, target, status, scheduled_at, created_by, created_at
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(request.message)
        .bind(request.target)
        .bind(BroadcastStatus::Pending)
        .bind(request.scheduled_at)
        .bind(request.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    /// List pending (scheduled) jobs, soonest first
    pub async fn list_pending(&self) -> Result<Vec<BroadcastJob>, DownMateError> {
        let jobs = sqlx::query_as::<_, BroadcastJob>(
            &format!(
                "SELECT {} FROM broadcasts WHERE status = $1 ORDER BY scheduled_at NULLS FIRST, created_at",
                BROADCAST_COLUMNS
            )
        )
        .bind(BroadcastStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    /// Delete a job; returns whether a row was removed
    pub async fn delete(&self, id: &str) -> Result<bool, DownMateError> {
        let result = sqlx::query("DELETE FROM broadcasts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
