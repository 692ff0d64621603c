//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest, UpdateUserRequest};
use crate::utils::errors::DownMateError;

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, language_code, is_admin, \
     downloads_total, downloads_successful, downloads_failed, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DownMateError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (telegram_id, username, first_name, language_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, telegram_id, username, first_name, language_code, is_admin,
                      downloads_total, downloads_successful, downloads_failed, created_at, updated_at
            "#
        )
        .bind(request.telegram_id)
        .bind(request.username)
        .bind(request.first_name)
        .bind(request.language_code.unwrap_or_else(|| "en".to_string()))
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, DownMateError> {
        let user = sqlx::query_as::<_, User>(
            &format!("SELECT {} FROM users WHERE telegram_id = $1", USER_COLUMNS)
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User, DownMateError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                language_code = COALESCE($4, language_code),
                is_admin = COALESCE($5, is_admin),
                updated_at = $6
            WHERE id = $1
            RETURNING id, telegram_id, username, first_name, language_code, is_admin,
                      downloads_total, downloads_successful, downloads_failed, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.username)
        .bind(request.first_name)
        .bind(request.language_code)
        .bind(request.is_admin)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Record a finished download attempt on the user's counters
    pub async fn record_download(&self, id: i64, success: bool) -> Result<User, DownMateError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET downloads_total = downloads_total + 1,
                downloads_successful = downloads_successful + CASE WHEN $2 THEN 1 ELSE 0 END,
                downloads_failed = downloads_failed + CASE WHEN $2 THEN 0 ELSE 1 END,
                updated_at = $3
            WHERE id = $1
            RETURNING id, telegram_id, username, first_name, language_code, is_admin,
                      downloads_total, downloads_successful, downloads_failed, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(success)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all user Telegram ids (broadcast recipients)
    pub async fn list_telegram_ids(&self) -> Result<Vec<i64>, DownMateError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT telegram_id FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, DownMateError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Aggregate download counters across all users.
    /// SUM over BIGINT yields NUMERIC in Postgres; cast back so the
    /// tuple decodes as i64.
    pub async fn download_totals(&self) -> Result<(i64, i64, i64), DownMateError> {
        let totals: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(downloads_total), 0)::BIGINT,
                   COALESCE(SUM(downloads_successful), 0)::BIGINT,
                   COALESCE(SUM(downloads_failed), 0)::BIGINT
            FROM users
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}
