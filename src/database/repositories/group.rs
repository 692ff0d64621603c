//! Group policy repository implementation
//!
//! The `locks`, `lists`, and `settings` policy sections live in separate
//! JSONB columns and are written with section-level updates, so a change
//! to one section never rewrites the others.

use sqlx::PgPool;
use sqlx::types::Json;
use chrono::Utc;
use crate::models::group::{
    Group, GroupLocks, GroupLists, GroupSettings, CreateGroupRequest, UpdateGroupRequest,
};
use crate::utils::errors::DownMateError;

const GROUP_COLUMNS: &str =
    "id, telegram_id, title, language_code, locks, lists, settings, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group policy record with default sections
    pub async fn create(&self, request: CreateGroupRequest) -> Result<Group, DownMateError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (telegram_id, title, language_code, locks, lists, settings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, telegram_id, title, language_code, locks, lists, settings, is_active, created_at, updated_at
            "#
        )
        .bind(request.telegram_id)
        .bind(request.title)
        .bind(request.language_code.unwrap_or_else(|| "en".to_string()))
        .bind(Json(GroupLocks::default()))
        .bind(Json(GroupLists::default()))
        .bind(Json(request.settings.unwrap_or_default()))
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Find group by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Group>, DownMateError> {
        let group = sqlx::query_as::<_, Group>(
            &format!("SELECT {} FROM groups WHERE telegram_id = $1", GROUP_COLUMNS)
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Update top-level group fields
    pub async fn update(&self, id: i64, request: UpdateGroupRequest) -> Result<Group, DownMateError> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET title = COALESCE($2, title),
                language_code = COALESCE($3, language_code),
                is_active = COALESCE($4, is_active),
                updated_at = $5
            WHERE id = $1
            RETURNING id, telegram_id, title, language_code, locks, lists, settings, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.language_code)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Replace the locks section only
    pub async fn update_locks(&self, id: i64, locks: &GroupLocks) -> Result<Group, DownMateError> {
        let group = sqlx::query_as::<_, Group>(
            &format!(
                "UPDATE groups SET locks = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
                GROUP_COLUMNS
            )
        )
        .bind(id)
        .bind(Json(locks))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Replace the lists section only
    pub async fn update_lists(&self, id: i64, lists: &GroupLists) -> Result<Group, DownMateError> {
        let group = sqlx::query_as::<_, Group>(
            &format!(
                "UPDATE groups SET lists = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
                GROUP_COLUMNS
            )
        )
        .bind(id)
        .bind(Json(lists))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// Replace the settings section only
    pub async fn update_settings(&self, id: i64, settings: &GroupSettings) -> Result<Group, DownMateError> {
        let group = sqlx::query_as::<_, Group>(
            &format!(
                "UPDATE groups SET settings = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
                GROUP_COLUMNS
            )
        )
        .bind(id)
        .bind(Json(settings))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    /// List all active group Telegram ids (broadcast recipients)
    pub async fn list_telegram_ids(&self) -> Result<Vec<i64>, DownMateError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT telegram_id FROM groups WHERE is_active = true ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Count total groups
    pub async fn count(&self) -> Result<i64, DownMateError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
