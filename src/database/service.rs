//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{DatabasePool, UserRepository, GroupRepository, BroadcastRepository};
use crate::models::group::{Group, CreateGroupRequest, GroupSettings};
use crate::utils::errors::DownMateError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub broadcasts: BroadcastRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            broadcasts: BroadcastRepository::new(pool),
        }
    }

    /// Get or create a group policy record on first observed activity
    pub async fn initialize_group(
        &self,
        telegram_id: i64,
        title: String,
        default_settings: GroupSettings,
    ) -> Result<Group, DownMateError> {
        if let Some(existing_group) = self.groups.find_by_telegram_id(telegram_id).await? {
            return Ok(existing_group);
        }

        let request = CreateGroupRequest {
            telegram_id,
            title,
            language_code: None,
            settings: Some(default_settings),
        };

        self.groups.create(request).await
    }

    /// Get system statistics for the admin panel
    pub async fn get_system_stats(&self) -> Result<SystemStats, DownMateError> {
        let total_users = self.users.count().await?;
        let total_groups = self.groups.count().await?;
        let (downloads_total, downloads_successful, downloads_failed) =
            self.users.download_totals().await?;

        Ok(SystemStats {
            total_users,
            total_groups,
            downloads_total,
            downloads_successful,
            downloads_failed,
        })
    }
}

/// Aggregated counters for the admin statistics view
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub total_users: i64,
    pub total_groups: i64,
    pub downloads_total: i64,
    pub downloads_successful: i64,
    pub downloads_failed: i64,
}
