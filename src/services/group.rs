//! Group policy service implementation
//!
//! High-level operations over a group's policy record: lock toggles,
//! membership lists, word filter, warnings, and behavior settings. Every
//! mutation writes exactly one policy section back to the database.

use tracing::{info, warn};
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::group::{Group, GroupSettings, LockKind};
use crate::utils::errors::{DownMateError, Result};

#[derive(Clone)]
pub struct GroupService {
    database: DatabaseService,
    settings: Settings,
}

impl GroupService {
    pub fn new(database: DatabaseService, settings: Settings) -> Self {
        Self { database, settings }
    }

    /// Get or create the policy record for a group, seeding settings
    /// from the configured defaults
    pub async fn ensure_group(&self, telegram_id: i64, title: &str) -> Result<Group> {
        let defaults = GroupSettings {
            downloads_enabled: self.settings.groups.downloads_enabled,
            welcome_message: self.settings.groups.welcome_template.clone(),
            warn_limit: self.settings.groups.warn_limit,
            ..Default::default()
        };

        self.database
            .initialize_group(telegram_id, title.to_string(), defaults)
            .await
    }

    /// Get an existing policy record
    pub async fn get_group(&self, telegram_id: i64) -> Result<Group> {
        self.database
            .groups
            .find_by_telegram_id(telegram_id)
            .await?
            .ok_or(DownMateError::GroupNotFound { group_id: telegram_id })
    }

    /// Toggle a content lock by wire name; returns the new state.
    ///
    /// An unknown lock name is a failed operation, never a panic.
    pub async fn toggle_lock(&self, telegram_id: i64, lock_name: &str) -> Result<bool> {
        let Some(kind) = LockKind::from_name(lock_name) else {
            warn!(group_id = telegram_id, lock = lock_name, "Unknown lock name");
            return Err(DownMateError::InvalidInput(format!("Unknown lock: {}", lock_name)));
        };

        let mut group = self.get_group(telegram_id).await?;
        let new_state = group.locks.toggle(kind);
        self.database.groups.update_locks(group.id, &group.locks).await?;

        info!(group_id = telegram_id, lock = lock_name, locked = new_state, "Lock toggled");
        Ok(new_state)
    }

    /// Add the user to the policy admin list; idempotent
    pub async fn grant_admin(&self, telegram_id: i64, user_id: i64) -> Result<()> {
        let mut group = self.get_group(telegram_id).await?;
        if crate::models::group::GroupLists::add_to(&mut group.lists.admins, user_id) {
            self.database.groups.update_lists(group.id, &group.lists).await?;
            info!(group_id = telegram_id, user_id = user_id, "Group admin added");
        }
        Ok(())
    }

    /// Add or remove a user from the VIP list
    pub async fn set_vip(&self, telegram_id: i64, user_id: i64, vip: bool) -> Result<bool> {
        let mut group = self.get_group(telegram_id).await?;
        let changed = if vip {
            crate::models::group::GroupLists::add_to(&mut group.lists.vips, user_id)
        } else {
            crate::models::group::GroupLists::remove_from(&mut group.lists.vips, user_id)
        };
        if changed {
            self.database.groups.update_lists(group.id, &group.lists).await?;
        }
        Ok(changed)
    }

    /// Add or remove a user from the muted list
    pub async fn set_muted(&self, telegram_id: i64, user_id: i64, muted: bool) -> Result<bool> {
        let mut group = self.get_group(telegram_id).await?;
        let changed = if muted {
            crate::models::group::GroupLists::add_to(&mut group.lists.muted, user_id)
        } else {
            crate::models::group::GroupLists::remove_from(&mut group.lists.muted, user_id)
        };
        if changed {
            self.database.groups.update_lists(group.id, &group.lists).await?;
            info!(group_id = telegram_id, user_id = user_id, muted = muted, "Mute list updated");
        }
        Ok(changed)
    }

    /// Add or remove a user from the banned list
    pub async fn set_banned(&self, telegram_id: i64, user_id: i64, banned: bool) -> Result<bool> {
        let mut group = self.get_group(telegram_id).await?;
        let changed = if banned {
            crate::models::group::GroupLists::add_to(&mut group.lists.banned, user_id)
        } else {
            crate::models::group::GroupLists::remove_from(&mut group.lists.banned, user_id)
        };
        if changed {
            self.database.groups.update_lists(group.id, &group.lists).await?;
            info!(group_id = telegram_id, user_id = user_id, banned = banned, "Ban list updated");
        }
        Ok(changed)
    }

    /// Add a word to the filter; stored lowercase, idempotent
    pub async fn add_filtered_word(&self, telegram_id: i64, word: &str) -> Result<bool> {
        let mut group = self.get_group(telegram_id).await?;
        let added = group.lists.add_filtered_word(word);
        if added {
            self.database.groups.update_lists(group.id, &group.lists).await?;
        }
        Ok(added)
    }

    /// Remove a word from the filter
    pub async fn remove_filtered_word(&self, telegram_id: i64, word: &str) -> Result<bool> {
        let mut group = self.get_group(telegram_id).await?;
        let removed = group.lists.remove_filtered_word(word);
        if removed {
            self.database.groups.update_lists(group.id, &group.lists).await?;
        }
        Ok(removed)
    }

    /// Record a warning against a user. When the count reaches the
    /// group's warn limit the user is muted and the counter is reset.
    pub async fn warn_user(&self, telegram_id: i64, user_id: i64) -> Result<WarnOutcome> {
        let mut group = self.get_group(telegram_id).await?;
        let count = group.lists.add_warning(user_id);
        let limit = group.settings.warn_limit;

        let outcome = if count >= limit {
            group.lists.clear_warnings(user_id);
            crate::models::group::GroupLists::add_to(&mut group.lists.muted, user_id);
            info!(group_id = telegram_id, user_id = user_id, "Warn limit reached, user muted");
            WarnOutcome::Muted
        } else {
            WarnOutcome::Warned { count, limit }
        };

        self.database.groups.update_lists(group.id, &group.lists).await?;
        Ok(outcome)
    }

    /// Replace the group's settings section
    pub async fn update_settings<F>(&self, telegram_id: i64, mutate: F) -> Result<Group>
    where
        F: FnOnce(&mut GroupSettings),
    {
        let mut group = self.get_group(telegram_id).await?;
        mutate(&mut group.settings);
        self.database.groups.update_settings(group.id, &group.settings).await
    }

    /// Set the group's reply language
    pub async fn set_language(&self, telegram_id: i64, language_code: &str) -> Result<()> {
        if !self.settings.i18n.supported_languages.contains(&language_code.to_string()) {
            return Err(DownMateError::InvalidInput(format!(
                "Unsupported language: {}",
                language_code
            )));
        }

        let group = self.get_group(telegram_id).await?;
        self.database
            .groups
            .update(group.id, crate::models::group::UpdateGroupRequest {
                language_code: Some(language_code.to_string()),
                ..Default::default()
            })
            .await?;
        Ok(())
    }
}

/// Result of recording a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnOutcome {
    Warned { count: i32, limit: i32 },
    Muted,
}
