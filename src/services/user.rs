//! User service implementation
//!
//! This service handles user registration, language preferences, admin
//! authentication, and per-user download statistics.

use tracing::{info, warn, debug};
use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::user::{User, CreateUserRequest, UpdateUserRequest};
use crate::utils::errors::{DownMateError, Result};

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
    settings: Settings,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository, settings: Settings) -> Self {
        Self {
            user_repository,
            settings,
        }
    }

    /// Register a new user or get existing user
    pub async fn register_or_get_user(
        &self,
        telegram_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        language_code: Option<String>,
    ) -> Result<User> {
        debug!(telegram_id = telegram_id, "Attempting to register or get user");

        if let Some(existing_user) = self.user_repository.find_by_telegram_id(telegram_id).await? {
            return Ok(existing_user);
        }

        let create_request = CreateUserRequest {
            telegram_id,
            username,
            first_name,
            language_code: Some(
                language_code.unwrap_or_else(|| self.settings.i18n.default_language.clone()),
            ),
        };

        let user = self.user_repository.create(create_request).await?;
        info!(user_id = user.id, telegram_id = telegram_id, "New user registered");

        Ok(user)
    }

    /// Get user by Telegram ID
    pub async fn get_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        self.user_repository.find_by_telegram_id(telegram_id).await
    }

    /// Resolve a user's language, falling back to the configured default
    pub async fn language_of(&self, telegram_id: i64) -> Result<String> {
        Ok(self
            .user_repository
            .find_by_telegram_id(telegram_id)
            .await?
            .map(|u| u.language_code)
            .unwrap_or_else(|| self.settings.i18n.default_language.clone()))
    }

    /// Set user language preference
    pub async fn set_language_preference(&self, telegram_id: i64, language_code: String) -> Result<User> {
        debug!(telegram_id = telegram_id, language_code = %language_code, "Setting user language preference");

        if !self.settings.i18n.supported_languages.contains(&language_code) {
            warn!(telegram_id = telegram_id, language_code = %language_code, "Unsupported language code");
            return Err(DownMateError::InvalidInput(format!(
                "Unsupported language: {}",
                language_code
            )));
        }

        let existing_user = self
            .user_repository
            .find_by_telegram_id(telegram_id)
            .await?
            .ok_or(DownMateError::UserNotFound { user_id: telegram_id })?;

        let update_request = UpdateUserRequest {
            language_code: Some(language_code.clone()),
            ..Default::default()
        };

        let user = self.user_repository.update(existing_user.id, update_request).await?;
        info!(telegram_id = telegram_id, language_code = %language_code, "User language preference updated");

        Ok(user)
    }

    /// Authenticate an admin password and grant the persistent flag.
    ///
    /// Returns whether the password matched. A wrong password is an
    /// ordinary `false`, not an error.
    pub async fn authenticate_admin(&self, telegram_id: i64, password: &str) -> Result<bool> {
        if password != self.settings.bot.admin_password {
            warn!(telegram_id = telegram_id, "Failed admin authentication attempt");
            return Ok(false);
        }

        let existing_user = self
            .user_repository
            .find_by_telegram_id(telegram_id)
            .await?
            .ok_or(DownMateError::UserNotFound { user_id: telegram_id })?;

        if !existing_user.is_admin {
            let update_request = UpdateUserRequest {
                is_admin: Some(true),
                ..Default::default()
            };
            self.user_repository.update(existing_user.id, update_request).await?;
            info!(telegram_id = telegram_id, "Admin access granted");
        }

        Ok(true)
    }

    /// Check whether a user holds the admin flag
    pub async fn is_admin(&self, telegram_id: i64) -> Result<bool> {
        Ok(self
            .user_repository
            .find_by_telegram_id(telegram_id)
            .await?
            .map(|u| u.is_admin)
            .unwrap_or(false))
    }

    /// Record a finished download attempt on the user's counters
    pub async fn record_download(&self, telegram_id: i64, success: bool) -> Result<()> {
        let existing_user = self
            .user_repository
            .find_by_telegram_id(telegram_id)
            .await?
            .ok_or(DownMateError::UserNotFound { user_id: telegram_id })?;

        self.user_repository.record_download(existing_user.id, success).await?;
        Ok(())
    }
}
