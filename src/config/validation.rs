//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{DownMateError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_download_config(&settings.download)?;
    validate_group_defaults(&settings.groups)?;
    validate_broadcast_config(&settings.broadcast)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(DownMateError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.admin_password.is_empty() {
        return Err(DownMateError::Config(
            "Admin password is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(DownMateError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(DownMateError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(DownMateError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(DownMateError::Config(
            "Redis URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate download configuration
fn validate_download_config(config: &super::DownloadConfig) -> Result<()> {
    if config.max_size_bytes == 0 {
        return Err(DownMateError::Config(
            "Max download size must be greater than 0".to_string()
        ));
    }

    if config.max_concurrent == 0 {
        return Err(DownMateError::Config(
            "Max concurrent downloads must be greater than 0".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(DownMateError::Config(
            "Download timeout must be greater than 0".to_string()
        ));
    }

    if config.supported_platforms.is_empty() {
        return Err(DownMateError::Config(
            "At least one supported platform is required".to_string()
        ));
    }

    Ok(())
}

/// Validate group policy defaults
fn validate_group_defaults(config: &super::GroupDefaultsConfig) -> Result<()> {
    if config.warn_limit <= 0 {
        return Err(DownMateError::Config(
            "Default warn limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate broadcast configuration
fn validate_broadcast_config(config: &super::BroadcastConfig) -> Result<()> {
    if config.max_in_flight == 0 {
        return Err(DownMateError::Config(
            "Broadcast max in-flight must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(DownMateError::Config(
            "Default language is required".to_string()
        ));
    }

    if config.supported_languages.is_empty() {
        return Err(DownMateError::Config(
            "At least one supported language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(DownMateError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(DownMateError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(DownMateError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123:abc".to_string();
        settings.bot.admin_password = "secret".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut settings = valid_settings();
        settings.bot.token = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_admin_password_rejected() {
        let mut settings = valid_settings();
        settings.bot.admin_password = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_empty_platform_list_rejected() {
        let mut settings = valid_settings();
        settings.download.supported_platforms.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_unsupported_default_language_rejected() {
        let mut settings = valid_settings();
        settings.i18n.default_language = "de".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
