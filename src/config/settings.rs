//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub download: DownloadConfig,
    pub groups: GroupDefaultsConfig,
    pub broadcast: BroadcastConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub admin_password: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration for dialog state storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Media download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    pub max_size_bytes: u64,
    pub max_concurrent: usize,
    pub timeout_seconds: u64,
    pub temp_path: String,
    pub supported_platforms: Vec<String>,
}

/// Default policy values for newly observed groups
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupDefaultsConfig {
    pub warn_limit: i32,
    pub welcome_template: String,
    pub downloads_enabled: bool,
}

/// Broadcast dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastConfig {
    pub max_in_flight: usize,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("DOWNMATE"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::DownMateError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_password: String::new(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/downmate".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "downmate:".to_string(),
                ttl_seconds: 3600,
            },
            download: DownloadConfig {
                max_size_bytes: 50 * 1024 * 1024,
                max_concurrent: 3,
                timeout_seconds: 300,
                temp_path: "downloads".to_string(),
                supported_platforms: vec![
                    "youtube.com".to_string(),
                    "youtu.be".to_string(),
                    "instagram.com".to_string(),
                    "tiktok.com".to_string(),
                    "twitter.com".to_string(),
                    "x.com".to_string(),
                    "facebook.com".to_string(),
                    "pinterest.com".to_string(),
                    "vimeo.com".to_string(),
                    "dailymotion.com".to_string(),
                    "twitch.tv".to_string(),
                    "soundcloud.com".to_string(),
                    "t.me".to_string(),
                ],
            },
            groups: GroupDefaultsConfig {
                warn_limit: 3,
                welcome_template: "Welcome {user} to {group}!".to_string(),
                downloads_enabled: true,
            },
            broadcast: BroadcastConfig { max_in_flight: 8 },
            i18n: I18nConfig {
                default_language: "en".to_string(),
                supported_languages: vec!["en".to_string(), "fa".to_string()],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
            },
        }
    }
}
