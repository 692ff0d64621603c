//! Error handling for DownMate
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the DownMate application
#[derive(Error, Debug)]
pub enum DownMateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: i64 },

    #[error("Broadcast not found: {broadcast_id}")]
    BroadcastNotFound { broadcast_id: String },

    #[error("Invalid dialog transition: {from} -> {to}")]
    InvalidDialogTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Media extraction specific errors
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("File exceeds size limit of {limit_bytes} bytes")]
    TooLarge { limit_bytes: u64 },

    #[error("Download timed out")]
    Timeout,

    #[error("Extractor failed: {0}")]
    ExtractorFailed(String),
}

/// Result type alias for DownMate operations
pub type Result<T> = std::result::Result<T, DownMateError>;

/// Result type alias for extractor operations
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

impl DownMateError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            DownMateError::Database(_) => false,
            DownMateError::Migration(_) => false,
            DownMateError::Telegram(_) => true,
            DownMateError::Download(_) => true,
            DownMateError::Config(_) => false,
            DownMateError::AccessDenied(_) => false,
            DownMateError::UserNotFound { .. } => false,
            DownMateError::GroupNotFound { .. } => false,
            DownMateError::BroadcastNotFound { .. } => false,
            DownMateError::InvalidDialogTransition { .. } => false,
            DownMateError::Redis(_) => true,
            DownMateError::Serialization(_) => false,
            DownMateError::Io(_) => true,
            DownMateError::UrlParse(_) => false,
            DownMateError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DownMateError::Database(_) => ErrorSeverity::Critical,
            DownMateError::Migration(_) => ErrorSeverity::Critical,
            DownMateError::Config(_) => ErrorSeverity::Critical,
            DownMateError::AccessDenied(_) => ErrorSeverity::Warning,
            DownMateError::InvalidInput(_) => ErrorSeverity::Info,
            DownMateError::Download(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
