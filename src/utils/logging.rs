//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the DownMate application.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
/// The returned guard must stay alive for the lifetime of the process;
/// dropping it stops the background writer for the rolling log file.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "downmate.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log group moderation decisions
pub fn log_moderation_action(group_id: i64, user_id: i64, reason: &str) {
    info!(
        group_id = group_id,
        user_id = user_id,
        reason = reason,
        "Message removed by moderation"
    );
}

/// Log download requests and outcomes
pub fn log_download(user_id: i64, url: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            user_id = user_id,
            url = url,
            details = details,
            "Download completed"
        );
    } else {
        warn!(
            user_id = user_id,
            url = url,
            details = details,
            "Download failed"
        );
    }
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log broadcast dispatch results
pub fn log_broadcast_result(broadcast_id: &str, recipients: usize, sent: usize, failed: usize) {
    info!(
        broadcast_id = broadcast_id,
        recipients = recipients,
        sent = sent,
        failed = failed,
        "Broadcast dispatch finished"
    );
}
