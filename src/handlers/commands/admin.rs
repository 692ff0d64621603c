//! Admin command handlers
//!
//! Password authentication (/admin <password>), the admin panel menu,
//! and the /stats view.

use std::collections::HashMap;
use teloxide::{Bot, types::{Message, InlineKeyboardMarkup, InlineKeyboardButton, ChatId}, prelude::*};
use tracing::{info, debug, warn};
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use crate::services::ServiceFactory;
use crate::i18n::I18n;

/// Handle /admin command - authenticate with the configured password
/// and open the admin panel
pub async fn handle_admin(
    bot: Bot,
    msg: Message,
    password: String,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        crate::utils::errors::DownMateError::InvalidInput("No user in message".to_string())
    })?;

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    if !chat_id.is_user() {
        return Ok(());
    }

    debug!(user_id = user_id, "Processing /admin command");

    services
        .user_service
        .register_or_get_user(
            user_id,
            user.username.clone(),
            Some(user.first_name.clone()),
            Some(i18n.detect_user_language(user.language_code.as_deref())),
        )
        .await?;

    let lang = services.user_service.language_of(user_id).await?;

    // Already authenticated admins can reopen the panel without the password.
    let already_admin = services.user_service.is_admin(user_id).await?;

    if !already_admin {
        if password.trim().is_empty() {
            bot.send_message(chat_id, i18n.t("commands.admin.usage", &lang, None)).await?;
            return Ok(());
        }

        if !services.user_service.authenticate_admin(user_id, password.trim()).await? {
            warn!(user_id = user_id, "Admin authentication rejected");
            bot.send_message(chat_id, i18n.t("commands.admin.auth_failed", &lang, None)).await?;
            return Ok(());
        }

        bot.send_message(chat_id, i18n.t("commands.admin.auth_success", &lang, None)).await?;
    }

    show_admin_panel(bot, chat_id, &i18n, &lang).await?;
    log_admin_action(user_id, "admin_panel_opened", None, None);
    Ok(())
}

/// Show the admin panel menu
pub async fn show_admin_panel(bot: Bot, chat_id: ChatId, i18n: &I18n, lang: &str) -> Result<()> {
    let title = i18n.t("commands.admin.panel_title", lang, None);

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.admin.stats", lang, None),
            "admin:stats",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.admin.broadcast", lang, None),
            "admin:broadcast",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.admin.pending", lang, None),
            "admin:pending",
        )],
    ]);

    bot.send_message(chat_id, title).reply_markup(keyboard).await?;
    Ok(())
}

/// Handle /stats command - show system statistics to admins
pub async fn handle_stats(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        crate::utils::errors::DownMateError::InvalidInput("No user in message".to_string())
    })?;

    let user_id = user.id.0 as i64;
    let lang = services.user_service.language_of(user_id).await?;

    if !services.user_service.is_admin(user_id).await? {
        bot.send_message(msg.chat.id, i18n.t("commands.admin.access_denied", &lang, None)).await?;
        return Ok(());
    }

    send_stats(bot, msg.chat.id, &services, &i18n, &lang).await?;
    log_admin_action(user_id, "stats_viewed", None, None);
    Ok(())
}

/// Render and send the statistics view
pub async fn send_stats(
    bot: Bot,
    chat_id: ChatId,
    services: &ServiceFactory,
    i18n: &I18n,
    lang: &str,
) -> Result<()> {
    let stats = services.database.get_system_stats().await?;

    let mut params = HashMap::new();
    params.insert("users".to_string(), stats.total_users.to_string());
    params.insert("groups".to_string(), stats.total_groups.to_string());
    params.insert("downloads".to_string(), stats.downloads_total.to_string());
    params.insert("successful".to_string(), stats.downloads_successful.to_string());
    params.insert("failed".to_string(), stats.downloads_failed.to_string());

    let text = i18n.t("commands.admin.stats", lang, Some(&params));
    bot.send_message(chat_id, text).await?;

    info!(users = stats.total_users, groups = stats.total_groups, "Stats reported");
    Ok(())
}
