//! Callback query handlers module
//!
//! This module contains handlers for all inline keyboard button callbacks

pub mod broadcast;
pub mod group_panel;

use teloxide::{Bot, types::{CallbackQuery, ChatId}, prelude::*};
use tracing::{debug, warn};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::state::StateStorage;
use crate::i18n::I18n;
use crate::handlers::commands::{start, admin};

/// Main callback query dispatcher. Callback data is a colon-separated
/// path; an unknown action is logged and ignored.
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    let Some(data) = query.data.clone() else {
        return Ok(());
    };

    debug!(user_id = user_id, chat_id = ?chat_id, data = %data, "Processing callback query");

    // Answer first so the button stops showing the loading state.
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    let parts: Vec<&str> = data.split(':').collect();
    let (action, rest) = match parts.split_first() {
        Some((action, rest)) => (*action, rest),
        None => return Ok(()),
    };

    match action {
        "lang" => {
            if let [code] = rest {
                start::handle_language_callback(bot, chat_id, user_id, code.to_string(), services, i18n).await?;
            }
        }
        "glang" => {
            if let [code] = rest {
                group_panel::handle_group_language_callback(bot, chat_id, user_id, code, services, i18n).await?;
            }
        }
        "menu" => {
            handle_menu_callback(bot, chat_id, user_id, rest, services, i18n).await?;
        }
        "admin" => {
            handle_admin_callback(bot, chat_id, user_id, rest, services, state_storage, i18n).await?;
        }
        "bcast" => {
            broadcast::handle_broadcast_callback(bot, chat_id, user_id, rest, services, state_storage, i18n).await?;
        }
        "panel" => {
            group_panel::handle_panel_callback(bot, chat_id, user_id, rest, services, i18n).await?;
        }
        "lock" => {
            group_panel::handle_lock_callback(bot, chat_id, user_id, rest, services, i18n).await?;
        }
        "lists" => {
            group_panel::handle_lists_callback(bot, chat_id, user_id, rest, services, state_storage, i18n).await?;
        }
        "set" => {
            group_panel::handle_settings_callback(bot, chat_id, user_id, rest, services, state_storage, i18n).await?;
        }
        _ => {
            warn!(action = %action, "Unknown callback action");
        }
    }

    Ok(())
}

/// Handle main menu callbacks from the /start keyboard
async fn handle_menu_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let lang = services.user_service.language_of(user_id).await?;

    match parts {
        ["download"] => {
            bot.send_message(chat_id, i18n.t("download.send_link", &lang, None)).await?;
        }
        ["language"] => {
            start::show_language_selection(bot, chat_id, &i18n, &lang).await?;
        }
        ["help"] => {
            bot.send_message(chat_id, i18n.t("commands.help.text", &lang, None)).await?;
        }
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown menu callback");
        }
    }

    Ok(())
}

/// Handle admin panel callbacks
async fn handle_admin_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    _state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let lang = services.user_service.language_of(user_id).await?;

    if !services.user_service.is_admin(user_id).await? {
        bot.send_message(chat_id, i18n.t("commands.admin.access_denied", &lang, None)).await?;
        return Ok(());
    }

    match parts {
        ["stats"] => {
            admin::send_stats(bot, chat_id, &services, &i18n, &lang).await?;
        }
        ["broadcast"] => {
            broadcast::show_target_menu(bot, chat_id, &i18n, &lang).await?;
        }
        ["pending"] => {
            broadcast::show_pending(bot, chat_id, &services, &i18n, &lang).await?;
        }
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown admin callback");
        }
    }

    Ok(())
}
