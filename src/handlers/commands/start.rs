//! Start and language command handlers
//!
//! Handles /start (main menu), /language, and the language selection
//! callbacks.

use std::collections::HashMap;
use teloxide::{Bot, types::{Message, InlineKeyboardMarkup, InlineKeyboardButton, ChatId}, prelude::*};
use tracing::{info, debug, warn};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::i18n::I18n;

/// Handle /start command - register the user and show the main menu
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        crate::utils::errors::DownMateError::InvalidInput("No user in message".to_string())
    })?;

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id = user_id, chat_id = ?chat_id, "Processing /start command");

    if !chat_id.is_user() {
        return Ok(());
    }

    let record = services
        .user_service
        .register_or_get_user(
            user_id,
            user.username.clone(),
            Some(user.first_name.clone()),
            Some(i18n.detect_user_language(user.language_code.as_deref())),
        )
        .await?;

    let mut params = HashMap::new();
    params.insert(
        "name".to_string(),
        record
            .first_name
            .clone()
            .or_else(|| record.username.clone())
            .unwrap_or_else(|| "there".to_string()),
    );

    let text = i18n.t("commands.start.welcome", &record.language_code, Some(&params));
    let keyboard = main_menu_keyboard(&i18n, &record.language_code);

    bot.send_message(chat_id, text).reply_markup(keyboard).await?;

    info!(user_id = user_id, "User started bot");
    Ok(())
}

/// Main menu inline keyboard
fn main_menu_keyboard(i18n: &I18n, lang: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.menu.download", lang, None),
            "menu:download",
        )],
        vec![
            InlineKeyboardButton::callback(
                i18n.t("buttons.menu.language", lang, None),
                "menu:language",
            ),
            InlineKeyboardButton::callback(
                i18n.t("buttons.menu.help", lang, None),
                "menu:help",
            ),
        ],
    ])
}

/// Handle /language command - show language selection
pub async fn handle_language(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        crate::utils::errors::DownMateError::InvalidInput("No user in message".to_string())
    })?;

    let lang = services.user_service.language_of(user.id.0 as i64).await?;
    show_language_selection(bot, msg.chat.id, &i18n, &lang).await
}

/// Show the language selection keyboard
pub async fn show_language_selection(bot: Bot, chat_id: ChatId, i18n: &I18n, lang: &str) -> Result<()> {
    let text = i18n.t("commands.language.choose", lang, None);

    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(i18n.t("buttons.language.english", lang, None), "lang:en"),
        InlineKeyboardButton::callback(i18n.t("buttons.language.persian", lang, None), "lang:fa"),
    ]]);

    bot.send_message(chat_id, text).reply_markup(keyboard).await?;
    Ok(())
}

/// Handle a language selection callback
pub async fn handle_language_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    language_code: String,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    if !i18n.is_language_supported(&language_code) {
        warn!(user_id = user_id, language_code = %language_code, "Unsupported language selected");
        return Ok(());
    }

    services
        .user_service
        .set_language_preference(user_id, language_code.clone())
        .await?;

    let text = i18n.t("commands.language.updated", &language_code, None);
    bot.send_message(chat_id, text).await?;

    info!(user_id = user_id, language_code = %language_code, "User language updated");
    Ok(())
}
