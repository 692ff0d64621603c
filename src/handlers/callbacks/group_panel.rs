//! Group moderation panel callbacks
//!
//! Renders the in-group panel menus (locks, lists, settings) and applies
//! toggle callbacks. Text inputs (welcome message, warn limit, channel
//! list, filtered words) are collected through dialog states and land in
//! the message handler.

use std::collections::HashMap;
use teloxide::{Bot, types::{ChatId, InlineKeyboardMarkup, InlineKeyboardButton}, prelude::*};
use tracing::{info, warn};

use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use crate::models::group::{Group, LockKind};
use crate::services::ServiceFactory;
use crate::state::{ConversationContext, DialogState, StateStorage};
use crate::i18n::I18n;

/// Show the top-level panel menu
pub async fn show_panel_main(bot: Bot, chat_id: ChatId, i18n: &I18n, lang: &str) -> Result<()> {
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.panel.locks", lang, None),
            "panel:locks",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.panel.lists", lang, None),
            "panel:lists",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.panel.settings", lang, None),
            "panel:settings",
        )],
    ]);

    bot.send_message(chat_id, i18n.t("panel.title", lang, None))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Show the content locks menu, two locks per row
async fn show_locks_menu(bot: Bot, chat_id: ChatId, group: &Group, i18n: &I18n, lang: &str) -> Result<()> {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for pair in LockKind::ALL.chunks(2) {
        let row = pair
            .iter()
            .map(|kind| {
                let icon = if group.locks.get(*kind) { "🔒" } else { "🔓" };
                InlineKeyboardButton::callback(
                    format!("{} {}", icon, kind.name()),
                    format!("lock:toggle:{}", kind.name()),
                )
            })
            .collect();
        rows.push(row);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        i18n.t("buttons.panel.back", lang, None),
        "panel:main",
    )]);

    bot.send_message(chat_id, i18n.t("panel.locks_title", lang, None))
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Show the membership lists summary
async fn show_lists_menu(bot: Bot, chat_id: ChatId, group: &Group, i18n: &I18n, lang: &str) -> Result<()> {
    let mut params = HashMap::new();
    params.insert("admins".to_string(), group.lists.admins.len().to_string());
    params.insert("vips".to_string(), group.lists.vips.len().to_string());
    params.insert("muted".to_string(), group.lists.muted.len().to_string());
    params.insert("banned".to_string(), group.lists.banned.len().to_string());
    params.insert("words".to_string(), group.lists.filtered_words.len().to_string());
    params.insert("warned".to_string(), group.lists.warnings.len().to_string());

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.panel.add_word", lang, None),
            "lists:add_word",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.panel.back", lang, None),
            "panel:main",
        )],
    ]);

    bot.send_message(chat_id, i18n.t("panel.lists_summary", lang, Some(&params)))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

fn flag_icon(on: bool) -> &'static str {
    if on { "✅" } else { "❌" }
}

/// Show the behavior settings menu
async fn show_settings_menu(bot: Bot, chat_id: ChatId, group: &Group, i18n: &I18n, lang: &str) -> Result<()> {
    let s = &group.settings;

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!("{} {}", flag_icon(s.group_locked), i18n.t("buttons.settings.group_lock", lang, None)),
            "set:toggle:group_locked",
        )],
        vec![InlineKeyboardButton::callback(
            format!("{} {}", flag_icon(s.downloads_enabled), i18n.t("buttons.settings.downloads", lang, None)),
            "set:toggle:downloads",
        )],
        vec![
            InlineKeyboardButton::callback(
                format!("{} {}", flag_icon(s.welcome_enabled), i18n.t("buttons.settings.welcome", lang, None)),
                "set:toggle:welcome",
            ),
            InlineKeyboardButton::callback(
                i18n.t("buttons.settings.welcome_text", lang, None),
                "set:edit:welcome",
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("{} {}", flag_icon(s.force_membership), i18n.t("buttons.settings.force", lang, None)),
                "set:toggle:force",
            ),
            InlineKeyboardButton::callback(
                i18n.t("buttons.settings.force_channels", lang, None),
                "set:edit:channels",
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("{} {}", flag_icon(s.auto_lock_enabled), i18n.t("buttons.settings.auto_lock", lang, None)),
                "set:toggle:auto_lock",
            ),
            InlineKeyboardButton::callback(
                i18n.t("buttons.settings.auto_lock_duration", lang, None),
                "set:edit:duration",
            ),
        ],
        vec![InlineKeyboardButton::callback(
            format!("{} ({})", i18n.t("buttons.settings.warn_limit", lang, None), s.warn_limit),
            "set:edit:warn_limit",
        )],
        vec![
            InlineKeyboardButton::callback("🇬🇧 English", "glang:en"),
            InlineKeyboardButton::callback("🇮🇷 فارسی", "glang:fa"),
        ],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.panel.back", lang, None),
            "panel:main",
        )],
    ]);

    bot.send_message(chat_id, i18n.t("panel.settings_title", lang, None))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Load the group for a panel callback, rejecting non-admin invokers.
async fn authorized_group(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    services: &ServiceFactory,
    i18n: &I18n,
) -> Result<Option<Group>> {
    let group = services.group_service.get_group(chat_id.0).await?;

    if !group.lists.is_admin(user_id) {
        let lang = group.language_code.clone();
        bot.send_message(chat_id, i18n.t("panel.admins_only", &lang, None)).await?;
        return Ok(None);
    }

    Ok(Some(group))
}

/// Handle panel:* navigation callbacks
pub async fn handle_panel_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some(group) = authorized_group(&bot, chat_id, user_id, &services, &i18n).await? else {
        return Ok(());
    };
    let lang = group.language_code.clone();

    match parts {
        ["main"] => show_panel_main(bot, chat_id, &i18n, &lang).await,
        ["locks"] => show_locks_menu(bot, chat_id, &group, &i18n, &lang).await,
        ["lists"] => show_lists_menu(bot, chat_id, &group, &i18n, &lang).await,
        ["settings"] => show_settings_menu(bot, chat_id, &group, &i18n, &lang).await,
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown panel callback");
            Ok(())
        }
    }
}

/// Handle lock:toggle:<name> callbacks. An unknown lock name answers
/// with nothing changed instead of failing the update.
pub async fn handle_lock_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some(group) = authorized_group(&bot, chat_id, user_id, &services, &i18n).await? else {
        return Ok(());
    };
    let lang = group.language_code.clone();

    match parts {
        ["toggle", lock_name] => {
            if LockKind::from_name(lock_name).is_none() {
                warn!(group_id = chat_id.0, lock = %lock_name, "Toggle for unknown lock ignored");
                return Ok(());
            }

            let locked = services.group_service.toggle_lock(chat_id.0, lock_name).await?;
            log_admin_action(user_id, "lock_toggled", Some(lock_name), None);

            let refreshed = services.group_service.get_group(chat_id.0).await?;
            show_locks_menu(bot, chat_id, &refreshed, &i18n, &lang).await?;
            info!(group_id = chat_id.0, lock = %lock_name, locked = locked, "Lock state changed");
            Ok(())
        }
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown lock callback");
            Ok(())
        }
    }
}

/// Handle lists:* callbacks
pub async fn handle_lists_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let Some(group) = authorized_group(&bot, chat_id, user_id, &services, &i18n).await? else {
        return Ok(());
    };
    let lang = group.language_code.clone();

    match parts {
        ["add_word"] => {
            let context = ConversationContext::new(
                user_id,
                chat_id.0,
                DialogState::AwaitingFilteredWord { group_id: chat_id.0 },
            );
            state_storage.save_context(&context).await?;
            bot.send_message(chat_id, i18n.t("panel.ask_word", &lang, None)).await?;
            Ok(())
        }
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown lists callback");
            Ok(())
        }
    }
}

/// Handle set:* settings callbacks
pub async fn handle_settings_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let Some(group) = authorized_group(&bot, chat_id, user_id, &services, &i18n).await? else {
        return Ok(());
    };
    let lang = group.language_code.clone();

    match parts {
        ["toggle", flag] => {
            let flag = flag.to_string();
            let known = matches!(
                flag.as_str(),
                "group_locked" | "downloads" | "welcome" | "force" | "auto_lock"
            );
            if !known {
                warn!(group_id = chat_id.0, flag = %flag, "Unknown settings toggle ignored");
                return Ok(());
            }

            let updated = services
                .group_service
                .update_settings(chat_id.0, |s| match flag.as_str() {
                    "group_locked" => s.group_locked = !s.group_locked,
                    "downloads" => s.downloads_enabled = !s.downloads_enabled,
                    "welcome" => s.welcome_enabled = !s.welcome_enabled,
                    "force" => s.force_membership = !s.force_membership,
                    "auto_lock" => s.auto_lock_enabled = !s.auto_lock_enabled,
                    _ => {}
                })
                .await?;

            log_admin_action(user_id, "setting_toggled", Some(&flag), None);
            show_settings_menu(bot, chat_id, &updated, &i18n, &lang).await?;
            Ok(())
        }
        ["edit", field] => {
            let state = match *field {
                "welcome" => DialogState::AwaitingWelcomeText { group_id: chat_id.0 },
                "channels" => DialogState::AwaitingForceChannels { group_id: chat_id.0 },
                "warn_limit" => DialogState::AwaitingWarnLimit { group_id: chat_id.0 },
                "duration" => DialogState::AwaitingAutoLockDuration { group_id: chat_id.0 },
                _ => {
                    warn!(group_id = chat_id.0, field = %field, "Unknown settings edit ignored");
                    return Ok(());
                }
            };

            let prompt_key = match *field {
                "welcome" => "panel.ask_welcome",
                "channels" => "panel.ask_channels",
                "warn_limit" => "panel.ask_warn_limit",
                _ => "panel.ask_duration",
            };

            let context = ConversationContext::new(user_id, chat_id.0, state);
            state_storage.save_context(&context).await?;
            bot.send_message(chat_id, i18n.t(prompt_key, &lang, None)).await?;
            Ok(())
        }
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown settings callback");
            Ok(())
        }
    }
}

/// Handle glang:<code> group language callbacks
pub async fn handle_group_language_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    language_code: &str,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some(_group) = authorized_group(&bot, chat_id, user_id, &services, &i18n).await? else {
        return Ok(());
    };

    if !i18n.is_language_supported(language_code) {
        warn!(group_id = chat_id.0, language_code = %language_code, "Unsupported group language");
        return Ok(());
    }

    services.group_service.set_language(chat_id.0, language_code).await?;
    bot.send_message(chat_id, i18n.t("commands.language.updated", language_code, None)).await?;

    info!(group_id = chat_id.0, language_code = %language_code, "Group language updated");
    Ok(())
}
