//! Broadcast composition callbacks
//!
//! Drives the admin broadcast dialog: target selection, immediate or
//! scheduled delivery, message input (collected by the message handler),
//! and final confirmation. Draft data travels in the dialog context.

use std::collections::HashMap;
use teloxide::{Bot, types::{ChatId, InlineKeyboardMarkup, InlineKeyboardButton}, prelude::*};
use tracing::{info, warn};

use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use crate::models::broadcast::{BroadcastTarget, CreateBroadcastRequest};
use crate::services::ServiceFactory;
use crate::state::{ConversationContext, DialogState, StateStorage};
use crate::i18n::I18n;

/// Show the broadcast target selection menu
pub async fn show_target_menu(bot: Bot, chat_id: ChatId, i18n: &I18n, lang: &str) -> Result<()> {
    let text = i18n.t("broadcast.choose_target", lang, None);

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.broadcast.users", lang, None),
            "bcast:target:users",
        )],
        vec![InlineKeyboardButton::callback(
            i18n.t("buttons.broadcast.users_and_groups", lang, None),
            "bcast:target:users_and_groups",
        )],
    ]);

    bot.send_message(chat_id, text).reply_markup(keyboard).await?;
    Ok(())
}

/// Show the pending broadcast list with delete buttons
pub async fn show_pending(
    bot: Bot,
    chat_id: ChatId,
    services: &ServiceFactory,
    i18n: &I18n,
    lang: &str,
) -> Result<()> {
    let jobs = services.broadcast_service.list_pending().await?;

    if jobs.is_empty() {
        bot.send_message(chat_id, i18n.t("broadcast.pending_empty", lang, None)).await?;
        return Ok(());
    }

    let mut lines = vec![i18n.t("broadcast.pending_title", lang, None)];
    let mut rows = Vec::new();

    for job in &jobs {
        let when = job
            .scheduled_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "• [{}] {} — {}",
            when,
            job.target.name(),
            crate::utils::helpers::truncate_text(&job.message, 40)
        ));
        rows.push(vec![InlineKeyboardButton::callback(
            format!("🗑 {}", crate::utils::helpers::truncate_text(&job.message, 20)),
            format!("bcast:delete:{}", job.id),
        )]);
    }

    bot.send_message(chat_id, lines.join("\n"))
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Handle bcast:* callbacks
pub async fn handle_broadcast_callback(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    parts: &[&str],
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let lang = services.user_service.language_of(user_id).await?;

    if !services.user_service.is_admin(user_id).await? {
        bot.send_message(chat_id, i18n.t("commands.admin.access_denied", &lang, None)).await?;
        return Ok(());
    }

    match parts {
        ["target", target_name] => {
            let Some(target) = BroadcastTarget::from_name(target_name) else {
                warn!(user_id = user_id, target = %target_name, "Unknown broadcast target");
                return Ok(());
            };

            let text = i18n.t("broadcast.choose_when", &lang, None);
            let keyboard = InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback(
                    i18n.t("buttons.broadcast.now", &lang, None),
                    format!("bcast:when:now:{}", target.name()),
                ),
                InlineKeyboardButton::callback(
                    i18n.t("buttons.broadcast.later", &lang, None),
                    format!("bcast:when:later:{}", target.name()),
                ),
            ]]);
            bot.send_message(chat_id, text).reply_markup(keyboard).await?;
        }
        ["when", when, target_name] => {
            let Some(target) = BroadcastTarget::from_name(target_name) else {
                warn!(user_id = user_id, target = %target_name, "Unknown broadcast target");
                return Ok(());
            };
            let scheduled = *when == "later";

            let context = ConversationContext::new(
                user_id,
                chat_id.0,
                DialogState::AwaitingBroadcastMessage { target, scheduled },
            );
            state_storage.save_context(&context).await?;

            bot.send_message(chat_id, i18n.t("broadcast.ask_message", &lang, None))
                .reply_markup(cancel_keyboard(&i18n, &lang))
                .await?;
        }
        ["confirm"] => {
            let Some(context) = state_storage.load_context(chat_id.0, user_id).await? else {
                bot.send_message(chat_id, i18n.t("broadcast.nothing_to_confirm", &lang, None)).await?;
                return Ok(());
            };

            let DialogState::AwaitingBroadcastConfirm { target, message, scheduled_at } = context.state else {
                warn!(user_id = user_id, state = context.state.name(), "Confirm outside broadcast dialog");
                return Ok(());
            };

            state_storage.delete_context(chat_id.0, user_id).await?;

            let job = services
                .broadcast_service
                .create_job(CreateBroadcastRequest {
                    message,
                    target,
                    scheduled_at,
                    created_by: user_id,
                })
                .await?;

            log_admin_action(user_id, "broadcast_created", Some(&job.id), None);

            if scheduled_at.is_some() {
                bot.send_message(chat_id, i18n.t("broadcast.scheduled", &lang, None)).await?;
            } else {
                let outcome = services.broadcast_service.dispatch(&bot, &job).await?;

                let mut params = HashMap::new();
                params.insert("recipients".to_string(), outcome.recipients.to_string());
                params.insert("sent".to_string(), outcome.sent.to_string());
                params.insert("failed".to_string(), outcome.failed.to_string());
                bot.send_message(chat_id, i18n.t("broadcast.result", &lang, Some(&params))).await?;
            }
        }
        ["cancel"] => {
            state_storage.delete_context(chat_id.0, user_id).await?;
            bot.send_message(chat_id, i18n.t("broadcast.cancelled", &lang, None)).await?;
            info!(user_id = user_id, "Broadcast dialog cancelled");
        }
        ["delete", job_id] => {
            let deleted = services.broadcast_service.delete_job(job_id).await?;
            let key = if deleted { "broadcast.deleted" } else { "broadcast.delete_missing" };
            bot.send_message(chat_id, i18n.t(key, &lang, None)).await?;
            if deleted {
                log_admin_action(user_id, "broadcast_deleted", Some(job_id), None);
            }
        }
        _ => {
            warn!(user_id = user_id, parts = ?parts, "Unknown broadcast callback");
        }
    }

    Ok(())
}

/// Cancel is reachable from every step of the broadcast dialog.
pub fn cancel_keyboard(i18n: &I18n, lang: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        i18n.t("buttons.broadcast.cancel", lang, None),
        "bcast:cancel",
    )]])
}

/// Send the confirmation prompt for a drafted broadcast
pub async fn show_confirmation(
    bot: Bot,
    chat_id: ChatId,
    i18n: &I18n,
    lang: &str,
    message: &str,
    scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<()> {
    let mut params = HashMap::new();
    params.insert("message".to_string(), message.to_string());
    params.insert(
        "when".to_string(),
        scheduled_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| i18n.t("broadcast.when_now", lang, None)),
    );

    let text = i18n.t("broadcast.confirm_prompt", lang, Some(&params));
    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(i18n.t("buttons.broadcast.confirm", lang, None), "bcast:confirm"),
        InlineKeyboardButton::callback(i18n.t("buttons.broadcast.cancel", lang, None), "bcast:cancel"),
    ]]);

    bot.send_message(chat_id, text).reply_markup(keyboard).await?;
    Ok(())
}
