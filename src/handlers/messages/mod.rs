//! Message handlers module
//!
//! Routes every non-command message. Dialog input takes precedence over
//! everything else; group messages then go through the moderation
//! evaluator; remaining messages with a media URL become download
//! requests.

use std::collections::HashMap;
use teloxide::{Bot, types::{Message, ChatId, InputFile}, prelude::*};
use tracing::{info, debug, warn};
use url::Url;

use crate::utils::errors::{Result, DownloadError};
use crate::utils::helpers::extract_first_url;
use crate::utils::logging::{log_moderation_action, log_download};
use crate::services::{ServiceFactory, WarnOutcome};
use crate::services::moderation::{MessageFacts, delete_reason};
use crate::state::{ConversationContext, DialogState, StateStorage};
use crate::i18n::I18n;
use crate::handlers::callbacks::broadcast::{show_confirmation, cancel_keyboard};

/// Where an incoming non-command message is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageRoute {
    /// An open dialog consumes the message before anything else
    Dialog,
    Private,
    Group,
}

fn route_message(has_open_dialog: bool, chat_is_private: bool) -> MessageRoute {
    if has_open_dialog {
        MessageRoute::Dialog
    } else if chat_is_private {
        MessageRoute::Private
    } else {
        MessageRoute::Group
    }
}

/// Parse a warn-limit reply; values outside 1..=10 are rejected
fn parse_warn_limit(input: &str) -> Option<i32> {
    input.trim().parse().ok().filter(|v| (1..=10).contains(v))
}

/// Parse an auto-lock duration reply in minutes; bounded to one day
fn parse_auto_lock_minutes(input: &str) -> Option<i64> {
    input.trim().parse().ok().filter(|v| (1..=1440).contains(v))
}

/// Handle an incoming non-command message
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id = user_id, chat_id = ?chat_id, "Processing message");

    let context = state_storage.load_context(chat_id.0, user_id).await?;

    match route_message(context.is_some(), chat_id.is_user()) {
        MessageRoute::Dialog => {
            let Some(context) = context else {
                return Ok(());
            };
            handle_dialog_message(bot, msg, context, services, state_storage, i18n).await
        }
        MessageRoute::Private => handle_private_message(bot, msg, services, i18n).await,
        MessageRoute::Group => handle_group_message(bot, msg, services, i18n).await,
    }
}

/// Handle a message while a dialog is open for its author
async fn handle_dialog_message(
    bot: Bot,
    msg: Message,
    mut context: ConversationContext,
    services: ServiceFactory,
    state_storage: StateStorage,
    i18n: I18n,
) -> Result<()> {
    let user_id = context.user_id;
    let chat_id = msg.chat.id;
    let lang = dialog_language(&context.state, user_id, &services).await?;

    let Some(text) = msg.text().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
        bot.send_message(chat_id, i18n.t("dialog.text_required", &lang, None)).await?;
        return Ok(());
    };

    match context.state.clone() {
        DialogState::AwaitingBroadcastMessage { target, scheduled } => {
            if scheduled {
                context.transition(DialogState::AwaitingBroadcastSchedule {
                    target,
                    message: text,
                });
                state_storage.save_context(&context).await?;
                bot.send_message(chat_id, i18n.t("broadcast.ask_schedule", &lang, None))
                    .reply_markup(cancel_keyboard(&i18n, &lang))
                    .await?;
            } else {
                context.transition(DialogState::AwaitingBroadcastConfirm {
                    target,
                    message: text.clone(),
                    scheduled_at: None,
                });
                state_storage.save_context(&context).await?;
                show_confirmation(bot, chat_id, &i18n, &lang, &text, None).await?;
            }
        }
        DialogState::AwaitingBroadcastSchedule { target, message } => {
            match crate::services::parse_schedule(&text, chrono::Utc::now()) {
                Ok(scheduled_at) => {
                    context.transition(DialogState::AwaitingBroadcastConfirm {
                        target,
                        message: message.clone(),
                        scheduled_at: Some(scheduled_at),
                    });
                    state_storage.save_context(&context).await?;
                    show_confirmation(bot, chat_id, &i18n, &lang, &message, Some(scheduled_at)).await?;
                }
                Err(e) => {
                    // Invalid input re-prompts; the dialog stays where it is.
                    debug!(user_id = user_id, input = %text, error = %e, "Schedule input rejected");
                    bot.send_message(chat_id, i18n.t("broadcast.invalid_schedule", &lang, None)).await?;
                }
            }
        }
        DialogState::AwaitingBroadcastConfirm { message, scheduled_at, .. } => {
            // Confirmation happens through the buttons; repeat the prompt.
            show_confirmation(bot, chat_id, &i18n, &lang, &message, scheduled_at).await?;
        }
        DialogState::AwaitingWelcomeText { group_id } => {
            services
                .group_service
                .update_settings(group_id, |s| s.welcome_message = text.clone())
                .await?;
            state_storage.delete_context(context.chat_id, user_id).await?;
            bot.send_message(chat_id, i18n.t("panel.welcome_updated", &lang, None)).await?;
        }
        DialogState::AwaitingForceChannels { group_id } => {
            let channels: Vec<String> = text
                .split([',', ' ', '\n'])
                .map(|c| c.trim().trim_start_matches('@'))
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect();

            services
                .group_service
                .update_settings(group_id, |s| s.force_channels = channels.clone())
                .await?;
            state_storage.delete_context(context.chat_id, user_id).await?;
            bot.send_message(chat_id, i18n.t("panel.channels_updated", &lang, None)).await?;
        }
        DialogState::AwaitingWarnLimit { group_id } => {
            match parse_warn_limit(&text) {
                Some(limit) => {
                    services
                        .group_service
                        .update_settings(group_id, |s| s.warn_limit = limit)
                        .await?;
                    state_storage.delete_context(context.chat_id, user_id).await?;
                    bot.send_message(chat_id, i18n.t("panel.warn_limit_updated", &lang, None)).await?;
                }
                None => {
                    bot.send_message(chat_id, i18n.t("panel.invalid_number", &lang, None)).await?;
                }
            }
        }
        DialogState::AwaitingAutoLockDuration { group_id } => {
            match parse_auto_lock_minutes(&text) {
                Some(minutes) => {
                    services
                        .group_service
                        .update_settings(group_id, |s| s.auto_lock_duration_minutes = minutes)
                        .await?;
                    state_storage.delete_context(context.chat_id, user_id).await?;
                    bot.send_message(chat_id, i18n.t("panel.duration_updated", &lang, None)).await?;
                }
                None => {
                    bot.send_message(chat_id, i18n.t("panel.invalid_number", &lang, None)).await?;
                }
            }
        }
        DialogState::AwaitingFilteredWord { group_id } => {
            let added = services.group_service.add_filtered_word(group_id, &text).await?;
            state_storage.delete_context(context.chat_id, user_id).await?;
            let key = if added { "panel.word_added" } else { "panel.word_exists" };
            bot.send_message(chat_id, i18n.t(key, &lang, None)).await?;
        }
    }

    Ok(())
}

/// Pick the reply language for a dialog step: group-scoped steps answer
/// in the group's language, broadcast steps in the admin's.
async fn dialog_language(
    state: &DialogState,
    user_id: i64,
    services: &ServiceFactory,
) -> Result<String> {
    let group_id = match state {
        DialogState::AwaitingWelcomeText { group_id }
        | DialogState::AwaitingForceChannels { group_id }
        | DialogState::AwaitingWarnLimit { group_id }
        | DialogState::AwaitingAutoLockDuration { group_id }
        | DialogState::AwaitingFilteredWord { group_id } => Some(*group_id),
        _ => None,
    };

    match group_id {
        Some(id) => Ok(services.group_service.get_group(id).await?.language_code),
        None => services.user_service.language_of(user_id).await,
    }
}

/// Handle a message inside a group: moderation first, then downloads
async fn handle_group_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    let group = services
        .group_service
        .ensure_group(chat_id.0, msg.chat.title().unwrap_or("group"))
        .await?;
    let lang = group.language_code.clone();

    let facts = MessageFacts::from_message(&msg);

    if let Some(reason) = delete_reason(&group.locks, &group.lists, &group.settings, user_id, &facts) {
        log_moderation_action(chat_id.0, user_id, reason);

        // Deletion is fire-and-forget; a failure never blocks the update loop.
        let delete_bot = bot.clone();
        let message_id = msg.id;
        tokio::spawn(async move {
            if let Err(e) = delete_bot.delete_message(chat_id, message_id).await {
                warn!(chat_id = chat_id.0, error = %e, "Failed to delete moderated message");
            }
        });

        if reason == "filtered_word" {
            match services.group_service.warn_user(chat_id.0, user_id).await? {
                WarnOutcome::Warned { count, limit } => {
                    let mut params = HashMap::new();
                    params.insert("count".to_string(), count.to_string());
                    params.insert("limit".to_string(), limit.to_string());
                    bot.send_message(chat_id, i18n.t("moderation.warned", &lang, Some(&params))).await?;
                }
                WarnOutcome::Muted => {
                    bot.send_message(chat_id, i18n.t("moderation.muted", &lang, None)).await?;
                }
            }
        }

        return Ok(());
    }

    // Download requests inside groups, when the group allows them.
    if group.settings.downloads_enabled {
        if let Some(url) = msg.text().and_then(extract_first_url) {
            if services.download_service.is_supported_platform(&url) {
                register_author(&services, &user, &i18n).await?;
                return handle_download(bot, chat_id, user_id, url, services, i18n, lang).await;
            }
        }
    }

    Ok(())
}

/// Handle a private message: any supported URL is a download request
async fn handle_private_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    register_author(&services, &user, &i18n).await?;
    let lang = services.user_service.language_of(user_id).await?;

    match msg.text().and_then(extract_first_url) {
        Some(url) => handle_download(bot, chat_id, user_id, url, services, i18n, lang).await,
        None => {
            bot.send_message(chat_id, i18n.t("download.send_link", &lang, None)).await?;
            Ok(())
        }
    }
}

async fn register_author(
    services: &ServiceFactory,
    user: &teloxide::types::User,
    i18n: &I18n,
) -> Result<()> {
    services
        .user_service
        .register_or_get_user(
            user.id.0 as i64,
            user.username.clone(),
            Some(user.first_name.clone()),
            Some(i18n.detect_user_language(user.language_code.as_deref())),
        )
        .await?;
    Ok(())
}

/// Run a download request end to end and deliver the result
async fn handle_download(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    url: Url,
    services: ServiceFactory,
    i18n: I18n,
    lang: String,
) -> Result<()> {
    info!(user_id = user_id, url = %url, "Download requested");

    let progress = bot
        .send_message(chat_id, i18n.t("download.progress", &lang, None))
        .await?;

    match services.download_service.download(&url).await {
        Ok(file) => {
            let send_result = bot
                .send_document(chat_id, InputFile::file(file.path.clone()))
                .await;
            services.download_service.cleanup_file(&file).await;

            let delivered = send_result.is_ok();
            services.user_service.record_download(user_id, delivered).await?;
            log_download(user_id, url.as_str(), delivered, Some(&file.file_name));

            let _ = bot.delete_message(chat_id, progress.id).await;
            send_result?;
        }
        Err(e) => {
            services.user_service.record_download(user_id, false).await?;
            log_download(user_id, url.as_str(), false, Some(&e.to_string()));

            let (key, params) = download_error_message(&e);
            let text = i18n.t(key, &lang, params.as_ref());
            let _ = bot.edit_message_text(chat_id, progress.id, text).await;
        }
    }

    Ok(())
}

/// Map a download failure to its user-facing translation key
fn download_error_message(error: &DownloadError) -> (&'static str, Option<crate::i18n::TranslationParams>) {
    match error {
        DownloadError::UnsupportedPlatform(_) => ("download.unsupported", None),
        DownloadError::TooLarge { limit_bytes } => {
            let mut params = HashMap::new();
            params.insert(
                "limit".to_string(),
                crate::utils::helpers::format_bytes(*limit_bytes),
            );
            ("download.too_large", Some(params))
        }
        DownloadError::Timeout => ("download.timeout", None),
        DownloadError::ExtractorFailed(_) => ("download.failed", None),
    }
}

/// Greet members joining a group when the welcome message is enabled
pub async fn handle_new_members(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
) -> Result<()> {
    let Some(members) = msg.new_chat_members() else {
        return Ok(());
    };

    let chat_id = msg.chat.id;
    let title = msg.chat.title().unwrap_or("group").to_string();

    let group = services.group_service.ensure_group(chat_id.0, &title).await?;
    if !group.settings.welcome_enabled {
        return Ok(());
    }

    for member in members.iter().filter(|m| !m.is_bot) {
        let text = group
            .settings
            .welcome_message
            .replace("{user}", &member.first_name)
            .replace("{group}", &title);
        bot.send_message(chat_id, text).await?;
        debug!(chat_id = chat_id.0, user_id = member.id.0, "Welcome message sent");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_dialog_consumes_url_bearing_text() {
        // The text would otherwise be picked up as a download request.
        let text = "https://youtube.com/watch?v=abc";
        assert!(extract_first_url(text).is_some());

        assert_eq!(route_message(true, true), MessageRoute::Dialog);
        assert_eq!(route_message(true, false), MessageRoute::Dialog);
    }

    #[test]
    fn without_a_dialog_routing_follows_the_chat_kind() {
        assert_eq!(route_message(false, true), MessageRoute::Private);
        assert_eq!(route_message(false, false), MessageRoute::Group);
    }

    #[test]
    fn warn_limit_is_bounded_to_one_through_ten() {
        assert_eq!(parse_warn_limit("1"), Some(1));
        assert_eq!(parse_warn_limit(" 10 "), Some(10));
        assert_eq!(parse_warn_limit("0"), None);
        assert_eq!(parse_warn_limit("11"), None);
        assert_eq!(parse_warn_limit("50"), None);
        assert_eq!(parse_warn_limit("-3"), None);
        assert_eq!(parse_warn_limit("three"), None);
    }

    #[test]
    fn auto_lock_duration_is_bounded_to_one_day() {
        assert_eq!(parse_auto_lock_minutes("1"), Some(1));
        assert_eq!(parse_auto_lock_minutes("1440"), Some(1440));
        assert_eq!(parse_auto_lock_minutes("0"), None);
        assert_eq!(parse_auto_lock_minutes("1441"), None);
        assert_eq!(parse_auto_lock_minutes("soon"), None);
    }
}
