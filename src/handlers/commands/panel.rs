//! Group panel command handler
//!
//! /panel opens the in-group moderation panel for Telegram chat
//! administrators. Opening the panel also records the invoker on the
//! group's policy admin list so later messages from them bypass
//! moderation.

use teloxide::{Bot, types::Message, prelude::*};
use teloxide::types::UserId;
use tracing::{info, debug};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::handlers::callbacks::group_panel::show_panel_main;
use crate::i18n::I18n;

/// Handle /panel command in a group chat
pub async fn handle_panel(
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

    if chat_id.is_user() {
        let lang = services.user_service.language_of(user_id).await?;
        bot.send_message(chat_id, i18n.t("panel.groups_only", &lang, None)).await?;
        return Ok(());
    }

    debug!(user_id = user_id, chat_id = ?chat_id, "Processing /panel command");

    let group = services
        .group_service
        .ensure_group(chat_id.0, msg.chat.title().unwrap_or("group"))
        .await?;
    let lang = group.language_code.clone();

    let member = bot.get_chat_member(chat_id, UserId(user_id as u64)).await?;
    if !member.is_privileged() {
        bot.send_message(chat_id, i18n.t("panel.admins_only", &lang, None)).await?;
        return Ok(());
    }

    // Chat admins who open the panel become policy admins too.
    services.group_service.grant_admin(chat_id.0, user_id).await?;

    show_panel_main(bot, chat_id, &i18n, &lang).await?;
    info!(user_id = user_id, group_id = chat_id.0, "Group panel opened");
    Ok(())
}
