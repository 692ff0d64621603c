//! Reply-based list management commands
//!
//! Group admins manage the VIP, mute, and ban lists by replying to a
//! message from the target user with /vip, /mute, /ban, or /pardon.
//! /unfilter removes a word from the word filter.

use std::collections::HashMap;
use teloxide::{Bot, types::Message, prelude::*};
use tracing::info;
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use crate::services::ServiceFactory;
use crate::i18n::I18n;

/// Which list a reply-based command touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Vip,
    Mute,
    Ban,
    Pardon,
}

impl ListAction {
    fn name(&self) -> &'static str {
        match self {
            ListAction::Vip => "vip",
            ListAction::Mute => "mute",
            ListAction::Ban => "ban",
            ListAction::Pardon => "pardon",
        }
    }
}

/// Apply a list action to the author of the replied-to message
pub async fn handle_list_command(
    bot: Bot,
    msg: Message,
    action: ListAction,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some((group, lang, invoker_id)) = group_admin_context(&bot, &msg, &services, &i18n).await? else {
        return Ok(());
    };

    let chat_id = msg.chat.id;

    let Some(target) = msg.reply_to_message().and_then(|reply| reply.from.clone()) else {
        bot.send_message(chat_id, i18n.t("lists.reply_required", &lang, None)).await?;
        return Ok(());
    };
    let target_id = target.id.0 as i64;

    // Policy admins cannot be list-managed through replies.
    if group.lists.is_admin(target_id) {
        bot.send_message(chat_id, i18n.t("lists.target_is_admin", &lang, None)).await?;
        return Ok(());
    }

    match action {
        ListAction::Vip => {
            services.group_service.set_vip(chat_id.0, target_id, true).await?;
        }
        ListAction::Mute => {
            services.group_service.set_muted(chat_id.0, target_id, true).await?;
        }
        ListAction::Ban => {
            services.group_service.set_banned(chat_id.0, target_id, true).await?;
        }
        ListAction::Pardon => {
            services.group_service.set_vip(chat_id.0, target_id, false).await?;
            services.group_service.set_muted(chat_id.0, target_id, false).await?;
            services.group_service.set_banned(chat_id.0, target_id, false).await?;
        }
    }

    let mut params = HashMap::new();
    params.insert("user".to_string(), target.first_name.clone());
    let key = match action {
        ListAction::Vip => "lists.vip_added",
        ListAction::Mute => "lists.muted",
        ListAction::Ban => "lists.banned",
        ListAction::Pardon => "lists.pardoned",
    };
    bot.send_message(chat_id, i18n.t(key, &lang, Some(&params))).await?;

    log_admin_action(invoker_id, action.name(), Some(&target_id.to_string()), None);
    info!(group_id = chat_id.0, target_id = target_id, action = action.name(), "List updated");
    Ok(())
}

/// Remove a word from the group's word filter
pub async fn handle_unfilter(
    bot: Bot,
    msg: Message,
    word: String,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    let Some((_, lang, invoker_id)) = group_admin_context(&bot, &msg, &services, &i18n).await? else {
        return Ok(());
    };

    let chat_id = msg.chat.id;
    let word = word.trim();

    if word.is_empty() {
        bot.send_message(chat_id, i18n.t("lists.unfilter_usage", &lang, None)).await?;
        return Ok(());
    }

    let removed = services.group_service.remove_filtered_word(chat_id.0, word).await?;
    let key = if removed { "panel.word_removed" } else { "panel.word_not_found" };
    bot.send_message(chat_id, i18n.t(key, &lang, None)).await?;

    if removed {
        log_admin_action(invoker_id, "word_unfiltered", Some(word), None);
    }
    Ok(())
}

/// Resolve the group and reply language, rejecting non-group chats and
/// non-admin invokers.
async fn group_admin_context(
    bot: &Bot,
    msg: &Message,
    services: &ServiceFactory,
    i18n: &I18n,
) -> Result<Option<(crate::models::group::Group, String, i64)>> {
    let Some(user) = msg.from.clone() else {
        return Ok(None);
    };
    let invoker_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    if chat_id.is_user() {
        let lang = services.user_service.language_of(invoker_id).await?;
        bot.send_message(chat_id, i18n.t("panel.groups_only", &lang, None)).await?;
        return Ok(None);
    }

    let group = services
        .group_service
        .ensure_group(chat_id.0, msg.chat.title().unwrap_or("group"))
        .await?;
    let lang = group.language_code.clone();

    if !group.lists.is_admin(invoker_id) {
        bot.send_message(chat_id, i18n.t("panel.admins_only", &lang, None)).await?;
        return Ok(None);
    }

    Ok(Some((group, lang, invoker_id)))
}
