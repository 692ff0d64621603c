//! Help command handler

use teloxide::{Bot, types::Message, prelude::*};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::i18n::I18n;

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message, services: ServiceFactory, i18n: I18n) -> Result<()> {
    let lang = match msg.from.as_ref() {
        Some(user) => services.user_service.language_of(user.id.0 as i64).await?,
        None => i18n.default_language().to_string(),
    };

    let help_text = i18n.t("commands.help.text", &lang, None);
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}
