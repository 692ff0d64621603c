//! Command handlers module
//!
//! This module contains handlers for all bot commands like /start, /help, etc.

pub mod start;
pub mod help;
pub mod admin;
pub mod panel;
pub mod lists;

use teloxide::{Bot, types::Message, utils::command::BotCommands};
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::i18n::I18n;

/// All available bot commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "DownMate commands:")]
pub enum Command {
    #[command(description = "Start the bot and show the main menu")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Set language preference")]
    Language,
    #[command(description = "Authenticate as admin")]
    Admin(String),
    #[command(description = "Show bot statistics (admin only)")]
    Stats,
    #[command(description = "Open the group moderation panel")]
    Panel,
    #[command(description = "Add the replied-to user to the VIP list")]
    Vip,
    #[command(description = "Mute the replied-to user")]
    Mute,
    #[command(description = "Ban the replied-to user")]
    Ban,
    #[command(description = "Clear the replied-to user from the VIP/mute/ban lists")]
    Pardon,
    #[command(description = "Remove a word from the word filter")]
    Unfilter(String),
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: ServiceFactory,
    i18n: I18n,
) -> Result<()> {
    match cmd {
        Command::Start => start::handle_start(bot, msg, services, i18n).await,
        Command::Help => help::handle_help(bot, msg, services, i18n).await,
        Command::Language => start::handle_language(bot, msg, services, i18n).await,
        Command::Admin(password) => admin::handle_admin(bot, msg, password, services, i18n).await,
        Command::Stats => admin::handle_stats(bot, msg, services, i18n).await,
        Command::Panel => panel::handle_panel(bot, msg, services, i18n).await,
        Command::Vip => lists::handle_list_command(bot, msg, lists::ListAction::Vip, services, i18n).await,
        Command::Mute => lists::handle_list_command(bot, msg, lists::ListAction::Mute, services, i18n).await,
        Command::Ban => lists::handle_list_command(bot, msg, lists::ListAction::Ban, services, i18n).await,
        Command::Pardon => lists::handle_list_command(bot, msg, lists::ListAction::Pardon, services, i18n).await,
        Command::Unfilter(word) => lists::handle_unfilter(bot, msg, word, services, i18n).await,
    }
}
