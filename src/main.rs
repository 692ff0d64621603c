//! DownMate Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use tracing::{info, warn, error};

use DownMate::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, create_pool, run_migrations},
    services::ServiceFactory,
    state::StateStorage,
    i18n::I18n,
    handlers::{
        commands::{Command, handle_command},
        callbacks::handle_callback_query,
        messages::{handle_message, handle_new_members},
    },
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the rolling file writer alive.
    let _logging_guard = logging::init_logging(&settings.logging)?;

    info!("Starting DownMate Telegram Bot...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&settings.database).await?;
    run_migrations(&db_pool).await?;

    // Initialize database service
    let database_service = DatabaseService::new(db_pool);

    // Initialize i18n system
    info!("Loading translations...");
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;

    // Initialize dialog state storage
    info!("Connecting to Redis...");
    let state_storage = StateStorage::new(settings.redis.clone()).await?;
    state_storage.test_connection().await?;

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(settings.clone(), database_service)?;

    let services_arc = Arc::new(services);
    let state_storage_arc = Arc::new(state_storage);
    let i18n_arc = Arc::new(i18n);

    let handler = create_handler();

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![services_arc, state_storage_arc, i18n_arc])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("DownMate bot is ready!");

    dispatcher.dispatch().await;

    info!("DownMate bot has been shut down.");

    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_commands),
                )
                .branch(
                    dptree::filter(|msg: Message| msg.new_chat_members().is_some())
                        .endpoint(handle_member_joins),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: Arc<ServiceFactory>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let services = (*services).clone();
    let chat_id = msg.chat.id;

    if let Err(e) = handle_command(bot.clone(), msg, cmd, services, (*i18n).clone()).await {
        error!(error = %e, "Error handling command");
        notify_failure(&bot, chat_id, &i18n).await;
        return Err(e.into());
    }

    Ok(())
}

/// Best-effort generic failure notice; its own failure is only logged.
async fn notify_failure(bot: &Bot, chat_id: teloxide::types::ChatId, i18n: &I18n) {
    let text = i18n.t("errors.generic", i18n.default_language(), None);
    if let Err(e) = bot.send_message(chat_id, text).await {
        warn!(chat_id = chat_id.0, error = %e, "Failed to send failure notice");
    }
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();
    let chat_id = msg.chat.id;

    if let Err(e) = handle_message(bot.clone(), msg, services, state_storage, (*i18n).clone()).await {
        error!(error = %e, "Error handling message");
        notify_failure(&bot, chat_id, &i18n).await;
        return Err(e.into());
    }

    Ok(())
}

/// Handle new chat members joining a group
async fn handle_member_joins(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    if let Err(e) = handle_new_members(bot, msg, services).await {
        error!(error = %e, "Error handling new chat member");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    i18n: Arc<I18n>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();
    let chat_id = query.message.as_ref().map(|m| m.chat().id);

    if let Err(e) = handle_callback_query(bot.clone(), query, services, state_storage, (*i18n).clone()).await {
        error!(error = %e, "Error handling callback query");
        if let Some(chat_id) = chat_id {
            notify_failure(&bot, chat_id, &i18n).await;
        }
        return Err(e.into());
    }

    Ok(())
}
