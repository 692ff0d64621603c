//! Dialog state storage implementation
//!
//! This module persists dialog contexts in Redis, including
//! serialization, expiration, and cleanup. The storage is injected into
//! handlers; nothing holds dialog state in process memory.

use redis::AsyncCommands;
use tracing::{debug, warn, error};
use crate::utils::errors::Result;
use crate::config::RedisConfig;
use super::context::ConversationContext;

/// Redis-based dialog state storage
#[derive(Clone)]
pub struct StateStorage {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
}

impl StateStorage {
    /// Create a new state storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Save a dialog context
    pub async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        let key = self.dialog_key(context.chat_id, context.user_id);
        debug!(user_id = context.user_id, chat_id = context.chat_id,
               state = context.state.name(), "Saving dialog context");

        let serialized = serde_json::to_string(context)?;

        let ttl_seconds = if let Some(expires_at) = context.expires_at {
            let duration = expires_at - chrono::Utc::now();
            std::cmp::max(duration.num_seconds(), 60) as u64 // Minimum 60 seconds
        } else {
            self.config.ttl_seconds
        };

        let mut conn = self.connection_manager.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            error!(user_id = context.user_id, error = %e, "Failed to save dialog context");
            return Err(e.into());
        }

        Ok(())
    }

    /// Load the dialog context for a user in a chat
    pub async fn load_context(&self, chat_id: i64, user_id: i64) -> Result<Option<ConversationContext>> {
        let key = self.dialog_key(chat_id, user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;

        match serialized {
            Some(data) => {
                let context: ConversationContext = serde_json::from_str(&data)?;

                if context.is_expired() {
                    warn!(user_id = user_id, chat_id = chat_id, "Dialog context expired, removing");
                    self.delete_context(chat_id, user_id).await?;
                    return Ok(None);
                }

                debug!(user_id = user_id, chat_id = chat_id,
                       state = context.state.name(), "Dialog context loaded");
                Ok(Some(context))
            }
            None => Ok(None),
        }
    }

    /// Delete the dialog context for a user in a chat
    pub async fn delete_context(&self, chat_id: i64, user_id: i64) -> Result<()> {
        let key = self.dialog_key(chat_id, user_id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(user_id = user_id, chat_id = chat_id, deleted = deleted > 0, "Dialog context delete");

        Ok(())
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Redis key for a dialog context
    fn dialog_key(&self, chat_id: i64, user_id: i64) -> String {
        format!("{}dialog:{}:{}", self.config.prefix, chat_id, user_id)
    }
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
