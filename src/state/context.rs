//! Dialog context management
//!
//! Multi-step admin dialogs (broadcast composition, group settings input)
//! are modeled as a closed state enum carried in a per-conversation
//! context. Contexts are keyed by chat and user so a group settings
//! dialog never collides with a private broadcast dialog.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Duration};

use crate::models::broadcast::BroadcastTarget;

/// The step a dialog is waiting on, with the draft data gathered so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DialogState {
    AwaitingBroadcastMessage {
        target: BroadcastTarget,
        scheduled: bool,
    },
    AwaitingBroadcastSchedule {
        target: BroadcastTarget,
        message: String,
    },
    AwaitingBroadcastConfirm {
        target: BroadcastTarget,
        message: String,
        scheduled_at: Option<DateTime<Utc>>,
    },
    AwaitingWelcomeText {
        group_id: i64,
    },
    AwaitingForceChannels {
        group_id: i64,
    },
    AwaitingWarnLimit {
        group_id: i64,
    },
    AwaitingAutoLockDuration {
        group_id: i64,
    },
    AwaitingFilteredWord {
        group_id: i64,
    },
}

impl DialogState {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::AwaitingBroadcastMessage { .. } => "awaiting_broadcast_message",
            DialogState::AwaitingBroadcastSchedule { .. } => "awaiting_broadcast_schedule",
            DialogState::AwaitingBroadcastConfirm { .. } => "awaiting_broadcast_confirm",
            DialogState::AwaitingWelcomeText { .. } => "awaiting_welcome_text",
            DialogState::AwaitingForceChannels { .. } => "awaiting_force_channels",
            DialogState::AwaitingWarnLimit { .. } => "awaiting_warn_limit",
            DialogState::AwaitingAutoLockDuration { .. } => "awaiting_auto_lock_duration",
            DialogState::AwaitingFilteredWord { .. } => "awaiting_filtered_word",
        }
    }
}

/// A live dialog for one user in one chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    /// User the dialog belongs to
    pub user_id: i64,
    /// Chat the dialog runs in (the group for group-scoped dialogs)
    pub chat_id: i64,
    /// Current dialog step and draft data
    pub state: DialogState,
    /// When this context expires (for cleanup)
    pub expires_at: Option<DateTime<Utc>>,
    /// When this context was last updated
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create a new dialog context with the default 24h expiry
    pub fn new(user_id: i64, chat_id: i64, state: DialogState) -> Self {
        Self {
            user_id,
            chat_id,
            state,
            expires_at: Some(Utc::now() + Duration::hours(24)),
            updated_at: Utc::now(),
        }
    }

    /// Move the dialog to a new step
    pub fn transition(&mut self, state: DialogState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    /// Check if context has expired
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }

    /// Set custom expiry time
    pub fn set_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_expiry() {
        let context = ConversationContext::new(
            123,
            123,
            DialogState::AwaitingBroadcastMessage {
                target: BroadcastTarget::Users,
                scheduled: false,
            },
        );
        assert_eq!(context.user_id, 123);
        assert!(context.expires_at.is_some());
        assert!(!context.is_expired());
    }

    #[test]
    fn test_expiry() {
        let mut context = ConversationContext::new(
            123,
            123,
            DialogState::AwaitingWelcomeText { group_id: -100 },
        );

        context.set_expiry(Utc::now() - Duration::hours(1));
        assert!(context.is_expired());

        context.set_expiry(Utc::now() + Duration::hours(1));
        assert!(!context.is_expired());
    }

    #[test]
    fn test_transition_updates_timestamp() {
        let mut context = ConversationContext::new(
            1,
            1,
            DialogState::AwaitingBroadcastMessage {
                target: BroadcastTarget::Users,
                scheduled: true,
            },
        );
        let before = context.updated_at;

        context.transition(DialogState::AwaitingBroadcastSchedule {
            target: BroadcastTarget::Users,
            message: "hi".to_string(),
        });

        assert!(context.updated_at >= before);
        assert_eq!(context.state.name(), "awaiting_broadcast_schedule");
    }

    #[test]
    fn test_state_serde_round_trip() {
        let state = DialogState::AwaitingBroadcastConfirm {
            target: BroadcastTarget::UsersAndGroups,
            message: "release notes".to_string(),
            scheduled_at: None,
        };

        let json = serde_json::to_string(&state).unwrap();
        let restored: DialogState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
