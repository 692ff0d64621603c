//! State management module
//!
//! This module handles dialog state and conversation context

pub mod context;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, DialogState};
pub use storage::StateStorage;
