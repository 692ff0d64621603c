//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod group;
pub mod broadcast;

// Re-export commonly used models
pub use user::{User, CreateUserRequest, UpdateUserRequest};
pub use group::{
    Group, GroupLocks, GroupLists, GroupSettings, LockKind,
    CreateGroupRequest, UpdateGroupRequest,
};
pub use broadcast::{BroadcastJob, BroadcastTarget, BroadcastStatus, CreateBroadcastRequest};
