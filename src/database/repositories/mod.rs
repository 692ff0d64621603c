//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod group;
pub mod broadcast;

// Re-export repositories
pub use user::UserRepository;
pub use group::GroupRepository;
pub use broadcast::BroadcastRepository;
