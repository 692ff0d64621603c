//! Services module
//!
//! This module contains business logic services

pub mod broadcast;
pub mod downloader;
pub mod group;
pub mod moderation;
pub mod user;

// Re-export commonly used services
pub use broadcast::{BroadcastService, MessageSink, DispatchOutcome, ScheduleError, parse_schedule};
pub use downloader::{DownloadService, DownloadedFile};
pub use group::{GroupService, WarnOutcome};
pub use moderation::{MessageFacts, UserRole, role_of, should_delete, delete_reason};
pub use user::UserService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub group_service: GroupService,
    pub broadcast_service: BroadcastService,
    pub download_service: DownloadService,
    pub database: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, database: DatabaseService) -> Result<Self> {
        let user_service = UserService::new(database.users.clone(), settings.clone());
        let group_service = GroupService::new(database.clone(), settings.clone());
        let broadcast_service =
            BroadcastService::new(database.clone(), settings.broadcast.max_in_flight);
        let download_service = DownloadService::new(settings.download.clone());

        Ok(Self {
            user_service,
            group_service,
            broadcast_service,
            download_service,
            database,
        })
    }
}
