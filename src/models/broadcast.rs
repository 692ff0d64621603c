//! Broadcast job model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Which audience a broadcast is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BroadcastTarget {
    Users,
    UsersAndGroups,
}

impl BroadcastTarget {
    pub fn name(&self) -> &'static str {
        match self {
            BroadcastTarget::Users => "users",
            BroadcastTarget::UsersAndGroups => "users_and_groups",
        }
    }

    pub fn from_name(name: &str) -> Option<BroadcastTarget> {
        match name {
            "users" => Some(BroadcastTarget::Users),
            "users_and_groups" => Some(BroadcastTarget::UsersAndGroups),
            _ => None,
        }
    }
}

/// Job status written at creation time. Dispatch outcomes are logged and
/// reported to the invoking admin but not written back to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BroadcastStatus {
    Pending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BroadcastJob {
    pub id: String,
    pub message: String,
    pub target: BroadcastTarget,
    pub status: BroadcastStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBroadcastRequest {
    pub message: String,
    pub target: BroadcastTarget,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_by: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_name_round_trip() {
        for target in [BroadcastTarget::Users, BroadcastTarget::UsersAndGroups] {
            assert_eq!(BroadcastTarget::from_name(target.name()), Some(target));
        }
        assert_eq!(BroadcastTarget::from_name("everyone"), None);
    }
}
