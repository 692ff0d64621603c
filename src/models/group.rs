//! Group policy model
//!
//! A group's moderation policy is split into three sections that are
//! persisted as separate JSONB documents: content locks, membership
//! lists, and behavior settings. Each section is written independently
//! so updating one never clobbers another.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

/// Content lock categories that can be toggled per group.
///
/// Lock names arriving from callback data are resolved through
/// [`LockKind::from_name`]; an unknown name yields `None` and the
/// caller treats it as a failed toggle rather than a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockKind {
    Links,
    Hyperlinks,
    Hashtags,
    Usernames,
    Inline,
    Forwarded,
    Emoji,
    Games,
    Edit,
    MediaEdit,
    Videos,
    Photos,
    Files,
    Music,
    Stickers,
    Gifs,
    Location,
    Voice,
    VideoMsg,
    Polls,
}

impl LockKind {
    pub const ALL: [LockKind; 20] = [
        LockKind::Links,
        LockKind::Hyperlinks,
        LockKind::Hashtags,
        LockKind::Usernames,
        LockKind::Inline,
        LockKind::Forwarded,
        LockKind::Emoji,
        LockKind::Games,
        LockKind::Edit,
        LockKind::MediaEdit,
        LockKind::Videos,
        LockKind::Photos,
        LockKind::Files,
        LockKind::Music,
        LockKind::Stickers,
        LockKind::Gifs,
        LockKind::Location,
        LockKind::Voice,
        LockKind::VideoMsg,
        LockKind::Polls,
    ];

    /// Wire name used in callback data and stored policy documents
    pub fn name(&self) -> &'static str {
        match self {
            LockKind::Links => "links",
            LockKind::Hyperlinks => "hyperlinks",
            LockKind::Hashtags => "hashtags",
            LockKind::Usernames => "usernames",
            LockKind::Inline => "inline",
            LockKind::Forwarded => "forwarded",
            LockKind::Emoji => "emoji",
            LockKind::Games => "games",
            LockKind::Edit => "edit",
            LockKind::MediaEdit => "media_edit",
            LockKind::Videos => "videos",
            LockKind::Photos => "photos",
            LockKind::Files => "files",
            LockKind::Music => "music",
            LockKind::Stickers => "stickers",
            LockKind::Gifs => "gifs",
            LockKind::Location => "location",
            LockKind::Voice => "voice",
            LockKind::VideoMsg => "video_msg",
            LockKind::Polls => "polls",
        }
    }

    /// Resolve a lock name; unknown names are a failure signal, not a panic
    pub fn from_name(name: &str) -> Option<LockKind> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for LockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-group content lock flags. All flags default to unlocked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLocks {
    pub links: bool,
    pub hyperlinks: bool,
    pub hashtags: bool,
    pub usernames: bool,
    pub inline: bool,
    pub forwarded: bool,
    pub emoji: bool,
    pub games: bool,
    pub edit: bool,
    pub media_edit: bool,
    pub videos: bool,
    pub photos: bool,
    pub files: bool,
    pub music: bool,
    pub stickers: bool,
    pub gifs: bool,
    pub location: bool,
    pub voice: bool,
    pub video_msg: bool,
    pub polls: bool,
}

impl GroupLocks {
    pub fn get(&self, kind: LockKind) -> bool {
        match kind {
            LockKind::Links => self.links,
            LockKind::Hyperlinks => self.hyperlinks,
            LockKind::Hashtags => self.hashtags,
            LockKind::Usernames => self.usernames,
            LockKind::Inline => self.inline,
            LockKind::Forwarded => self.forwarded,
            LockKind::Emoji => self.emoji,
            LockKind::Games => self.games,
            LockKind::Edit => self.edit,
            LockKind::MediaEdit => self.media_edit,
            LockKind::Videos => self.videos,
            LockKind::Photos => self.photos,
            LockKind::Files => self.files,
            LockKind::Music => self.music,
            LockKind::Stickers => self.stickers,
            LockKind::Gifs => self.gifs,
            LockKind::Location => self.location,
            LockKind::Voice => self.voice,
            LockKind::VideoMsg => self.video_msg,
            LockKind::Polls => self.polls,
        }
    }

    pub fn set(&mut self, kind: LockKind, locked: bool) {
        match kind {
            LockKind::Links => self.links = locked,
            LockKind::Hyperlinks => self.hyperlinks = locked,
            LockKind::Hashtags => self.hashtags = locked,
            LockKind::Usernames => self.usernames = locked,
            LockKind::Inline => self.inline = locked,
            LockKind::Forwarded => self.forwarded = locked,
            LockKind::Emoji => self.emoji = locked,
            LockKind::Games => self.games = locked,
            LockKind::Edit => self.edit = locked,
            LockKind::MediaEdit => self.media_edit = locked,
            LockKind::Videos => self.videos = locked,
            LockKind::Photos => self.photos = locked,
            LockKind::Files => self.files = locked,
            LockKind::Music => self.music = locked,
            LockKind::Stickers => self.stickers = locked,
            LockKind::Gifs => self.gifs = locked,
            LockKind::Location => self.location = locked,
            LockKind::Voice => self.voice = locked,
            LockKind::VideoMsg => self.video_msg = locked,
            LockKind::Polls => self.polls = locked,
        }
    }

    /// Flip a lock flag and return the new state
    pub fn toggle(&mut self, kind: LockKind) -> bool {
        let new_state = !self.get(kind);
        self.set(kind, new_state);
        new_state
    }
}

/// Per-group membership lists and the word filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLists {
    pub admins: Vec<i64>,
    pub vips: Vec<i64>,
    pub muted: Vec<i64>,
    pub banned: Vec<i64>,
    pub filtered_words: Vec<String>,
    pub warnings: HashMap<i64, i32>,
}

impl GroupLists {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn is_vip(&self, user_id: i64) -> bool {
        self.vips.contains(&user_id)
    }

    pub fn is_muted(&self, user_id: i64) -> bool {
        self.muted.contains(&user_id)
    }

    pub fn is_banned(&self, user_id: i64) -> bool {
        self.banned.contains(&user_id)
    }

    /// Add a user id to a list; idempotent
    pub fn add_to(list: &mut Vec<i64>, user_id: i64) -> bool {
        if list.contains(&user_id) {
            false
        } else {
            list.push(user_id);
            true
        }
    }

    /// Remove a user id from a list; returns whether it was present
    pub fn remove_from(list: &mut Vec<i64>, user_id: i64) -> bool {
        let before = list.len();
        list.retain(|id| *id != user_id);
        list.len() != before
    }

    /// Add a filtered word, stored lowercase; idempotent
    pub fn add_filtered_word(&mut self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if word.is_empty() || self.filtered_words.contains(&word) {
            false
        } else {
            self.filtered_words.push(word);
            true
        }
    }

    pub fn remove_filtered_word(&mut self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        let before = self.filtered_words.len();
        self.filtered_words.retain(|w| *w != word);
        self.filtered_words.len() != before
    }

    pub fn warnings_of(&self, user_id: i64) -> i32 {
        self.warnings.get(&user_id).copied().unwrap_or(0)
    }

    /// Increment a user's warning count and return the new count
    pub fn add_warning(&mut self, user_id: i64) -> i32 {
        let count = self.warnings.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }

    pub fn clear_warnings(&mut self, user_id: i64) {
        self.warnings.remove(&user_id);
    }
}

/// Per-group behavior settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    pub group_locked: bool,
    pub downloads_enabled: bool,
    pub welcome_enabled: bool,
    pub welcome_message: String,
    pub warn_limit: i32,
    pub force_membership: bool,
    pub force_channels: Vec<String>,
    pub auto_lock_enabled: bool,
    pub auto_lock_duration_minutes: i64,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            group_locked: false,
            downloads_enabled: true,
            welcome_enabled: true,
            welcome_message: "Welcome {user} to {group}!".to_string(),
            warn_limit: 3,
            force_membership: false,
            force_channels: Vec::new(),
            auto_lock_enabled: false,
            auto_lock_duration_minutes: 60,
        }
    }
}

/// Persisted group policy record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub telegram_id: i64,
    pub title: String,
    pub language_code: String,
    pub locks: Json<GroupLocks>,
    pub lists: Json<GroupLists>,
    pub settings: Json<GroupSettings>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.lists.is_admin(user_id)
    }

    pub fn is_vip(&self, user_id: i64) -> bool {
        self.lists.is_vip(user_id)
    }

    pub fn is_muted(&self, user_id: i64) -> bool {
        self.lists.is_muted(user_id)
    }

    pub fn is_banned(&self, user_id: i64) -> bool {
        self.lists.is_banned(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub telegram_id: i64,
    pub title: String,
    pub language_code: Option<String>,
    pub settings: Option<GroupSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGroupRequest {
    pub title: Option<String>,
    pub language_code: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_name_round_trip() {
        for kind in LockKind::ALL {
            assert_eq!(LockKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_lock_name() {
        assert_eq!(LockKind::from_name("selfies"), None);
        assert_eq!(LockKind::from_name(""), None);
    }

    #[test]
    fn test_lock_set_idempotent() {
        let mut locks = GroupLocks::default();
        assert!(!locks.get(LockKind::Stickers));

        locks.set(LockKind::Stickers, true);
        locks.set(LockKind::Stickers, true);
        assert!(locks.get(LockKind::Stickers));

        locks.set(LockKind::Stickers, false);
        locks.set(LockKind::Stickers, false);
        assert!(!locks.get(LockKind::Stickers));
    }

    #[test]
    fn test_lock_toggle() {
        let mut locks = GroupLocks::default();
        assert!(locks.toggle(LockKind::Links));
        assert!(!locks.toggle(LockKind::Links));
    }

    #[test]
    fn test_list_membership() {
        let mut lists = GroupLists::default();
        assert!(GroupLists::add_to(&mut lists.vips, 42));
        assert!(!GroupLists::add_to(&mut lists.vips, 42));
        assert!(lists.is_vip(42));

        assert!(GroupLists::remove_from(&mut lists.vips, 42));
        assert!(!GroupLists::remove_from(&mut lists.vips, 42));
        assert!(!lists.is_vip(42));
    }

    #[test]
    fn test_filtered_words_stored_lowercase() {
        let mut lists = GroupLists::default();
        assert!(lists.add_filtered_word("  SpAm  "));
        assert!(!lists.add_filtered_word("spam"));
        assert_eq!(lists.filtered_words, vec!["spam".to_string()]);
    }

    #[test]
    fn test_warnings() {
        let mut lists = GroupLists::default();
        assert_eq!(lists.warnings_of(7), 0);
        assert_eq!(lists.add_warning(7), 1);
        assert_eq!(lists.add_warning(7), 2);
        lists.clear_warnings(7);
        assert_eq!(lists.warnings_of(7), 0);
    }

    #[test]
    fn test_locks_deserialize_with_missing_fields() {
        let locks: GroupLocks = serde_json::from_str(r#"{"links": true}"#).unwrap();
        assert!(locks.links);
        assert!(!locks.polls);
    }
}
