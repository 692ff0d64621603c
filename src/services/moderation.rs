//! Group moderation evaluator
//!
//! Pure decision logic over a group policy snapshot and the observable
//! facts of a message. The evaluation order is fixed, first match wins:
//! group lock, admin/VIP exemption, ban/mute, content-category locks,
//! word filter. Actual message deletion happens at the handler layer and
//! is fire-and-forget.

use teloxide::types::{Message, MessageEntityKind};
use crate::models::group::{GroupLocks, GroupLists, GroupSettings, LockKind};

/// Resolved role of an actor within a group policy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Vip,
    Muted,
    Banned,
    Member,
}

/// Resolve the single role of an actor. Admin wins over Vip, which wins
/// over Muted and Banned. The evaluator consults the list predicates
/// directly rather than this collapsed role.
pub fn role_of(lists: &GroupLists, user_id: i64) -> UserRole {
    if lists.is_admin(user_id) {
        UserRole::Admin
    } else if lists.is_vip(user_id) {
        UserRole::Vip
    } else if lists.is_banned(user_id) {
        UserRole::Banned
    } else if lists.is_muted(user_id) {
        UserRole::Muted
    } else {
        UserRole::Member
    }
}

/// Observable facts about a message, decoupled from the transport type
/// so the evaluator can be tested without constructing Telegram updates.
#[derive(Debug, Clone, Default)]
pub struct MessageFacts {
    pub has_url: bool,
    pub has_text_link: bool,
    pub has_hashtag: bool,
    pub has_mention: bool,
    pub has_custom_emoji: bool,
    pub via_inline_bot: bool,
    pub is_forwarded: bool,
    pub is_edited: bool,
    pub has_photo: bool,
    pub has_video: bool,
    pub has_audio: bool,
    pub has_document: bool,
    pub has_sticker: bool,
    pub has_animation: bool,
    pub has_game: bool,
    pub has_location: bool,
    pub has_voice: bool,
    pub has_video_note: bool,
    pub has_poll: bool,
    pub text: Option<String>,
}

impl MessageFacts {
    /// Extract facts from an incoming Telegram message
    pub fn from_message(msg: &Message) -> Self {
        let mut facts = MessageFacts {
            via_inline_bot: msg.via_bot.is_some(),
            is_forwarded: msg.forward_origin().is_some(),
            is_edited: msg.edit_date().is_some(),
            has_photo: msg.photo().is_some(),
            has_video: msg.video().is_some(),
            has_audio: msg.audio().is_some(),
            has_document: msg.document().is_some(),
            has_sticker: msg.sticker().is_some(),
            has_animation: msg.animation().is_some(),
            has_game: msg.game().is_some(),
            has_location: msg.location().is_some(),
            has_voice: msg.voice().is_some(),
            has_video_note: msg.video_note().is_some(),
            has_poll: msg.poll().is_some(),
            text: msg.text().or_else(|| msg.caption()).map(|t| t.to_string()),
            ..Default::default()
        };

        let entities = msg.entities().into_iter().flatten()
            .chain(msg.caption_entities().into_iter().flatten());
        for entity in entities {
            match entity.kind {
                MessageEntityKind::Url => facts.has_url = true,
                MessageEntityKind::TextLink { .. } => facts.has_text_link = true,
                MessageEntityKind::Hashtag => facts.has_hashtag = true,
                MessageEntityKind::Mention | MessageEntityKind::TextMention { .. } => {
                    facts.has_mention = true
                }
                MessageEntityKind::CustomEmoji { .. } => facts.has_custom_emoji = true,
                _ => {}
            }
        }

        facts
    }

    fn has_media(&self) -> bool {
        self.has_photo
            || self.has_video
            || self.has_audio
            || self.has_document
            || self.has_sticker
            || self.has_animation
            || self.has_voice
            || self.has_video_note
    }
}

/// Evaluate the moderation table and return the first matching reason,
/// or `None` when the message is allowed.
pub fn delete_reason(
    locks: &GroupLocks,
    lists: &GroupLists,
    settings: &GroupSettings,
    actor_id: i64,
    facts: &MessageFacts,
) -> Option<&'static str> {
    let exempt = lists.is_admin(actor_id) || lists.is_vip(actor_id);

    // A locked group removes everything from non-exempt actors.
    if settings.group_locked && !exempt {
        return Some("group_locked");
    }

    // Admins and VIPs short-circuit everything below, ban/mute included.
    if exempt {
        return None;
    }

    if lists.is_banned(actor_id) {
        return Some("banned");
    }
    if lists.is_muted(actor_id) {
        return Some("muted");
    }

    if let Some(kind) = locked_category(locks, facts) {
        return Some(kind.name());
    }

    if let Some(text) = &facts.text {
        let lowered = text.to_lowercase();
        if lists.filtered_words.iter().any(|word| lowered.contains(word.as_str())) {
            return Some("filtered_word");
        }
    }

    None
}

/// Moderation decision as a plain verdict.
pub fn should_delete(
    locks: &GroupLocks,
    lists: &GroupLists,
    settings: &GroupSettings,
    actor_id: i64,
    facts: &MessageFacts,
) -> bool {
    delete_reason(locks, lists, settings, actor_id, facts).is_some()
}

/// Find the first locked content category the message trips.
fn locked_category(locks: &GroupLocks, facts: &MessageFacts) -> Option<LockKind> {
    let checks: [(LockKind, bool); 20] = [
        (LockKind::Links, facts.has_url),
        (LockKind::Hyperlinks, facts.has_text_link),
        (LockKind::Hashtags, facts.has_hashtag),
        (LockKind::Usernames, facts.has_mention),
        (LockKind::Inline, facts.via_inline_bot),
        (LockKind::Forwarded, facts.is_forwarded),
        (LockKind::Emoji, facts.has_custom_emoji),
        (LockKind::Games, facts.has_game),
        (LockKind::Edit, facts.is_edited),
        (LockKind::MediaEdit, facts.is_edited && facts.has_media()),
        (LockKind::Videos, facts.has_video),
        (LockKind::Photos, facts.has_photo),
        (LockKind::Files, facts.has_document),
        (LockKind::Music, facts.has_audio),
        (LockKind::Stickers, facts.has_sticker),
        (LockKind::Gifs, facts.has_animation),
        (LockKind::Location, facts.has_location),
        (LockKind::Voice, facts.has_voice),
        (LockKind::VideoMsg, facts.has_video_note),
        (LockKind::Polls, facts.has_poll),
    ];

    checks
        .into_iter()
        .find(|(kind, present)| *present && locks.get(*kind))
        .map(|(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_facts(text: &str) -> MessageFacts {
        MessageFacts {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_lock_deletes_everything_from_members() {
        let locks = GroupLocks::default();
        let lists = GroupLists::default();
        let settings = GroupSettings {
            group_locked: true,
            ..Default::default()
        };

        assert_eq!(
            delete_reason(&locks, &lists, &settings, 1, &text_facts("hello")),
            Some("group_locked")
        );
        // Benign media from a plain member is removed too.
        let media = MessageFacts { has_photo: true, ..Default::default() };
        assert!(should_delete(&locks, &lists, &settings, 1, &media));
    }

    #[test]
    fn test_group_lock_exempts_admins_and_vips() {
        let locks = GroupLocks::default();
        let mut lists = GroupLists::default();
        lists.admins.push(10);
        lists.vips.push(20);
        let settings = GroupSettings {
            group_locked: true,
            ..Default::default()
        };

        assert!(!should_delete(&locks, &lists, &settings, 10, &text_facts("hi")));
        assert!(!should_delete(&locks, &lists, &settings, 20, &text_facts("hi")));
    }

    #[test]
    fn test_banned_and_muted_deleted_even_when_group_unlocked() {
        let locks = GroupLocks::default();
        let mut lists = GroupLists::default();
        lists.banned.push(30);
        lists.muted.push(40);
        let settings = GroupSettings::default();

        assert_eq!(
            delete_reason(&locks, &lists, &settings, 30, &text_facts("hi")),
            Some("banned")
        );
        assert_eq!(
            delete_reason(&locks, &lists, &settings, 40, &text_facts("hi")),
            Some("muted")
        );
    }

    #[test]
    fn test_muted_admin_is_exempt() {
        // Admin status short-circuits the ban/mute checks.
        let locks = GroupLocks::default();
        let mut lists = GroupLists::default();
        lists.admins.push(50);
        lists.muted.push(50);
        let settings = GroupSettings::default();

        assert!(!should_delete(&locks, &lists, &settings, 50, &text_facts("hi")));
    }

    #[test]
    fn test_category_lock_hits_matching_messages_only() {
        let mut locks = GroupLocks::default();
        locks.set(LockKind::Stickers, true);
        let lists = GroupLists::default();
        let settings = GroupSettings::default();

        let sticker = MessageFacts { has_sticker: true, ..Default::default() };
        let photo = MessageFacts { has_photo: true, ..Default::default() };

        assert_eq!(delete_reason(&locks, &lists, &settings, 1, &sticker), Some("stickers"));
        assert!(!should_delete(&locks, &lists, &settings, 1, &photo));
    }

    #[test]
    fn test_vip_exempt_from_category_locks() {
        let mut locks = GroupLocks::default();
        locks.set(LockKind::Links, true);
        let mut lists = GroupLists::default();
        lists.vips.push(60);
        let settings = GroupSettings::default();

        let facts = MessageFacts { has_url: true, ..Default::default() };
        assert!(!should_delete(&locks, &lists, &settings, 60, &facts));
        assert!(should_delete(&locks, &lists, &settings, 61, &facts));
    }

    #[test]
    fn test_word_filter_case_insensitive_substring() {
        let locks = GroupLocks::default();
        let mut lists = GroupLists::default();
        lists.add_filtered_word("spam");
        let settings = GroupSettings::default();

        assert_eq!(
            delete_reason(&locks, &lists, &settings, 1, &text_facts("this is SPAMMY text")),
            Some("filtered_word")
        );
        assert!(!should_delete(&locks, &lists, &settings, 1, &text_facts("clean text")));
    }

    #[test]
    fn test_media_edit_requires_media() {
        let mut locks = GroupLocks::default();
        locks.set(LockKind::MediaEdit, true);
        let lists = GroupLists::default();
        let settings = GroupSettings::default();

        let edited_text = MessageFacts { is_edited: true, ..Default::default() };
        let edited_photo = MessageFacts { is_edited: true, has_photo: true, ..Default::default() };

        assert!(!should_delete(&locks, &lists, &settings, 1, &edited_text));
        assert!(should_delete(&locks, &lists, &settings, 1, &edited_photo));
    }

    #[test]
    fn test_role_resolution_order() {
        let mut lists = GroupLists::default();
        lists.admins.push(1);
        lists.vips.push(1);
        lists.banned.push(2);
        lists.muted.push(2);

        assert_eq!(role_of(&lists, 1), UserRole::Admin);
        assert_eq!(role_of(&lists, 2), UserRole::Banned);
        assert_eq!(role_of(&lists, 3), UserRole::Member);
    }

    #[test]
    fn test_clean_message_allowed() {
        let locks = GroupLocks::default();
        let lists = GroupLists::default();
        let settings = GroupSettings::default();

        assert_eq!(delete_reason(&locks, &lists, &settings, 1, &text_facts("hello")), None);
    }
}
