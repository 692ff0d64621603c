//! End-to-end checks of the moderation evaluator against realistic
//! policy snapshots.

use DownMate::models::group::{GroupLocks, GroupLists, GroupSettings, LockKind};
use DownMate::services::moderation::{MessageFacts, UserRole, role_of, delete_reason, should_delete};

const ADMIN: i64 = 100;
const VIP: i64 = 200;
const MEMBER: i64 = 300;
const TROUBLEMAKER: i64 = 400;

fn strict_policy() -> (GroupLocks, GroupLists, GroupSettings) {
    let mut locks = GroupLocks::default();
    locks.links = true;
    locks.stickers = true;
    locks.forwarded = true;

    let mut lists = GroupLists::default();
    lists.admins.push(ADMIN);
    lists.vips.push(VIP);
    lists.banned.push(TROUBLEMAKER);
    lists.add_filtered_word("Spam");

    (locks, lists, GroupSettings::default())
}

fn text(text: &str) -> MessageFacts {
    MessageFacts {
        text: Some(text.to_string()),
        ..Default::default()
    }
}

#[test]
fn clean_member_message_is_allowed() {
    let (locks, lists, settings) = strict_policy();
    assert_eq!(delete_reason(&locks, &lists, &settings, MEMBER, &text("good morning")), None);
}

#[test]
fn locked_categories_apply_to_members_only() {
    let (locks, lists, settings) = strict_policy();

    let link = MessageFacts { has_url: true, ..Default::default() };
    assert_eq!(delete_reason(&locks, &lists, &settings, MEMBER, &link), Some("links"));
    assert!(!should_delete(&locks, &lists, &settings, ADMIN, &link));
    assert!(!should_delete(&locks, &lists, &settings, VIP, &link));

    let sticker = MessageFacts { has_sticker: true, ..Default::default() };
    assert_eq!(delete_reason(&locks, &lists, &settings, MEMBER, &sticker), Some("stickers"));

    // Photos are not locked in this policy.
    let photo = MessageFacts { has_photo: true, ..Default::default() };
    assert!(!should_delete(&locks, &lists, &settings, MEMBER, &photo));
}

#[test]
fn banned_users_are_silenced_before_category_checks() {
    let (locks, lists, settings) = strict_policy();
    assert_eq!(
        delete_reason(&locks, &lists, &settings, TROUBLEMAKER, &text("innocent text")),
        Some("banned")
    );
}

#[test]
fn word_filter_is_case_insensitive_substring() {
    let (locks, lists, settings) = strict_policy();

    assert_eq!(
        delete_reason(&locks, &lists, &settings, MEMBER, &text("this is SPAM for sure")),
        Some("filtered_word")
    );
    assert_eq!(
        delete_reason(&locks, &lists, &settings, MEMBER, &text("spammer alert")),
        Some("filtered_word")
    );
    // VIPs bypass the word filter.
    assert!(!should_delete(&locks, &lists, &settings, VIP, &text("spam spam spam")));
}

#[test]
fn group_lock_overrides_everything_for_members() {
    let (locks, lists, mut settings) = strict_policy();
    settings.group_locked = true;

    assert_eq!(
        delete_reason(&locks, &lists, &settings, MEMBER, &text("hello")),
        Some("group_locked")
    );
    assert!(!should_delete(&locks, &lists, &settings, ADMIN, &text("hello")));
}

#[test]
fn muted_admin_keeps_posting() {
    let (locks, mut lists, settings) = strict_policy();
    lists.muted.push(ADMIN);
    lists.muted.push(MEMBER);

    assert!(!should_delete(&locks, &lists, &settings, ADMIN, &text("still here")));
    assert_eq!(
        delete_reason(&locks, &lists, &settings, MEMBER, &text("still here")),
        Some("muted")
    );
}

#[test]
fn roles_resolve_in_priority_order() {
    let (_, lists, _) = strict_policy();

    assert_eq!(role_of(&lists, ADMIN), UserRole::Admin);
    assert_eq!(role_of(&lists, VIP), UserRole::Vip);
    assert_eq!(role_of(&lists, TROUBLEMAKER), UserRole::Banned);
    assert_eq!(role_of(&lists, MEMBER), UserRole::Member);

    // A user on both the admin and banned lists counts as admin.
    let mut both = lists.clone();
    both.admins.push(TROUBLEMAKER);
    assert_eq!(role_of(&both, TROUBLEMAKER), UserRole::Admin);
}

#[test]
fn every_lock_kind_round_trips_through_its_wire_name() {
    for kind in LockKind::ALL {
        assert_eq!(LockKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(LockKind::from_name("lasers"), None);

    // Toggling twice restores the original state for every kind.
    let mut locks = GroupLocks::default();
    for kind in LockKind::ALL {
        assert!(locks.toggle(kind));
        assert!(!locks.toggle(kind));
    }
    assert_eq!(locks, GroupLocks::default());
}

#[test]
fn warnings_accumulate_per_user() {
    let mut lists = GroupLists::default();

    assert_eq!(lists.add_warning(MEMBER), 1);
    assert_eq!(lists.add_warning(MEMBER), 2);
    assert_eq!(lists.add_warning(VIP), 1);
    assert_eq!(lists.warnings_of(MEMBER), 2);

    lists.clear_warnings(MEMBER);
    assert_eq!(lists.warnings_of(MEMBER), 0);
    assert_eq!(lists.warnings_of(VIP), 1);
}
