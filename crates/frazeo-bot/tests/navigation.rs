#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the frazeo-bot crate.
//!
//! Drives the navigator through whole conversations over the two-idiom
//! scenario: query, drill-down, back, search again, random, and expiry.

use frazeo_bot::fixtures;
use frazeo_bot::{
    Navigator, BACK_LABEL, EXPIRED_NOTICE, ORDINALS, RANDOM_LABEL, RANDOM_PAYLOAD,
    SEARCH_AGAIN_LABEL, SEARCH_AGAIN_PAYLOAD,
};
use frazeo_core::Reply;
use frazeo_session::{ConversationId, SessionLimits, Snapshot};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The screen a reply leaves on the user's device.
fn shown(reply: &Reply) -> Snapshot {
    Snapshot::new(reply.text.clone(), reply.controls.clone())
}

fn payload(reply: &Reply, label: &str) -> String {
    reply
        .controls
        .as_ref()
        .and_then(|c| c.find_by_label(label))
        .map(|c| c.payload.clone())
        .unwrap_or_else(|| panic!("no control labelled {label}"))
}

fn press(nav: &Navigator, conv: &ConversationId, on: &Reply, label: &str) -> Reply {
    nav.handle_select(conv, &payload(on, label), shown(on)).unwrap()
}

const DETAIL_IDLE: &str = "*БИТЬ БАКЛУШИ*\n\tto idle\n\nSimilar:\n1️⃣ *КОТ НАПЛАКАЛ* — very little\n";

// ---------------------------------------------------------------------------
// 1. Top-level search
// ---------------------------------------------------------------------------

#[test]
fn query_ranks_related_idiom_first() {
    let nav = fixtures::navigator().unwrap();
    let reply = nav
        .handle_query(&ConversationId::from(1), "ничего не делать")
        .unwrap();

    assert_eq!(
        reply.text,
        "🔎 *ничего не делать*\n\n1️⃣ *БИТЬ БАКЛУШИ* — to idle\n2️⃣ *КОТ НАПЛАКАЛ* — very little\n"
    );
    let controls = reply.controls.unwrap();
    assert_eq!(controls.rows.len(), 2);
    assert_eq!(controls.rows[0].len(), 2);
    assert_eq!(controls.rows[1][0].label, RANDOM_LABEL);
    let registry = nav.store().registry();
    assert_eq!(registry.resolve_id(&controls.rows[0][0].payload), Some(0));
    assert_eq!(registry.resolve_id(&controls.rows[0][1].payload), Some(1));
}

#[test]
fn same_query_twice_is_idempotent() {
    let nav = fixtures::navigator().unwrap();
    let conv = ConversationId::from(1);
    let first = nav.handle_query(&conv, "ничего не делать").unwrap();
    let second = nav.handle_query(&conv, "ничего не делать").unwrap();
    assert_eq!(first.text, second.text);
    assert_eq!(first.controls, second.controls);
    assert_eq!(payload(&first, RANDOM_LABEL), RANDOM_PAYLOAD);
}

#[test]
fn unknown_words_still_answer() {
    let nav = fixtures::navigator().unwrap();
    let reply = nav.handle_query(&ConversationId::from(1), "!!! ???").unwrap();
    assert!(reply.text.contains(ORDINALS[0]));
    assert!(reply.text.contains(ORDINALS[1]));
}

// ---------------------------------------------------------------------------
// 2. Drill-down and back
// ---------------------------------------------------------------------------

#[test]
fn selecting_an_item_opens_detail_without_self() {
    let nav = fixtures::navigator().unwrap();
    let conv = ConversationId::from(1);
    let root = nav.handle_query(&conv, "ничего не делать").unwrap();
    let detail = press(&nav, &conv, &root, ORDINALS[0]);

    assert_eq!(detail.text, DETAIL_IDLE);
    assert!(detail.notice.is_none());
    let controls = detail.controls.as_ref().unwrap();
    assert_eq!(controls.rows[0][0].label, BACK_LABEL);
    assert_eq!(controls.rows[1].len(), 1);
    let tail: Vec<&str> = controls
        .rows
        .last()
        .unwrap()
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(tail, vec![SEARCH_AGAIN_LABEL, RANDOM_LABEL]);
}

#[test]
fn back_restores_previous_screen_exactly() {
    let nav = fixtures::navigator().unwrap();
    let conv = ConversationId::from(1);
    let root = nav.handle_query(&conv, "ничего не делать").unwrap();
    let idle = press(&nav, &conv, &root, ORDINALS[0]);
    let little = press(&nav, &conv, &idle, ORDINALS[0]);
    assert!(little.text.starts_with("*КОТ НАПЛАКАЛ*"));

    let back_to_idle = press(&nav, &conv, &little, BACK_LABEL);
    assert_eq!(back_to_idle.text, idle.text);
    assert_eq!(back_to_idle.controls, idle.controls);

    let back_to_root = press(&nav, &conv, &back_to_idle, BACK_LABEL);
    assert_eq!(back_to_root.text, root.text);
    assert_eq!(back_to_root.controls, root.controls);
}

#[test]
fn search_again_restores_last_query() {
    let nav = fixtures::navigator().unwrap();
    let conv = ConversationId::from(1);
    let root = nav.handle_query(&conv, "очень мало").unwrap();
    let detail = press(&nav, &conv, &root, ORDINALS[1]);
    let again = press(&nav, &conv, &detail, SEARCH_AGAIN_LABEL);
    assert_eq!(again.text, root.text);
    assert_eq!(again.controls.unwrap().len(), root.controls.unwrap().len());
}

#[test]
fn new_query_overwrites_search_again_target() {
    let nav = fixtures::navigator().unwrap();
    let conv = ConversationId::from(1);
    nav.handle_query(&conv, "очень мало").unwrap();
    let root = nav.handle_query(&conv, "ничего не делать").unwrap();
    let detail = press(&nav, &conv, &root, ORDINALS[1]);
    let again = press(&nav, &conv, &detail, SEARCH_AGAIN_LABEL);
    assert!(again.text.starts_with("🔎 *ничего не делать*"));
}

#[test]
fn conversations_do_not_share_last_query() {
    let nav = fixtures::navigator().unwrap();
    let alice = ConversationId::from(1);
    let bob = ConversationId::from(2);
    nav.handle_query(&alice, "очень мало").unwrap();

    let current = Snapshot::new("bob's screen", None);
    let reply = nav
        .handle_select(&bob, SEARCH_AGAIN_PAYLOAD, current)
        .unwrap();
    assert_eq!(reply.text, "bob's screen");
    assert_eq!(reply.notice.as_deref(), Some(EXPIRED_NOTICE));
}

// ---------------------------------------------------------------------------
// 3. Random exploration
// ---------------------------------------------------------------------------

#[test]
fn random_control_always_yields_detail_with_back() {
    let nav = fixtures::navigator_with(&SessionLimits {
        snapshot_capacity: 1,
        conversation_capacity: 1,
    })
    .unwrap();
    let conv = ConversationId::from(1);
    let start = nav.handle_start(Some("Ivan")).unwrap();

    for _ in 0..20 {
        let detail = press(&nav, &conv, &start, RANDOM_LABEL);
        assert!(detail.notice.is_none());
        assert!(detail.text.contains("\n\nSimilar:\n"));
        let controls = detail.controls.unwrap();
        assert_eq!(controls.rows[0][0].label, BACK_LABEL);
        // No query yet, so nothing to go back to.
        assert!(controls.find_by_label(SEARCH_AGAIN_LABEL).is_none());
    }
}

// ---------------------------------------------------------------------------
// 4. Expiry
// ---------------------------------------------------------------------------

#[test]
fn back_after_eviction_shows_expired_notice() {
    let nav = fixtures::navigator_with(&SessionLimits {
        snapshot_capacity: 1,
        conversation_capacity: 10,
    })
    .unwrap();
    let conv = ConversationId::from(1);
    let root = nav.handle_query(&conv, "ничего не делать").unwrap();
    let idle = press(&nav, &conv, &root, ORDINALS[0]);
    // Stashing the idle screen evicts the root snapshot.
    let _little = press(&nav, &conv, &idle, ORDINALS[0]);
    assert_eq!(nav.store().snapshot_count(), 1);

    let expired = press(&nav, &conv, &idle, BACK_LABEL);
    assert_eq!(expired.text, idle.text);
    assert!(expired.controls.is_none());
    assert_eq!(expired.notice.as_deref(), Some(EXPIRED_NOTICE));
}

#[test]
fn garbage_payload_takes_expired_path() {
    let nav = fixtures::navigator().unwrap();
    let current = Snapshot::new("whatever was shown", None);
    let reply = nav
        .handle_select(&ConversationId::from(1), "deadbeef", current)
        .unwrap();
    assert_eq!(reply.text, "whatever was shown");
    assert!(reply.controls.is_none());
    assert_eq!(reply.notice.as_deref(), Some(EXPIRED_NOTICE));
}

#[test]
fn session_bounds_hold_over_long_conversations() {
    let nav = fixtures::navigator_with(&SessionLimits {
        snapshot_capacity: 3,
        conversation_capacity: 2,
    })
    .unwrap();
    for c in 0..5 {
        let conv = ConversationId::from(c);
        let mut screen = nav.handle_query(&conv, "ничего не делать").unwrap();
        for _ in 0..10 {
            screen = press(&nav, &conv, &screen, ORDINALS[0]);
        }
    }
    assert!(nav.store().snapshot_count() <= 3);
    assert!(nav.store().conversation_count() <= 2);
}
