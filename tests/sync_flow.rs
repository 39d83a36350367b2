//! End-to-end sync tests
//!
//! Drive both sides of the bridge through a session backed by the mock API:
//! create, push, pull (paginated, failing, superseded) and connect.

mod common;

use common::*;
use phrase_sync::host::FontRegistry;
use phrase_sync::link::LinkState;
use phrase_sync::store::NodeStore;

fn states(session: &phrase_sync::Session<MockApi>) -> Vec<(String, LinkState)> {
    session
        .ui
        .selection()
        .iter()
        .map(|leaf| (leaf.figma_node_id.clone(), leaf.state()))
        .collect()
}

// ========================================================================
// Create
// ========================================================================

#[tokio::test]
async fn test_create_links_every_unlinked_text() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);

    assert_eq!(
        states(&session),
        vec![
            ("1:1".to_string(), LinkState::Unlinked),
            ("1:2".to_string(), LinkState::Unlinked),
        ]
    );

    let created = session.create(None).await.unwrap();

    assert_eq!(created, 2);
    assert_eq!(api.calls(), vec![Call::Create { count: 2 }]);
    assert_eq!(
        states(&session),
        vec![
            ("1:1".to_string(), LinkState::InSync),
            ("1:2".to_string(), LinkState::InSync),
        ]
    );
    assert!(notification_messages(&session).contains(&"Created 2 phrase(s)".to_string()));
}

#[tokio::test]
async fn test_create_uses_key_for_single_text() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.select(vec!["1:2".into()]).unwrap();

    session.create(Some("login.forgot".into())).await.unwrap();

    let link = session.ui.selection()[0].app_link.clone().unwrap();
    assert_eq!(link.phrase_key, "login.forgot");
    assert_eq!(link.last_known_remote_content, "Forgot password?");
}

#[tokio::test]
async fn test_create_skips_linked_texts() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();

    let created = session.create(None).await.unwrap();

    assert_eq!(created, 0);
    assert_eq!(api.calls(), vec![Call::Create { count: 2 }]);
}

// ========================================================================
// Push
// ========================================================================

#[tokio::test]
async fn test_push_sends_only_locally_ahead_texts() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();

    edit_text(&mut session, "1:1", "Log in");
    session.select_page().unwrap();
    assert_eq!(session.ui.selection()[0].state(), LinkState::LocallyAhead);
    let diff = session.ui.selection()[0].diff();
    assert_eq!(diff.remote_text(), "Sign in");
    assert_eq!(diff.local_text(), "Log in");
    assert!(diff.render().ends_with(" in"));

    let summary = session.push().await.unwrap();

    assert_eq!(summary.pushed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        api.calls().last(),
        Some(&Call::Update {
            text_id: "t1".into(),
            content: "Log in".into()
        })
    );
    assert_eq!(session.ui.selection()[0].state(), LinkState::InSync);
    assert_eq!(
        session.ui.selection()[0]
            .app_link
            .as_ref()
            .map(|l| l.last_known_remote_content.as_str()),
        Some("Log in")
    );
}

#[tokio::test]
async fn test_push_of_deleted_remote_text_demotes_link() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();
    edit_text(&mut session, "1:1", "Log in");
    session.select_page().unwrap();
    api.delete_text("t1");

    let summary = session.push().await.unwrap();

    assert_eq!(summary.demoted, 1);
    assert_eq!(
        states(&session),
        vec![
            ("1:1".to_string(), LinkState::Unlinked),
            ("1:2".to_string(), LinkState::InSync),
        ]
    );
    assert_eq!(error_messages(&session).len(), 1);
}

#[tokio::test]
async fn test_push_with_rejected_key_reports_invalid_key() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();
    edit_text(&mut session, "1:1", "Log in");
    session.select_page().unwrap();
    api.state().unauthorized = true;

    let summary = session.push().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert!(error_messages(&session)
        .iter()
        .any(|m| m.contains("invalid API key")));
    assert_eq!(session.ui.selection()[0].state(), LinkState::LocallyAhead);
}

// ========================================================================
// Pull
// ========================================================================

#[tokio::test]
async fn test_pull_fetches_pages_in_order_and_applies_all() {
    let api = MockApi::new("1");
    api.serve_pages(
        "0:1",
        vec![
            vec![remote("a", "1:1", "Log in")],
            vec![remote("b", "1:2", "Reset password")],
            vec![remote("c", "9:9", "Orphan")],
        ],
    );
    let mut session = configured_session(&api);

    assert!(session.pull().await.unwrap());

    assert_eq!(api.list_calls(), vec![1, 2, 3]);
    let contents: Vec<&str> = session
        .ui
        .selection()
        .iter()
        .map(|leaf| leaf.figma_content.as_str())
        .collect();
    assert_eq!(contents, vec!["Log in", "Reset password"]);
    assert_eq!(
        states(&session),
        vec![
            ("1:1".to_string(), LinkState::InSync),
            ("1:2".to_string(), LinkState::InSync),
        ]
    );
    assert!(session.ui.last_synced_at().is_some());
    assert!(notification_messages(&session).contains(&"Synced 2 text(s)".to_string()));
}

#[tokio::test]
async fn test_pull_overwrites_local_edits() {
    let api = MockApi::new("1");
    api.serve_pages("0:1", vec![vec![remote("a", "1:1", "Log in")]]);
    let mut session = configured_session(&api);
    edit_text(&mut session, "1:1", "Sign in now");

    session.pull().await.unwrap();

    assert_eq!(session.ui.selection()[0].figma_content, "Log in");
}

#[tokio::test]
async fn test_pull_of_empty_page_requests_one_page() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);

    assert!(session.pull().await.unwrap());

    assert_eq!(api.list_calls(), vec![1]);
    assert!(session.ui.last_synced_at().is_some());
}

#[tokio::test]
async fn test_failed_page_applies_nothing() {
    let api = MockApi::new("1");
    api.serve_pages(
        "0:1",
        vec![
            vec![remote("a", "1:1", "Log in")],
            vec![remote("b", "1:2", "Reset password")],
            vec![],
        ],
    );
    api.state().fail_page = Some(2);
    let mut session = configured_session(&api);

    assert!(!session.pull().await.unwrap());

    assert_eq!(api.list_calls(), vec![1, 2]);
    assert_eq!(
        states(&session),
        vec![
            ("1:1".to_string(), LinkState::Unlinked),
            ("1:2".to_string(), LinkState::Unlinked),
        ]
    );
    assert_eq!(session.ui.last_synced_at(), None);
    let mut store = NodeStore::new(&mut session.model.document);
    assert_eq!(store.page_sync_state("0:1").last_synced_at, None);
    assert_eq!(error_messages(&session).len(), 1);
}

#[tokio::test]
async fn test_superseded_pull_is_applied_once() {
    let api = MockApi::new("1");
    api.serve_pages(
        "0:1",
        vec![vec![remote("a", "1:1", "Log in")], vec![remote("b", "1:2", "Reset")]],
    );
    let mut session = configured_session(&api);

    let first = session.ui.begin_pull("0:1").unwrap();
    let second = session.ui.begin_pull("0:1").unwrap();
    let (first_result, second_result) = futures::join!(first.run(&api), second.run(&api));

    assert!(!session.ui.finish_pull(first, first_result));
    assert!(session.ui.finish_pull(second, second_result));
    session.pump().unwrap();

    let synced: Vec<String> = notification_messages(&session)
        .into_iter()
        .filter(|m| m.starts_with("Synced"))
        .collect();
    assert_eq!(synced, vec!["Synced 2 text(s)".to_string()]);
    assert_eq!(api.list_calls(), vec![1, 2, 1, 2]);
}

#[tokio::test]
async fn test_missing_font_links_without_rendering() {
    let api = MockApi::new("1");
    api.serve_pages("0:1", vec![vec![remote("a", "1:1", "Log in")]]);
    let mut session = session_with(document(), FontRegistry::default(), &api, vec![credential("1")]);
    session.open().unwrap();
    session.select_page().unwrap();
    session.configure_file("file-1", None, None).unwrap();

    session.pull().await.unwrap();

    let leaf = &session.ui.selection()[0];
    assert_eq!(leaf.figma_content, "Sign in");
    assert_eq!(
        leaf.app_link.as_ref().map(|l| l.last_known_remote_content.as_str()),
        Some("Log in")
    );
    assert_eq!(leaf.state(), LinkState::LocallyAhead);
    assert!(notification_messages(&session)
        .iter()
        .any(|m| m.contains("font is missing")));
}

#[tokio::test]
async fn test_pull_only_touches_current_page() {
    let api = MockApi::new("1");
    api.serve_pages("0:2", vec![vec![remote("w", "2:1", "Hello")]]);
    let mut session = configured_session(&api);
    session.switch_page("0:2").unwrap();
    session.select_page().unwrap();

    session.pull().await.unwrap();

    assert_eq!(session.ui.page_node_id(), "0:2");
    assert_eq!(session.ui.selection()[0].figma_content, "Hello");
    let mut store = NodeStore::new(&mut session.model.document);
    assert!(store.page_sync_state("0:2").last_synced_at.is_some());
    assert_eq!(store.page_sync_state("0:1").last_synced_at, None);
}

// ========================================================================
// Connect / unlink single text
// ========================================================================

#[tokio::test]
async fn test_connect_renders_remote_content() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.select(vec!["1:2".into()]).unwrap();

    assert!(session.connect(remote("x", "ignored", "Reset password")).unwrap());

    let leaf = &session.ui.selection()[0];
    assert_eq!(leaf.figma_content, "Reset password");
    assert_eq!(leaf.state(), LinkState::InSync);
}

#[tokio::test]
async fn test_connect_refuses_link_held_elsewhere() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();
    let held = session.ui.selection()[0].app_link.clone().unwrap();
    session.select(vec!["1:2".into()]).unwrap();

    session
        .connect(remote(&held.id, "1:2", "Sign in"))
        .unwrap();

    assert!(error_messages(&session)
        .iter()
        .any(|m| m.contains("already linked")));
    let leaf = &session.ui.selection()[0];
    assert_ne!(leaf.app_link.as_ref().map(|l| l.id.clone()), Some(held.id));
}

#[tokio::test]
async fn test_connect_refuses_link_held_inside_instance() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.select(vec!["1:4".into()]).unwrap();
    assert_eq!(session.create(None).await.unwrap(), 1);
    let held = session.ui.selection()[0].app_link.clone().unwrap();

    session.select(vec!["1:2".into()]).unwrap();
    session
        .connect(remote(&held.id, "1:2", "Forgot password?"))
        .unwrap();

    assert!(error_messages(&session)
        .iter()
        .any(|m| m.contains("already linked")));
    assert_eq!(session.ui.selection()[0].app_link, None);

    let page = session.model.document.page("0:1").unwrap();
    let inner = phrase_sync::link::read(&page.id, page.find_node("1:4").unwrap());
    assert_eq!(inner.app_link, Some(held));
}

#[tokio::test]
async fn test_unlink_selected_text() {
    let api = MockApi::new("1");
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();
    session.select(vec!["1:1".into()]).unwrap();

    assert_eq!(session.unlink_selected().unwrap(), 1);

    session.select_page().unwrap();
    assert_eq!(
        states(&session),
        vec![
            ("1:1".to_string(), LinkState::Unlinked),
            ("1:2".to_string(), LinkState::InSync),
        ]
    );
}
