//! File binding lifecycle: configure, persist, unlink

mod common;

use common::*;
use phrase_sync::host::{DesignDocument, FontRegistry};
use phrase_sync::link::LinkState;
use phrase_sync::selection;
use phrase_sync::store::{self, NodeStore};

#[test]
fn test_configure_binds_file_to_active_workspace() {
    let api = MockApi::new("1");
    let session = configured_session(&api);

    let binding = session.ui.binding().cloned().unwrap();
    assert_eq!(binding.id, "file-1");
    assert_eq!(binding.workspace_id, "1");
    assert_eq!(binding.language_id.as_deref(), Some("en"));
    assert_eq!(store::file_binding(&session.model.document), Some(binding));
    assert!(session.saves() > 0);
}

#[test]
fn test_configure_without_credentials_is_refused() {
    let api = MockApi::new("1");
    let mut session = session_with(document(), FontRegistry::default(), &api, vec![]);
    session.open().unwrap();

    assert!(session.configure_file("file-1", None, None).is_err());
    session.pump().unwrap();
    assert_eq!(store::file_binding(&session.model.document), None);
}

#[tokio::test]
async fn test_unlink_file_clears_every_link_and_stamp() {
    let api = MockApi::new("1");
    api.serve_pages("0:2", vec![vec![remote("w", "2:1", "Hello")]]);
    let mut session = configured_session(&api);
    session.create(None).await.unwrap();
    session.switch_page("0:2").unwrap();
    session.select_page().unwrap();
    session.pull().await.unwrap();

    session.unlink_file().unwrap();

    assert_eq!(session.ui.binding(), None);
    assert_eq!(store::file_binding(&session.model.document), None);
    assert!(session
        .ui
        .selection()
        .iter()
        .all(|leaf| leaf.state() == LinkState::Unlinked));
    assert_eq!(session.ui.last_synced_at(), None);

    let doc = &session.model.document;
    for page in &doc.pages {
        for id in selection::all_text_leaves(page) {
            let node = page.find_node(&id).unwrap();
            assert!(node.plugin_data.is_empty(), "{} still holds data", id);
        }
    }
    let mut store = NodeStore::new(&mut session.model.document);
    assert_eq!(store.page_sync_state("0:2").last_synced_at, None);

    // Single stored credential: the now unconfigured file resolves again
    assert!(session.ui.active_credential().is_some());
    assert!(notification_messages(&session).contains(&"File unlinked".to_string()));
}

#[tokio::test]
async fn test_session_saves_design_file_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.json");
    document().save(&path).unwrap();

    let api = MockApi::new("1");
    let loaded = DesignDocument::load(&path).unwrap();
    let mut session = session_with(loaded, FontRegistry::new([inter()]), &api, vec![credential("1")])
        .with_save_path(path.clone());
    session.open().unwrap();
    session.select_page().unwrap();
    session.configure_file("file-1", None, None).unwrap();
    session.create(None).await.unwrap();

    let reloaded = DesignDocument::load(&path).unwrap();
    assert!(store::file_binding(&reloaded).is_some());
    let page = reloaded.page("0:1").unwrap();
    let leaf = phrase_sync::link::read(&page.id, page.find_node("1:1").unwrap());
    assert_eq!(leaf.state(), LinkState::InSync);
}

#[test]
fn test_instance_texts_are_never_selected() {
    let api = MockApi::new("1");
    let mut session = session(&api);

    session.select(vec!["1:3".into()]).unwrap();
    assert!(session.ui.selection().is_empty());

    session.select(vec!["1:4".into(), "1:0".into()]).unwrap();
    let ids: Vec<&str> = session
        .ui
        .selection()
        .iter()
        .map(|leaf| leaf.figma_node_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1:4", "1:1", "1:2"]);
}
