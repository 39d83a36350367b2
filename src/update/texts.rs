//! Text link message handlers
//!
//! Apply results of remote operations to the design file. Each handler ends
//! with a fresh selection view so the UI re-derives link states.

use chrono::{DateTime, Utc};

use crate::api::TextItem;
use crate::commands::Cmd;
use crate::link;
use crate::messages::UiMsg;
use crate::model::SandboxModel;
use crate::sync::{self, ApplyReport};

use super::selection_texts;

fn applied(model: &mut SandboxModel, page_node_id: Option<String>, report: ApplyReport) -> Vec<Cmd> {
    let mut cmds = Vec::new();
    if report.metadata_only > 0 {
        cmds.push(Cmd::notify(format!(
            "{} text(s) kept their current characters because a font is missing",
            report.metadata_only
        )));
    }
    cmds.push(Cmd::PostToUi(UiMsg::TextsApplied {
        page_node_id,
        report,
    }));
    cmds.push(Cmd::PostToUi(selection_texts(model)));
    cmds.push(Cmd::SaveDocument);
    cmds
}

pub fn texts_sync_received(
    model: &mut SandboxModel,
    page_node_id: String,
    items: Vec<TextItem>,
    synced_at: DateTime<Utc>,
) -> Option<Cmd> {
    if model.document.page(&page_node_id).is_none() {
        tracing::warn!("Pulled texts for unknown page {}", page_node_id);
        return Some(Cmd::notify_error("Synced page no longer exists"));
    }

    let report = sync::apply_pulled(
        &mut model.document,
        &page_node_id,
        &items,
        synced_at,
        &model.fonts,
    );
    let mut cmds = vec![Cmd::notify(format!("Synced {} text(s)", report.applied))];
    cmds.extend(applied(model, Some(page_node_id), report));
    Some(Cmd::batch(cmds))
}

pub fn texts_created(model: &mut SandboxModel, items: Vec<TextItem>) -> Option<Cmd> {
    let report = sync::apply_created(&mut model.document, &items, &model.fonts);
    let mut cmds = vec![Cmd::notify(format!("Created {} phrase(s)", report.applied))];
    cmds.extend(applied(model, None, report));
    Some(Cmd::batch(cmds))
}

pub fn record_push(
    model: &mut SandboxModel,
    text_node_id: String,
    item: TextItem,
    content: String,
) -> Option<Cmd> {
    if !sync::apply_pushed(&mut model.document, &text_node_id, &item, &content) {
        tracing::warn!("Pushed text {} has no node any more", text_node_id);
        return None;
    }
    Some(Cmd::batch(vec![
        Cmd::PostToUi(selection_texts(model)),
        Cmd::SaveDocument,
    ]))
}

pub fn demote_missing_text(model: &mut SandboxModel, text_node_id: String) -> Option<Cmd> {
    sync::demote(&mut model.document, &text_node_id);
    Some(Cmd::batch(vec![
        Cmd::notify_error("The phrase was deleted remotely; the text is now unlinked"),
        Cmd::PostToUi(selection_texts(model)),
        Cmd::SaveDocument,
    ]))
}

/// Connect a node to an existing remote text
///
/// Refused when another node already holds that link.
pub fn connect_text(model: &mut SandboxModel, text_node_id: String, mut item: TextItem) -> Option<Cmd> {
    let owner = model
        .document
        .pages
        .iter()
        .find_map(|page| link::find_link_owner(page, &item.id))
        .map(|node| node.id.clone());
    if let Some(owner) = owner.filter(|owner| *owner != text_node_id) {
        tracing::info!("Link {} is already held by {}", item.id, owner);
        return Some(Cmd::notify_error(
            "This phrase is already linked to another text",
        ));
    }

    item.text_node_id = Some(text_node_id);
    let report = sync::apply_connected(&mut model.document, &item, &model.fonts);
    Some(Cmd::batch(applied(model, None, report)))
}

pub fn unlink_text(model: &mut SandboxModel, text_node_id: String) -> Option<Cmd> {
    if !sync::demote(&mut model.document, &text_node_id) {
        return None;
    }
    Some(Cmd::batch(vec![
        Cmd::notify("Text unlinked"),
        Cmd::PostToUi(selection_texts(model)),
        Cmd::SaveDocument,
    ]))
}
