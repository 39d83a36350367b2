//! Selection and page message handlers

use crate::commands::Cmd;
use crate::host::NodeId;
use crate::messages::UiMsg;
use crate::model::SandboxModel;

use super::selection_texts;

/// UI is up: send the file binding and the current selection
pub fn ui_ready(model: &mut SandboxModel) -> Option<Cmd> {
    Some(Cmd::batch(vec![
        Cmd::PostToUi(UiMsg::FileConfigLoaded {
            binding: model.file_binding(),
        }),
        Cmd::PostToUi(selection_texts(model)),
    ]))
}

pub fn change_selection(model: &mut SandboxModel, selection: Vec<NodeId>) -> Option<Cmd> {
    model.selection = selection;
    tracing::trace!("Selection changed: {:?}", model.selection);
    Some(Cmd::PostToUi(selection_texts(model)))
}

pub fn change_page(model: &mut SandboxModel, page_node_id: String) -> Option<Cmd> {
    if model.document.page(&page_node_id).is_none() {
        tracing::warn!("Ignoring switch to unknown page {}", page_node_id);
        return None;
    }
    model.current_page = page_node_id;
    model.selection.clear();
    Some(Cmd::PostToUi(selection_texts(model)))
}
