//! File binding message handlers

use crate::commands::Cmd;
use crate::messages::UiMsg;
use crate::model::SandboxModel;
use crate::store::FileBinding;
use crate::sync;

use super::selection_texts;

pub fn set_file_config(model: &mut SandboxModel, binding: FileBinding) -> Option<Cmd> {
    if let Err(e) = model.store().set_file_binding(&binding) {
        tracing::error!("{}", e);
        return Some(Cmd::notify_error("Could not save the file configuration"));
    }
    tracing::info!(
        "File bound to workspace {} ({})",
        binding.workspace_key,
        binding.id
    );

    let message = format!("File linked to workspace {}", binding.workspace_key);
    Some(Cmd::batch(vec![
        Cmd::PostToUi(UiMsg::FileConfigLoaded {
            binding: Some(binding),
        }),
        Cmd::SaveDocument,
        Cmd::notify(message),
    ]))
}

/// Unlink the file: binding, every text link and every page stamp go
pub fn reset_file_config(model: &mut SandboxModel) -> Option<Cmd> {
    let cleared = sync::unlink_file(&mut model.document);
    Some(Cmd::batch(vec![
        Cmd::PostToUi(UiMsg::FileUnlinked { cleared }),
        Cmd::PostToUi(UiMsg::FileConfigLoaded { binding: None }),
        Cmd::PostToUi(selection_texts(model)),
        Cmd::SaveDocument,
        Cmd::notify("File unlinked"),
    ]))
}
