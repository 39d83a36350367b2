//! Update functions for the Elm-style architecture
//!
//! Every message arriving at the sandbox flows through [`update`]. State
//! transitions are synchronous; the only side effects are the returned
//! commands.

mod file;
mod selection;
mod texts;

use crate::commands::{Cmd, Notification};
use crate::messages::{SandboxMsg, UiMsg};
use crate::model::SandboxModel;

#[cfg(debug_assertions)]
use crate::tracing::LinkSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use file::{reset_file_config, set_file_config};
pub use selection::{change_page, change_selection, ui_ready};
pub use texts::{
    connect_text, demote_missing_text, record_push, texts_created, texts_sync_received,
    unlink_text,
};

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(model: &mut SandboxModel, msg: SandboxMsg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(model: &mut SandboxModel, msg: SandboxMsg) -> Option<Cmd> {
    match msg {
        SandboxMsg::UiReady => selection::ui_ready(model),
        SandboxMsg::SelectionChanged { selection } => selection::change_selection(model, selection),
        SandboxMsg::CurrentPageChanged { page_node_id } => {
            selection::change_page(model, page_node_id)
        }
        SandboxMsg::FileConfigSet { binding } => file::set_file_config(model, binding),
        SandboxMsg::FileConfigResetRequested => file::reset_file_config(model),
        SandboxMsg::TextsSyncReceived {
            page_node_id,
            items,
            synced_at,
        } => texts::texts_sync_received(model, page_node_id, items, synced_at),
        SandboxMsg::TextsCreated { items } => texts::texts_created(model, items),
        SandboxMsg::TextPushed {
            text_node_id,
            item,
            content,
        } => texts::record_push(model, text_node_id, item, content),
        SandboxMsg::TextRemoteMissing { text_node_id } => {
            texts::demote_missing_text(model, text_node_id)
        }
        SandboxMsg::TextConnectRequested { text_node_id, item } => {
            texts::connect_text(model, text_node_id, item)
        }
        SandboxMsg::TextUnlinkRequested { text_node_id } => texts::unlink_text(model, text_node_id),
        SandboxMsg::NotificationRequested { message, error } => Some(Cmd::Notify(Notification {
            message,
            error,
            timeout: Notification::DEFAULT_TIMEOUT,
        })),
    }
}

/// Fresh view of the selection for the UI; sent after every link change
pub fn selection_texts(model: &mut SandboxModel) -> UiMsg {
    let (leaves, traversed) = model.selection_leaves();
    UiMsg::SelectionTexts {
        page_node_id: model.current_page.clone(),
        leaves,
        traversed,
        last_synced_at: model.page_sync_state().last_synced_at,
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after link counts and logs what the message changed.
#[cfg(debug_assertions)]
fn update_traced(model: &mut SandboxModel, msg: SandboxMsg) -> Option<Cmd> {
    let msg_name = msg.kind();
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();

    let before = LinkSnapshot::from_model(model);
    debug!(target: "message", msg = %msg_name, "processing");

    let result = update_inner(model, msg);

    let after = LinkSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "links", %diff, "state changed");
    }

    result
}
