//! Message types for the Elm-style architecture
//!
//! The sandbox (owns the design file) and the UI (owns network and
//! credentials) only talk through these messages. Both enums serialize as
//! `{"type": "<kebab-case-name>", ...}` so they can cross a real process or
//! script boundary unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::TextItem;
use crate::link::TextLeaf;
use crate::store::FileBinding;
use crate::sync::ApplyReport;

/// Messages delivered to the sandbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SandboxMsg {
    /// UI finished loading and wants the current file state
    UiReady,
    /// Bind the file to a remote project/workspace
    FileConfigSet { binding: FileBinding },
    /// Unlink the file: drop the binding and every text link
    FileConfigResetRequested,
    /// A full pull of one page completed
    TextsSyncReceived {
        page_node_id: String,
        items: Vec<TextItem>,
        synced_at: DateTime<Utc>,
    },
    /// Remote texts were created for unlinked nodes
    TextsCreated { items: Vec<TextItem> },
    /// Local content of one text was pushed
    TextPushed {
        text_node_id: String,
        item: TextItem,
        content: String,
    },
    /// Push found the remote text deleted
    TextRemoteMissing { text_node_id: String },
    /// Link a node to an existing remote text
    TextConnectRequested { text_node_id: String, item: TextItem },
    /// Explicit unlink of one text
    TextUnlinkRequested { text_node_id: String },
    /// Show a transient notification
    NotificationRequested { message: String, error: bool },
    /// Host selection changed
    SelectionChanged { selection: Vec<String> },
    /// Host switched to another page
    CurrentPageChanged { page_node_id: String },
}

/// Messages delivered to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum UiMsg {
    /// Current file binding (None when the file is unconfigured)
    FileConfigLoaded { binding: Option<FileBinding> },
    /// Text nodes of the current selection, re-derived after every change
    SelectionTexts {
        page_node_id: String,
        leaves: Vec<TextLeaf>,
        traversed: bool,
        last_synced_at: Option<DateTime<Utc>>,
    },
    /// Remote results were written into the file
    TextsApplied {
        page_node_id: Option<String>,
        report: ApplyReport,
    },
    /// File returned to unconfigured
    FileUnlinked { cleared: usize },
}

impl SandboxMsg {
    /// Wire name of the message, as used in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            SandboxMsg::UiReady => "ui-ready",
            SandboxMsg::FileConfigSet { .. } => "file-config-set",
            SandboxMsg::FileConfigResetRequested => "file-config-reset-requested",
            SandboxMsg::TextsSyncReceived { .. } => "texts-sync-received",
            SandboxMsg::TextsCreated { .. } => "texts-created",
            SandboxMsg::TextPushed { .. } => "text-pushed",
            SandboxMsg::TextRemoteMissing { .. } => "text-remote-missing",
            SandboxMsg::TextConnectRequested { .. } => "text-connect-requested",
            SandboxMsg::TextUnlinkRequested { .. } => "text-unlink-requested",
            SandboxMsg::NotificationRequested { .. } => "notification-requested",
            SandboxMsg::SelectionChanged { .. } => "selection-changed",
            SandboxMsg::CurrentPageChanged { .. } => "current-page-changed",
        }
    }
}
