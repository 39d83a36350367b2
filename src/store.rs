//! Node Store - typed access to host plugin data
//!
//! All engine state lives inside the design file itself. This module is the
//! single place that knows which keys are stored at which scope:
//!
//! - node: link id, phrase id, phrase key, last known remote content
//! - page: last synced timestamp
//! - document: JSON-serialized [`FileBinding`]
//!
//! User-scoped credentials live in client storage (see `credentials`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::host::{DesignDocument, PluginData};

pub const KEY_LINK_ID: &str = "linkId";
pub const KEY_PHRASE_ID: &str = "phraseId";
pub const KEY_PHRASE_KEY: &str = "phraseKey";
pub const KEY_LAST_KNOWN_CONTENT: &str = "lastKnownContent";
pub const KEY_LAST_SYNCED_AT: &str = "lastSyncedAt";
pub const KEY_FILE_CONFIG: &str = "fileConfig";

/// Storage granularity offered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Node(String),
    Page(String),
    Document,
}

/// Which remote project/workspace/revision/language a file is wired to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBinding {
    pub id: String,
    pub language_id: Option<String>,
    pub revision_id: Option<String>,
    pub workspace_id: String,
    pub workspace_key: String,
    #[serde(default)]
    pub custom_origin: Option<String>,
}

/// Per-page record of the last successful full pull
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSyncState {
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Typed key/value repository over a design document
pub struct NodeStore<'a> {
    document: &'a mut DesignDocument,
}

impl<'a> NodeStore<'a> {
    pub fn new(document: &'a mut DesignDocument) -> Self {
        Self { document }
    }

    fn data(&self, scope: &Scope) -> Option<&PluginData> {
        match scope {
            Scope::Document => Some(&self.document.plugin_data),
            Scope::Page(id) => self.document.page(id).map(|page| &page.plugin_data),
            Scope::Node(id) => self
                .document
                .pages
                .iter()
                .find_map(|page| page.find_node(id))
                .map(|node| &node.plugin_data),
        }
    }

    fn data_mut(&mut self, scope: &Scope) -> Option<&mut PluginData> {
        match scope {
            Scope::Document => Some(&mut self.document.plugin_data),
            Scope::Page(id) => self.document.page_mut(id).map(|page| &mut page.plugin_data),
            Scope::Node(id) => self
                .document
                .pages
                .iter_mut()
                .find_map(|page| page.find_node_mut(id))
                .map(|node| &mut node.plugin_data),
        }
    }

    pub fn get(&self, scope: &Scope, key: &str) -> Option<String> {
        self.data(scope)?.get(key).map(str::to_string)
    }

    /// Returns false when the scope does not exist in the document
    pub fn set(&mut self, scope: &Scope, key: &str, value: &str) -> bool {
        match self.data_mut(scope) {
            Some(data) => {
                data.set(key, value);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, scope: &Scope, key: &str) {
        if let Some(data) = self.data_mut(scope) {
            data.remove(key);
        }
    }

    pub fn clear(&mut self, scope: &Scope) {
        if let Some(data) = self.data_mut(scope) {
            data.clear();
        }
    }

    pub fn file_binding(&self) -> Option<FileBinding> {
        file_binding(self.document)
    }

    pub fn set_file_binding(&mut self, binding: &FileBinding) -> Result<(), String> {
        let json = serde_json::to_string(binding)
            .map_err(|e| format!("Failed to serialize file binding: {}", e))?;
        self.set(&Scope::Document, KEY_FILE_CONFIG, &json);
        Ok(())
    }

    pub fn clear_file_binding(&mut self) {
        self.remove(&Scope::Document, KEY_FILE_CONFIG);
    }

    pub fn page_sync_state(&self, page_id: &str) -> PageSyncState {
        let last_synced_at = self
            .get(&Scope::Page(page_id.to_string()), KEY_LAST_SYNCED_AT)
            .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!("Ignoring malformed sync stamp on page {}: {}", page_id, e);
                    None
                }
            });
        PageSyncState { last_synced_at }
    }

    pub fn mark_page_synced(&mut self, page_id: &str, at: DateTime<Utc>) -> bool {
        self.set(
            &Scope::Page(page_id.to_string()),
            KEY_LAST_SYNCED_AT,
            &at.to_rfc3339(),
        )
    }

    pub fn clear_page_sync_state(&mut self, page_id: &str) {
        self.remove(&Scope::Page(page_id.to_string()), KEY_LAST_SYNCED_AT);
    }
}

/// Read the file binding without borrowing the document mutably
pub fn file_binding(document: &DesignDocument) -> Option<FileBinding> {
    let raw = document.plugin_data.get(KEY_FILE_CONFIG)?;
    match serde_json::from_str(raw) {
        Ok(binding) => Some(binding),
        Err(e) => {
            tracing::warn!("Ignoring malformed file config: {}", e);
            None
        }
    }
}
