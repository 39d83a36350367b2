//! Sandbox model - the complete state on the design-file side of the bridge
//!
//! Owns the design document (and with it every piece of persisted link
//! state), the fonts the host can load, the current page and selection, and
//! notifications raised so far.

use crate::commands::Notification;
use crate::host::{DesignDocument, FontRegistry, NodeId, Page, PageId};
use crate::link::{self, TextLeaf};
use crate::selection;
use crate::store::{self, FileBinding, NodeStore, PageSyncState};

#[derive(Debug)]
pub struct SandboxModel {
    pub document: DesignDocument,
    pub fonts: FontRegistry,
    pub current_page: PageId,
    pub selection: Vec<NodeId>,
    /// Notifications shown so far, oldest first
    pub notifications: Vec<Notification>,
}

impl SandboxModel {
    /// Open a document on its first page
    pub fn new(document: DesignDocument, fonts: FontRegistry) -> Self {
        let current_page = document
            .pages
            .first()
            .map(|page| page.id.clone())
            .unwrap_or_default();
        Self {
            document,
            fonts,
            current_page,
            selection: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn store(&mut self) -> NodeStore<'_> {
        NodeStore::new(&mut self.document)
    }

    pub fn file_binding(&self) -> Option<FileBinding> {
        store::file_binding(&self.document)
    }

    pub fn page(&self) -> Option<&Page> {
        self.document.page(&self.current_page)
    }

    pub fn page_sync_state(&mut self) -> PageSyncState {
        let page_id = self.current_page.clone();
        self.store().page_sync_state(&page_id)
    }

    /// Link state of the selected text nodes
    pub fn selection_leaves(&self) -> (Vec<TextLeaf>, bool) {
        let Some(page) = self.page() else {
            return (Vec::new(), false);
        };
        let traversal = selection::traverse(page, &self.selection);
        let leaves = self.read_leaves(page, &traversal.leaves);
        (leaves, traversal.traversed)
    }

    /// Link state of every text node on the current page
    pub fn page_leaves(&self) -> Vec<TextLeaf> {
        match self.page() {
            Some(page) => self.read_leaves(page, &selection::all_text_leaves(page)),
            None => Vec::new(),
        }
    }

    fn read_leaves(&self, page: &Page, ids: &[NodeId]) -> Vec<TextLeaf> {
        ids.iter()
            .filter_map(|id| page.find_node(id))
            .map(|node| link::read(&page.id, node))
            .collect()
    }
}
