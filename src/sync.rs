//! Sync protocol
//!
//! Two halves, one per side of the bridge:
//!
//! - network half (UI side, async): create, push and paginated pull against
//!   the phrase API. Nothing here touches the design file.
//! - apply half (sandbox side, synchronous): writes remote results into the
//!   Node Store through the text link model.
//!
//! Reconciliation is last-write-wins. A pull overwrites local edits
//! unconditionally; pushing first is the only way to keep them.
//!
//! A pull is transactional: every page is fetched before anything is
//! applied, and a failure on any page applies nothing and leaves
//! `lastSyncedAt` untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, CreateTextItem, PhraseApi, TextItem};
use crate::host::{DesignDocument, FontRegistry};
use crate::link::{self, AppLink, WriteOutcome};
use crate::store::{FileBinding, NodeStore};

/// An unlinked text node about to be created remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDraft {
    pub text_node_id: String,
    pub page_node_id: String,
    pub content: String,
    pub phrase_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed(TextItem),
    /// The remote text is gone; the local link must be demoted
    RemoteMissing,
}

/// Every item of one page, fetched in server order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulledPage {
    pub page_node_id: String,
    pub items: Vec<TextItem>,
    pub pages_fetched: u32,
}

/// Create remote texts for `drafts` in one request
///
/// Returned items always carry the text node id they belong to; the server
/// answers in request order when it omits it.
pub async fn create_texts<A: PhraseApi + ?Sized>(
    api: &A,
    binding: &FileBinding,
    drafts: &[TextDraft],
) -> Result<Vec<TextItem>, ApiError> {
    if drafts.is_empty() {
        return Ok(Vec::new());
    }

    let request = drafts
        .iter()
        .map(|draft| CreateTextItem {
            phrase_key: draft.phrase_key.clone(),
            content: draft.content.clone(),
            text_node_id: draft.text_node_id.clone(),
            page_node_id: draft.page_node_id.clone(),
        })
        .collect();

    let created = api.create_texts(&binding.id, request).await?;
    if created.len() != drafts.len() {
        tracing::warn!(
            "Asked to create {} texts, server returned {}",
            drafts.len(),
            created.len()
        );
    }

    Ok(created
        .into_iter()
        .zip(drafts)
        .map(|(mut item, draft)| {
            item.text_node_id.get_or_insert_with(|| draft.text_node_id.clone());
            item.page_node_id.get_or_insert_with(|| draft.page_node_id.clone());
            item
        })
        .collect())
}

/// Send local content for one linked text
pub async fn push_text<A: PhraseApi + ?Sized>(
    api: &A,
    binding: &FileBinding,
    link: &AppLink,
    content: &str,
) -> Result<PushOutcome, ApiError> {
    match api.update_text(&binding.id, &link.id, content).await {
        Ok(item) => Ok(PushOutcome::Pushed(item)),
        Err(ApiError::NotFound) => {
            tracing::info!("Remote text {} no longer exists", link.id);
            Ok(PushOutcome::RemoteMissing)
        }
        Err(e) => Err(e),
    }
}

/// Fetch every text of one page, pages strictly in order
///
/// The page count comes from the first response. The loop stops at the
/// first error and the whole pull must then be retried from page 1.
pub async fn pull_page<A: PhraseApi + ?Sized>(
    api: &A,
    binding: &FileBinding,
    page_node_id: &str,
) -> Result<PulledPage, ApiError> {
    let mut items = Vec::new();
    let mut pages_count: Option<u32> = None;
    let mut page = 1;

    loop {
        let response = api.list_texts(&binding.id, page_node_id, page).await?;
        let total = *pages_count.get_or_insert(response.pagination.pages_count.max(1));
        tracing::trace!("Pulled page {}/{} for {}", page, total, page_node_id);
        items.extend(response.items);
        if page >= total {
            break;
        }
        page += 1;
    }

    Ok(PulledPage {
        page_node_id: page_node_id.to_string(),
        items,
        pages_fetched: page,
    })
}

/// Hands out per-page tickets so a superseded pull can be recognised
///
/// Requests are not cancelled in flight; the caller drops the result of any
/// pull that is no longer the latest for its page.
#[derive(Debug, Default)]
pub struct PullTracker {
    next: u64,
    latest: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullTicket {
    pub page_node_id: String,
    seq: u64,
}

impl PullTracker {
    pub fn begin(&mut self, page_node_id: &str) -> PullTicket {
        self.next += 1;
        self.latest.insert(page_node_id.to_string(), self.next);
        PullTicket {
            page_node_id: page_node_id.to_string(),
            seq: self.next,
        }
    }

    /// True when `ticket` is still the latest pull of its page
    pub fn finish(&mut self, ticket: &PullTicket) -> bool {
        match self.latest.get(&ticket.page_node_id) {
            Some(&seq) if seq == ticket.seq => {
                self.latest.remove(&ticket.page_node_id);
                true
            }
            _ => false,
        }
    }

    pub fn in_flight(&self, page_node_id: &str) -> bool {
        self.latest.contains_key(page_node_id)
    }
}

/// What applying remote items did to the design file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub applied: usize,
    pub characters_replaced: usize,
    /// Link stored but characters kept because a font is missing
    pub metadata_only: usize,
    /// Items whose text node no longer exists in the file
    pub missing_nodes: Vec<String>,
}

impl ApplyReport {
    fn record(&mut self, node_id: &str, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written {
                characters_replaced,
            } => {
                self.applied += 1;
                if characters_replaced {
                    self.characters_replaced += 1;
                }
            }
            WriteOutcome::MetadataOnly => {
                self.applied += 1;
                self.metadata_only += 1;
            }
            WriteOutcome::NotText => self.missing_nodes.push(node_id.to_string()),
        }
    }
}

fn item_link(item: &TextItem) -> AppLink {
    AppLink {
        id: item.id.clone(),
        phrase_id: item.phrase_id.clone(),
        phrase_key: item.phrase_key.clone(),
        last_known_remote_content: item.content.clone(),
    }
}

fn apply_item(
    document: &mut DesignDocument,
    page_id: Option<&str>,
    item: &TextItem,
    replace_characters: bool,
    fonts: &FontRegistry,
    report: &mut ApplyReport,
) {
    let Some(node_id) = item.text_node_id.as_deref() else {
        tracing::warn!("Remote text {} has no text node id, skipping", item.id);
        return;
    };

    let node = match page_id {
        Some(page_id) => document
            .page_mut(page_id)
            .and_then(|page| page.find_node_mut(node_id)),
        None => document
            .pages
            .iter_mut()
            .find_map(|page| page.find_node_mut(node_id)),
    };

    match node {
        Some(node) => {
            let outcome = link::write(node, &item_link(item), replace_characters, fonts);
            report.record(node_id, outcome);
        }
        None => {
            tracing::debug!("Text node {} not found, skipping remote text {}", node_id, item.id);
            report.missing_nodes.push(node_id.to_string());
        }
    }
}

/// Link freshly created remote texts to their nodes
pub fn apply_created(
    document: &mut DesignDocument,
    items: &[TextItem],
    fonts: &FontRegistry,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for item in items {
        apply_item(document, None, item, false, fonts, &mut report);
    }
    report
}

/// Link an existing remote text to a node ("connect to existing phrase")
///
/// The remote content is rendered into the node.
pub fn apply_connected(
    document: &mut DesignDocument,
    item: &TextItem,
    fonts: &FontRegistry,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    apply_item(document, None, item, true, fonts, &mut report);
    report
}

/// Apply a completed pull in server order, then stamp the page
pub fn apply_pulled(
    document: &mut DesignDocument,
    page_id: &str,
    items: &[TextItem],
    synced_at: DateTime<Utc>,
    fonts: &FontRegistry,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for item in items {
        apply_item(document, Some(page_id), item, true, fonts, &mut report);
    }
    NodeStore::new(document).mark_page_synced(page_id, synced_at);
    tracing::info!(
        "Applied {} remote texts to page {} ({} metadata only, {} missing)",
        report.applied,
        page_id,
        report.metadata_only,
        report.missing_nodes.len()
    );
    report
}

/// Record a successful push: the pushed content becomes the last known
/// remote content
pub fn apply_pushed(
    document: &mut DesignDocument,
    text_node_id: &str,
    item: &TextItem,
    pushed_content: &str,
) -> bool {
    let Some(node) = document
        .pages
        .iter_mut()
        .find_map(|page| page.find_node_mut(text_node_id))
    else {
        return false;
    };

    let link = AppLink {
        last_known_remote_content: pushed_content.to_string(),
        ..item_link(item)
    };
    // Characters already hold the pushed content
    !matches!(
        link::write(node, &link, false, &FontRegistry::default()),
        WriteOutcome::NotText
    )
}

/// Demote a text whose remote counterpart is gone back to unlinked
pub fn demote(document: &mut DesignDocument, text_node_id: &str) -> bool {
    match document
        .pages
        .iter_mut()
        .find_map(|page| page.find_node_mut(text_node_id))
    {
        Some(node) => {
            link::reset(node);
            true
        }
        None => false,
    }
}

/// Return the file to unconfigured: drop the binding, every node link and
/// every page sync stamp
pub fn unlink_file(document: &mut DesignDocument) -> usize {
    let mut cleared = 0;
    for page in &mut document.pages {
        page.for_each_node_mut(&mut |node| {
            if !node.plugin_data.is_empty() {
                link::reset(node);
                cleared += 1;
            }
        });
    }

    let page_ids: Vec<String> = document.pages.iter().map(|p| p.id.clone()).collect();
    let mut store = NodeStore::new(document);
    for page_id in &page_ids {
        store.clear_page_sync_state(page_id);
    }
    store.clear_file_binding();

    tracing::info!("Unlinked file, cleared {} text links", cleared);
    cleared
}
