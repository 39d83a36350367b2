//! Text link model
//!
//! Correlates a text node in the design file with a remote phrase. The link
//! is stored as four plugin data keys on the node; they are always written
//! and cleared together so a reader never observes half a link.

use serde::{Deserialize, Serialize};

use crate::diff;
use crate::host::{FontRegistry, Page, SceneNode};
use crate::store::{KEY_LAST_KNOWN_CONTENT, KEY_LINK_ID, KEY_PHRASE_ID, KEY_PHRASE_KEY};

/// Stored association between a text node and a remote phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppLink {
    pub id: String,
    pub phrase_id: String,
    pub phrase_key: String,
    pub last_known_remote_content: String,
}

/// A text node as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLeaf {
    pub figma_page_id: String,
    pub figma_node_id: String,
    pub figma_content: String,
    pub app_link: Option<AppLink>,
}

/// Link state derived on read, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkState {
    Unlinked,
    InSync,
    LocallyAhead,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            LinkState::Unlinked => "unlinked",
            LinkState::InSync => "in-sync",
            LinkState::LocallyAhead => "locally-ahead",
        })
    }
}

impl TextLeaf {
    pub fn is_linked(&self) -> bool {
        self.app_link.is_some()
    }

    pub fn state(&self) -> LinkState {
        match &self.app_link {
            None => LinkState::Unlinked,
            Some(link) if diff::has_diff(&link.last_known_remote_content, &self.figma_content) => {
                LinkState::LocallyAhead
            }
            Some(_) => LinkState::InSync,
        }
    }

    /// Diff of last known remote content against current local content
    pub fn diff(&self) -> diff::TextDiff {
        match &self.app_link {
            Some(link) => diff::diff(&link.last_known_remote_content, &self.figma_content),
            None => diff::TextDiff::default(),
        }
    }
}

/// Outcome of [`write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Link data stored; characters untouched or replaced
    Written { characters_replaced: bool },
    /// Link data stored but a font is missing, so characters were left alone
    MetadataOnly,
    /// The node is not a text node; nothing was written
    NotText,
}

/// Read the link state of a text node. Never fails.
pub fn read(page_id: &str, node: &SceneNode) -> TextLeaf {
    TextLeaf {
        figma_page_id: page_id.to_string(),
        figma_node_id: node.id.clone(),
        figma_content: node
            .as_text()
            .map(|text| text.characters.clone())
            .unwrap_or_default(),
        app_link: read_link(node),
    }
}

fn read_link(node: &SceneNode) -> Option<AppLink> {
    let data = &node.plugin_data;
    let id = data.get(KEY_LINK_ID)?;
    let phrase_id = data.get(KEY_PHRASE_ID)?;
    Some(AppLink {
        id: id.to_string(),
        phrase_id: phrase_id.to_string(),
        phrase_key: data.get(KEY_PHRASE_KEY).unwrap_or_default().to_string(),
        last_known_remote_content: data
            .get(KEY_LAST_KNOWN_CONTENT)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Store `link` on `node` and, when every font is loadable and
/// `replace_characters` is set, render the remote content.
pub fn write(
    node: &mut SceneNode,
    link: &AppLink,
    replace_characters: bool,
    fonts: &FontRegistry,
) -> WriteOutcome {
    let Some(text) = node.as_text_mut() else {
        return WriteOutcome::NotText;
    };

    let outcome = if !replace_characters || text.characters == link.last_known_remote_content {
        WriteOutcome::Written {
            characters_replaced: false,
        }
    } else if fonts.can_render(text) {
        text.characters = link.last_known_remote_content.clone();
        WriteOutcome::Written {
            characters_replaced: true,
        }
    } else {
        tracing::debug!("Font unavailable for {}, keeping rendered text", node.id);
        WriteOutcome::MetadataOnly
    };

    // Assemble the full replacement before touching the node
    let mut data = node.plugin_data.clone();
    data.set(KEY_LINK_ID, link.id.as_str());
    data.set(KEY_PHRASE_ID, link.phrase_id.as_str());
    data.set(KEY_PHRASE_KEY, link.phrase_key.as_str());
    data.set(KEY_LAST_KNOWN_CONTENT, link.last_known_remote_content.as_str());
    node.plugin_data = data;

    outcome
}

/// Clear every stored key on the node (unlink)
pub fn reset(node: &mut SceneNode) {
    node.plugin_data.clear();
}

/// Find the node on `page` that already holds link `link_id`.
/// Text inside component instances is searched too.
pub fn find_link_owner<'a>(page: &'a Page, link_id: &str) -> Option<&'a SceneNode> {
    page.find_node_where(&|node| node.plugin_data.get(KEY_LINK_ID) == Some(link_id))
}
