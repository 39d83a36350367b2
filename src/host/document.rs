//! Design document tree
//!
//! A design file is a list of pages, each holding a tree of scene nodes.
//! Only text nodes carry content the engine cares about; containers are
//! walked, instances are opaque.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::plugin_data::PluginData;

pub type NodeId = String;
pub type PageId = String;

/// Font family + style pair, as the host names them
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: &str, style: &str) -> Self {
        Self {
            family: family.to_string(),
            style: style.to_string(),
        }
    }
}

/// Fonts the host can load on this machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontRegistry {
    available: HashSet<FontName>,
}

impl FontRegistry {
    pub fn new(fonts: impl IntoIterator<Item = FontName>) -> Self {
        Self {
            available: fonts.into_iter().collect(),
        }
    }

    pub fn is_available(&self, font: &FontName) -> bool {
        self.available.contains(font)
    }

    /// True when every font used by a text node can be loaded
    pub fn can_render(&self, text: &TextContent) -> bool {
        text.fonts.iter().all(|font| self.is_available(font))
    }

    pub fn add(&mut self, font: FontName) {
        self.available.insert(font);
    }
}

/// Characters rendered by a text node and the fonts used to render them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub characters: String,
    #[serde(default)]
    pub fonts: Vec<FontName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Text(TextContent),
    Frame { children: Vec<SceneNode> },
    Group { children: Vec<SceneNode> },
    Component { children: Vec<SceneNode> },
    Instance { children: Vec<SceneNode> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "pluginData")]
    pub plugin_data: PluginData,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl SceneNode {
    pub fn text(id: &str, characters: &str, fonts: Vec<FontName>) -> Self {
        Self {
            id: id.to_string(),
            name: characters.chars().take(32).collect(),
            plugin_data: PluginData::new(),
            kind: NodeKind::Text(TextContent {
                characters: characters.to_string(),
                fonts,
            }),
        }
    }

    pub fn frame(id: &str, children: Vec<SceneNode>) -> Self {
        Self::container(id, NodeKind::Frame { children })
    }

    pub fn group(id: &str, children: Vec<SceneNode>) -> Self {
        Self::container(id, NodeKind::Group { children })
    }

    pub fn component(id: &str, children: Vec<SceneNode>) -> Self {
        Self::container(id, NodeKind::Component { children })
    }

    pub fn instance(id: &str, children: Vec<SceneNode>) -> Self {
        Self::container(id, NodeKind::Instance { children })
    }

    fn container(id: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            plugin_data: PluginData::new(),
            kind,
        }
    }

    pub fn as_text(&self) -> Option<&TextContent> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.kind, NodeKind::Instance { .. })
    }

    pub fn children(&self) -> &[SceneNode] {
        match &self.kind {
            NodeKind::Text(_) => &[],
            NodeKind::Frame { children }
            | NodeKind::Group { children }
            | NodeKind::Component { children }
            | NodeKind::Instance { children } => children,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<SceneNode>> {
        match &mut self.kind {
            NodeKind::Text(_) => None,
            NodeKind::Frame { children }
            | NodeKind::Group { children }
            | NodeKind::Component { children }
            | NodeKind::Instance { children } => Some(children),
        }
    }

    fn find(&self, id: &str) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// First node in this subtree matching `pred`, instances included
    pub fn find_where(&self, pred: &dyn Fn(&SceneNode) -> bool) -> Option<&SceneNode> {
        if pred(self) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_where(pred))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Visit this node and every descendant, instances included
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut SceneNode)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.for_each_mut(f);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "pluginData")]
    pub plugin_data: PluginData,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl Page {
    pub fn new(id: &str, name: &str, children: Vec<SceneNode>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            plugin_data: PluginData::new(),
            children,
        }
    }

    pub fn find_node(&self, id: &str) -> Option<&SceneNode> {
        self.children.iter().find_map(|node| node.find(id))
    }

    pub fn find_node_where(&self, pred: &dyn Fn(&SceneNode) -> bool) -> Option<&SceneNode> {
        self.children.iter().find_map(|node| node.find_where(pred))
    }

    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find_map(|node| node.find_mut(id))
    }

    pub fn for_each_node_mut(&mut self, f: &mut dyn FnMut(&mut SceneNode)) {
        for node in &mut self.children {
            node.for_each_mut(f);
        }
    }
}

/// The whole design file, as persisted by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "pluginData")]
    pub plugin_data: PluginData,
    pub pages: Vec<Page>,
}

impl DesignDocument {
    pub fn new(id: &str, name: &str, pages: Vec<Page>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            plugin_data: PluginData::new(),
            pages,
        }
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|page| page.id == id)
    }

    /// Load a document from its JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Write the document back to its JSON file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize document: {}", e))?;
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        tracing::debug!("Saved document to {}", path.display());
        Ok(())
    }
}
