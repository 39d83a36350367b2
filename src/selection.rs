//! Selection traversal
//!
//! Turns the current selection into the flat list of text nodes a command
//! operates on. Ordinary containers are expanded recursively; component
//! instances are opaque so shared component copy is never mass-edited.

use std::collections::HashSet;

use crate::host::{NodeId, Page, SceneNode};

/// Text nodes found for a selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Text node ids, depth-first in document order
    pub leaves: Vec<NodeId>,
    /// True when at least one container had to be expanded
    pub traversed: bool,
}

/// Collect the text nodes relevant to `selection` on `page`
///
/// Unknown ids are skipped. A text node reached twice (selected directly and
/// through an ancestor) is reported once.
pub fn traverse(page: &Page, selection: &[NodeId]) -> Traversal {
    let mut traversal = Traversal::default();
    let mut seen = HashSet::new();

    for id in selection {
        let Some(node) = page.find_node(id) else {
            tracing::trace!("Selected node {} not found on page {}", id, page.id);
            continue;
        };
        if node.is_text() {
            push_leaf(&mut traversal, &mut seen, node);
        } else if !node.is_instance() {
            traversal.traversed = true;
            collect(node.children(), &mut traversal, &mut seen);
        }
    }

    traversal
}

/// Every text node on the page, skipping instance contents
pub fn all_text_leaves(page: &Page) -> Vec<NodeId> {
    let mut traversal = Traversal::default();
    let mut seen = HashSet::new();
    collect(&page.children, &mut traversal, &mut seen);
    traversal.leaves
}

fn collect(nodes: &[SceneNode], traversal: &mut Traversal, seen: &mut HashSet<NodeId>) {
    for node in nodes {
        if node.is_text() {
            push_leaf(traversal, seen, node);
        } else if !node.is_instance() {
            collect(node.children(), traversal, seen);
        }
    }
}

fn push_leaf(traversal: &mut Traversal, seen: &mut HashSet<NodeId>, node: &SceneNode) {
    if seen.insert(node.id.clone()) {
        traversal.leaves.push(node.id.clone());
    }
}
