//! Host surface the engine runs against
//!
//! Models the design file (pages, nodes, text), the fonts the host can load,
//! and the two kinds of persistent storage it offers: per-object plugin data
//! and user-scoped client storage.

pub mod client_storage;
pub mod document;
pub mod plugin_data;

pub use client_storage::{ClientStorage, FileClientStorage, MemoryClientStorage};
pub use document::{
    DesignDocument, FontName, FontRegistry, NodeId, NodeKind, Page, PageId, SceneNode,
    TextContent,
};
pub use plugin_data::PluginData;
