//! Per-object plugin data
//!
//! The host attaches a small string map to the document, to every page and to
//! every node. It is the only durable storage the engine has.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// String key/value map stored on a host object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginData(BTreeMap<String, String>);

impl PluginData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a key. Empty values are treated as absent, like the host does.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.0.remove(key);
        } else {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
