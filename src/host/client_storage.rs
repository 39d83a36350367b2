//! User-scoped storage shared across design files
//!
//! Backed by a JSON map in the user config directory, or by memory in tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Cross-file string storage owned by the current user
pub trait ClientStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), String>;
    fn remove(&mut self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryClientStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryClientStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryClientStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Client storage persisted as one JSON object on disk
///
/// Every write rewrites the whole file, so a reader never sees a half-updated
/// entry.
#[derive(Debug, Clone)]
pub struct FileClientStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileClientStorage {
    /// Open storage at `path`. A missing or unreadable file starts empty.
    pub fn open(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed client storage at {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// Open the storage under the user config directory
    pub fn open_default() -> Result<Self, String> {
        let path = crate::config_paths::client_storage_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        crate::config_paths::ensure_config_dir()?;
        Ok(Self::open(path))
    }

    fn flush(&self) -> Result<(), String> {
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize client storage: {}", e))?;
        std::fs::write(&self.path, content)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}

impl ClientStorage for FileClientStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        self.entries.remove(key);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");

        let mut storage = FileClientStorage::open(path.clone());
        storage.set("credentials", "[]".to_string()).unwrap();

        let reopened = FileClientStorage::open(path);
        assert_eq!(reopened.get("credentials").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_storage_malformed_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileClientStorage::open(path);
        assert_eq!(storage.get("credentials"), None);
    }
}
