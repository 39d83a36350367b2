//! Sync configuration persistence
//!
//! Stores user preferences in `~/.config/phrase-sync/config.yaml`

use serde::{Deserialize, Serialize};

/// Configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Origin used when a credential has no custom origin
    #[serde(default = "default_origin")]
    pub default_origin: String,
    /// Path prefix of the phrase API below the origin
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// How long transient notifications stay visible
    #[serde(default = "default_notification_timeout_ms")]
    pub notification_timeout_ms: u64,
}

fn default_origin() -> String {
    "https://app.phrase-sync.dev".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_notification_timeout_ms() -> u64 {
    4000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_origin: default_origin(),
            api_prefix: default_api_prefix(),
            notification_timeout_ms: default_notification_timeout_ms(),
        }
    }
}

impl SyncConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
