//! Where phrase-sync keeps its config, client storage and logs

use std::{env, fs, path::PathBuf};

const APP_DIR: &str = "phrase-sync";

/// `$XDG_CONFIG_HOME/phrase-sync`, `~/.config/phrase-sync` or `%APPDATA%\phrase-sync`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// Optional YAML overrides for [`crate::config::SyncConfig`]
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// User-scoped key/value store holding the credential set
pub fn client_storage_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("client-storage.json"))
}

/// Daily rolling log files
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure(dir: Option<PathBuf>) -> Result<PathBuf, String> {
    let dir = dir.ok_or_else(|| "No config directory available".to_string())?;
    fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    Ok(dir)
}

pub fn ensure_config_dir() -> Result<PathBuf, String> {
    ensure(config_dir())
}

pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    ensure(logs_dir())
}
