//! Configuration system tests
//!
//! Tests for config paths and sync config loading.

use phrase_sync::config::SyncConfig;
use phrase_sync::config_paths;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_returns_some() {
    assert!(config_paths::config_dir().is_some());
}

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("phrase-sync"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert!(path.to_string_lossy().ends_with("config.yaml"));
}

#[test]
fn test_client_storage_is_subdir_of_config() {
    let config = config_paths::config_dir().unwrap();
    let storage = config_paths::client_storage_file().unwrap();
    assert!(storage.starts_with(&config));
    assert!(storage.to_string_lossy().ends_with(".json"));
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    let config = config_paths::config_dir().unwrap();
    let logs = config_paths::logs_dir().unwrap();
    assert!(logs.starts_with(&config));
}

// ========================================================================
// Sync Config Tests
// ========================================================================

#[test]
fn test_default_config() {
    let config = SyncConfig::default();
    assert_eq!(config.api_prefix, "/api/v1");
    assert_eq!(config.notification_timeout_ms, 4000);
    assert!(config.default_origin.starts_with("https://"));
}

#[test]
fn test_config_serialize_deserialize() {
    let config = SyncConfig {
        default_origin: "https://cms.local".to_string(),
        ..SyncConfig::default()
    };
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: SyncConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_partial_config_fills_defaults() {
    let parsed = SyncConfig::parse("notification_timeout_ms: 1500\n").unwrap();
    assert_eq!(parsed.notification_timeout_ms, 1500);
    assert_eq!(parsed.api_prefix, SyncConfig::default().api_prefix);
}

#[test]
fn test_malformed_config_is_an_error() {
    assert!(SyncConfig::parse("notification_timeout_ms: [").is_err());
}
