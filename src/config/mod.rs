use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_SERVER_URL;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_frame_count() -> u64 {
    1
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Base URL of the review server the overlay talks to
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Last opened document (not auto-loaded, just remembered for quick access)
    #[serde(default)]
    pub last_document: Option<PathBuf>,

    /// Number of reviewable frames in the current document sequence
    #[serde(default = "default_frame_count")]
    pub frame_count: u64,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            last_document: None,
            frame_count: default_frame_count(),
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to change the review server base URL
#[derive(Message)]
pub struct SetServerUrlRequest {
    pub url: String,
}

/// Message to update the last opened document in config
#[derive(Message)]
pub struct UpdateLastDocumentRequest {
    pub path: PathBuf,
}

/// Result of loading config from disk
struct LoadConfigResult {
    config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = crate::paths::config_file();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        AppConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path,
            dirty: false,
        },
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.config.data;
    config.config_path = result.config.config_path;
    config.dirty = result.config.dirty;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to change the review server URL
fn set_server_url_system(
    mut events: MessageReader<SetServerUrlRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.server_url = event.url.trim_end_matches('/').to_string();
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        info!("Review server set to {}", config.data.server_url);
    }
}

/// System to update the last opened document path
fn update_last_document_system(
    mut events: MessageReader<UpdateLastDocumentRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.last_document = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<SetServerUrlRequest>()
            .add_message::<UpdateLastDocumentRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    set_server_url_system.run_if(on_message::<SetServerUrlRequest>),
                    update_last_document_system.run_if(on_message::<UpdateLastDocumentRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.server_url, DEFAULT_SERVER_URL);
        assert!(data.last_document.is_none());
        assert_eq!(data.frame_count, 1);
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            server_url: "https://review.example.com/api".to_string(),
            last_document: Some(PathBuf::from("/scans/page-04.png")),
            frame_count: 12,
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.server_url, data.server_url);
        assert_eq!(parsed.last_document, data.last_document);
        assert_eq!(parsed.frame_count, data.frame_count);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let parsed: AppConfigData = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.server_url, DEFAULT_SERVER_URL);
        assert_eq!(parsed.frame_count, 1);
    }
}
