//! Client configuration
//!
//! Window, asset paths, frame rate and panel layout, loaded from JSON with
//! a default for every key.

use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ClientError;
use crate::ui::UiLayout;
use crate::world::DEFAULT_TILE_SIZE;

/// Client settings, read from JSON
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// { "width": 1280, "height": 720, "fps": 30 }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// 0xRRGGBB clear colour
    pub background_color: u32,
    pub asset_manifest: PathBuf,
    pub scenario: PathBuf,
    /// Pixels per grid cell
    pub tile_size: f32,
    /// Target frame rate; also the unit of the frame delta
    pub fps: u32,
    pub ui_layout: UiLayout,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            title: "Tactics".to_string(),
            width: 1600,
            height: 900,
            background_color: 0x1099bb,
            asset_manifest: PathBuf::from("assets/manifest.json"),
            scenario: PathBuf::from("assets/scenario.json"),
            tile_size: DEFAULT_TILE_SIZE,
            fps: 60,
            ui_layout: UiLayout::default(),
        }
    }
}

impl ClientConfig {
    /// Default location: `<config dir>/tactics-client/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tactics-client").join("config.json"))
    }

    /// Loads `explicit` if given, else the default location
    ///
    /// A missing file means defaults. A file that exists but does not
    /// parse is an error.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ClientError> {
        let Some(path) = explicit.or_else(Self::default_path) else {
            info!("No config directory on this platform, using defaults");
            return Ok(Self::default());
        };
        Self::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Converts wall-clock seconds into frames at the target rate
    pub fn frame_delta(&self, elapsed_secs: f32) -> f32 {
        elapsed_secs * self.fps as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tactics-client-{}-{}.json",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();

        assert_eq!((config.width, config.height), (1600, 900));
        assert_eq!(config.background_color, 0x1099bb);
        assert_eq!(config.tile_size, 32.0);
        assert_eq!(config.fps, 60);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("tactics-client-does-not-exist.json");

        let config = ClientConfig::load(Some(path)).unwrap();

        assert_eq!(config.width, 1600);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let path = temp_file("partial", r#"{ "fps": 30, "ui_layout": { "pad_spacing": 50.0 } }"#);

        let config = ClientConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.fps, 30);
        assert_eq!(config.ui_layout.pad_spacing, 50.0);
        assert_eq!(config.height, 900);
        assert_eq!(config.scenario, PathBuf::from("assets/scenario.json"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_file("malformed", "{ width: ");

        let result = ClientConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ClientError::Json(_))));
    }

    #[test]
    fn test_frame_delta() {
        let config = ClientConfig::default();

        assert_eq!(config.frame_delta(1.0 / 60.0 * 2.0).round(), 2.0);
        assert_eq!(config.frame_delta(0.5), 30.0);
    }
}
