//! Configuration persistence for snapmark settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::annotations::history::HISTORY_DEPTH;
use crate::capture::export::{DEFAULT_QUALITY, ExportFormat};
use crate::domain::StylePalette;

/// Save location for screenshots (Pictures or Documents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapmarkConfig {
    /// Style defaults for newly created annotations
    pub palette: StylePalette,
    /// Where to save exported screenshots
    pub save_location: SaveLocation,
    /// Format used when the output path has no recognizable extension
    pub export_format: ExportFormat,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Maximum number of undo steps kept per session
    pub history_depth: usize,
}

impl Default for SnapmarkConfig {
    fn default() -> Self {
        Self {
            palette: StylePalette::default(),
            save_location: SaveLocation::Pictures,
            export_format: ExportFormat::Png,
            jpeg_quality: DEFAULT_QUALITY,
            history_depth: HISTORY_DEPTH,
        }
    }
}

impl SnapmarkConfig {
    /// Configuration directory name
    pub const ID: &'static str = "snapmark";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        if self.history_depth == 0 {
            log::warn!("history_depth of 0 is not allowed, using {}", HISTORY_DEPTH);
            self.history_depth = HISTORY_DEPTH;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NumberingStyle;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapmark").join("config.json");

        let mut config = SnapmarkConfig::default();
        config.palette.counter_style = NumberingStyle::Roman;
        config.export_format = ExportFormat::Jpeg;
        config.save_to(&path).unwrap();

        let loaded = SnapmarkConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "jpeg_quality": 250, "palette": { "stroke_width": 7.0 } }"#)
            .unwrap();

        let loaded = SnapmarkConfig::load_from(&path).unwrap();
        assert_eq!(loaded.jpeg_quality, 100);
        assert_eq!(loaded.palette.stroke_width, 7.0);
        assert_eq!(loaded.palette.pixel_block_size, 16);
        assert_eq!(loaded.history_depth, HISTORY_DEPTH);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SnapmarkConfig::load_from(&path).is_err());
    }
}
