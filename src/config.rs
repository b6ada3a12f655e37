//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving configuration in TOML
//! format with platform-specific directory resolution. Everything here is
//! read once at startup; the controller itself has no runtime settings.

use crate::keymap::Keymap;
use crate::leds::LedPins;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keymap selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeymapConfig {
    /// JSON5 keymap file (built-in DataHand Dvorak layout when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter (e.g. "info", "debug", "datahand_layers=trace")
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Default log level ("info")
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/DatahandLayers/config.toml`
/// - macOS: `~/Library/Application Support/DatahandLayers/config.toml`
/// - Windows: `%APPDATA%\DatahandLayers\config.toml`
///
/// # Validation
///
/// - LED pin bits must be 0-7 and distinct within the mode and lock groups
/// - `keymap.path` must exist if set (relative paths are resolved against
///   the directory holding the config file)
/// - `logging.level` must not be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Indicator pin assignment
    #[serde(default)]
    pub leds: LedPins,
    /// Keymap selection
    #[serde(default)]
    pub keymap: KeymapConfig,
    /// Logging preferences
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("DatahandLayers");

        Ok(config_dir)
    }

    /// Gets the full path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the default
    /// configuration; a missing file given explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default_path = Self::config_file_path()?;
                if default_path.exists() {
                    Self::load_from(&default_path)
                } else {
                    debug!(path = %default_path.display(), "no config file, using defaults");
                    Ok(Self::new())
                }
            }
        }
    }

    /// Loads and validates a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }

        config
            .validate()
            .context(format!("Invalid config file: {}", path.display()))?;

        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Makes a relative `keymap.path` relative to `base` (the config file's directory).
    fn resolve_relative_paths(&mut self, base: &Path) {
        if let Some(keymap) = &mut self.keymap.path {
            if keymap.is_relative() {
                *keymap = base.join(&*keymap);
            }
        }
    }

    /// Saves configuration using atomic write (temp file + rename).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        self.leds.validate()?;

        if let Some(path) = &self.keymap.path {
            if !path.exists() {
                anyhow::bail!("Keymap file does not exist: {}", path.display());
            }
        }

        if self.logging.level.trim().is_empty() {
            anyhow::bail!("Logging level cannot be empty");
        }

        Ok(())
    }

    /// Loads the configured keymap, or the built-in one.
    pub fn load_keymap(&self) -> Result<Keymap> {
        Keymap::load_or_builtin(self.keymap.path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.leds, LedPins::default());
        assert_eq!(config.keymap.path, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.leds, LedPins::default());
    }

    #[test]
    fn test_config_rejects_duplicate_pins() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[leds]\nmode_normal = 1\nmode_tenkey = 1\nmode_fn = 2\nmode_nas = 3\n\
             lock_num = 0\nlock_caps = 1\nlock_scroll = 2\n",
        )
        .unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("mode_tenkey"));
    }

    #[test]
    fn test_config_rejects_missing_keymap_file() {
        let mut config = Config::new();
        config.keymap.path = Some(PathBuf::from("/nonexistent/layout.json5"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_explicit_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.leds.lock_num = 0;
        config.logging.level = "warn".to_string();
        config.save_to(&path).unwrap();

        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_keymap_defaults_to_builtin() {
        let keymap = Config::new().load_keymap().unwrap();
        assert_eq!(keymap.name(), "datahand-dvorak");
    }

    #[test]
    fn test_relative_keymap_path_resolves_against_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let keymap_dir = temp_dir.path().join("keymaps");
        fs::create_dir_all(&keymap_dir).unwrap();
        fs::write(
            keymap_dir.join("two.json5"),
            r#"{
                name: "two-key",
                layers: {
                    NORMAL: ["NS", "KC_A"],
                    GAME: ["_______", "KC_B"],
                    FUNCTION_MOUSE: ["_______", "KC_C"],
                    NAS: ["_______", "KC_1"],
                    NAS_NUMLOCK: ["_______", "KC_KP_1"],
                },
            }"#,
        )
        .unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[keymap]\npath = \"keymaps/two.json5\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.keymap.path, Some(keymap_dir.join("two.json5")));
        assert_eq!(config.load_keymap().unwrap().name(), "two-key");
    }

    #[test]
    fn test_absolute_keymap_path_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let keymap = temp_dir.path().join("layout.json5");
        fs::write(&keymap, "{}").unwrap();

        let mut config = Config::new();
        config.keymap.path = Some(keymap.clone());
        config.resolve_relative_paths(Path::new("/elsewhere"));
        assert_eq!(config.keymap.path, Some(keymap));
    }
}
