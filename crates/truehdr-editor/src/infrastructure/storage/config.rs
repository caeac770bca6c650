//! TOML-based configuration for the editor itself.
//!
//! This is *not* the display tool's INI file.  It holds the editor's own
//! preferences and lives in the platform-appropriate config directory:
//! - Windows:  `%APPDATA%\TrueHDREditor\config.toml`
//! - Linux:    `~/.config/truehdr-editor/config.toml`
//! - macOS:    `~/Library/Application Support/TrueHDREditor/config.toml`
//!
//! Example:
//!
//! ```toml
//! game_data_dir = "C:/Games/FINAL FANTASY XIV/game/sqpack"
//! debounce_ms = 500
//! auto_write = true
//! log_level = "debug"
//! ```
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default ...)]`, so an empty file, a missing
//! file and a file written by an older version all load successfully.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use truehdr_core::IniOptions;

use crate::application::settings_store::StoreOptions;
use crate::infrastructure::storage::settings_file::SETTINGS_FILE_NAME;

/// Error type for editor configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Editor preferences stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Game data directory; the settings file sits in its parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_data_dir: Option<PathBuf>,
    /// Name of the display tool's INI file.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Comment marker used when parsing the INI file.
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,
    /// Quiet period before a requested save hits the disk.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Whether every change schedules a save automatically.
    #[serde(default)]
    pub auto_write: bool,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_file_name() -> String {
    SETTINGS_FILE_NAME.to_string()
}
fn default_comment_marker() -> String {
    "#".to_string()
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            game_data_dir: None,
            file_name: default_file_name(),
            comment_marker: default_comment_marker(),
            debounce_ms: default_debounce_ms(),
            auto_write: false,
            log_level: default_log_level(),
        }
    }
}

impl EditorConfig {
    /// Options for the settings store derived from this config.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            ini: IniOptions {
                comment_marker: self.comment_marker.clone(),
            },
            auto_write: self.auto_write,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<EditorConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EditorConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads the config from an explicit path, or from the platform default.
///
/// Without an explicit path and without a platform config directory the
/// defaults are used.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config(explicit: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    match explicit {
        Some(path) => load_config_from(path),
        None => match config_file_path() {
            Ok(path) => load_config_from(&path),
            Err(ConfigError::NoPlatformConfigDir) => Ok(EditorConfig::default()),
            Err(e) => Err(e),
        },
    }
}

/// Resolves the platform config directory for the editor.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("TrueHDREditor"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("truehdr-editor"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("TrueHDREditor")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_tool_conventions() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.file_name, "truehdrtweaks.ini");
        assert_eq!(cfg.comment_marker, "#");
        assert_eq!(cfg.debounce_ms, 500);
        assert!(!cfg.auto_write);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.game_data_dir.is_none());
    }

    #[test]
    fn test_store_options_carry_debounce_and_marker() {
        // Arrange
        let cfg = EditorConfig {
            debounce_ms: 250,
            comment_marker: ";".to_string(),
            auto_write: true,
            ..EditorConfig::default()
        };

        // Act
        let options = cfg.store_options();

        // Assert
        assert_eq!(options.debounce, Duration::from_millis(250));
        assert_eq!(options.ini.comment_marker, ";");
        assert!(options.auto_write);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: EditorConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, EditorConfig::default());
    }

    #[test]
    fn test_deserialize_partial_toml_overrides_defaults() {
        // Arrange
        let toml_str = r#"
game_data_dir = "/games/ffxiv/game/sqpack"
auto_write = true
"#;

        // Act
        let cfg: EditorConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(
            cfg.game_data_dir,
            Some(PathBuf::from("/games/ffxiv/game/sqpack"))
        );
        assert!(cfg.auto_write);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.debounce_ms, 500);
    }

    #[test]
    fn test_serialize_omits_unset_game_dir() {
        let toml_str = toml::to_string_pretty(&EditorConfig::default()).expect("serialize");
        assert!(!toml_str.contains("game_data_dir"));
        let restored: EditorConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(restored, EditorConfig::default());
    }

    #[test]
    fn test_load_config_from_missing_file_returns_defaults() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, EditorConfig::default());
    }

    #[test]
    fn test_load_config_from_invalid_toml_returns_parse_error() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("truehdr_cfg_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_file_round_trip() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("truehdr_cfg_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "debounce_ms = 50\nlog_level = \"debug\"\n").unwrap();

        // Act
        let cfg = load_config(Some(&path)).expect("load");

        // Assert
        assert_eq!(cfg.debounce_ms, 50);
        assert_eq!(cfg.log_level, "debug");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
        // NoPlatformConfigDir in a stripped CI env is also acceptable.
    }
}
