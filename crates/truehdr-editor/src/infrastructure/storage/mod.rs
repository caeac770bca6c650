//! Storage infrastructure: the display tool's INI file and the editor's own
//! configuration.
//!
//! - `settings_file` – the [`SettingsFile`] port and its filesystem adapter.
//! - `mock` – an in-memory [`SettingsFile`] that records writes, for tests.
//! - `config` – the editor's TOML preferences (debounce, comment marker, ...).

pub mod config;
pub mod mock;
pub mod settings_file;

pub use settings_file::{
    settings_path, FsSettingsFile, GameDataDir, SettingsFile, SETTINGS_FILE_NAME,
};
