//! End-to-end tests of the settings store against a real file.
//!
//! Each test builds a throwaway game directory under the system temp dir:
//!
//! ```text
//! <tmp>/truehdr_it_<uuid>/
//! ├── truehdrtweaks.ini
//! └── sqpack/
//! ```
//!
//! Time is paused, so the 500 ms debounce window costs nothing.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use truehdr_core::{HdrDisplayMode, Quality};
use truehdr_editor::application::commands;
use truehdr_editor::application::settings_store::{
    SaveOutcome, SettingsStore, StoreError, StoreOptions,
};
use truehdr_editor::infrastructure::storage::{FsSettingsFile, SETTINGS_FILE_NAME};

const SAMPLE: &str = "\
# TrueHDR Tweaks settings
# Values of -1 disable the option.
[Values]
Quality=0
HDRDisplayMode=1
HDRVisualization=0
PeakBrightness=-1
Paperwhite=-1
Contrast=-1
Saturation=-1
Strength=-1
Gamma=-1
SDRBrightness=-1
EnableIndicatorHUD=-1

[Advanced]
ForceFP16=1
";

struct GameDir {
    root: PathBuf,
}

impl GameDir {
    fn with_settings(text: Option<&str>) -> Self {
        let root = std::env::temp_dir().join(format!("truehdr_it_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(root.join("sqpack")).expect("create game dir");
        if let Some(text) = text {
            fs::write(root.join(SETTINGS_FILE_NAME), text).expect("seed settings");
        }
        Self { root }
    }

    fn data_dir(&self) -> PathBuf {
        self.root.join("sqpack")
    }

    fn settings(&self) -> String {
        fs::read_to_string(self.root.join(SETTINGS_FILE_NAME)).expect("read settings")
    }

    fn store(&self, options: StoreOptions) -> SettingsStore {
        let file = Arc::new(FsSettingsFile::for_game(&self.data_dir(), SETTINGS_FILE_NAME));
        SettingsStore::new(file, options).expect("inside runtime")
    }
}

impl Drop for GameDir {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}

#[tokio::test(start_paused = true)]
async fn test_edit_and_save_round_trip_on_disk() {
    // Arrange
    let game = GameDir::with_settings(Some(SAMPLE));
    let store = game.store(StoreOptions::default());
    store.load().expect("load");

    // Act
    assert!(store.set_quality(Quality::High));
    assert!(store.dirty());
    let outcome = store.save().wait().await.expect("save");

    // Assert
    assert_eq!(outcome, SaveOutcome::Written);
    assert!(!store.dirty());
    let expected = SAMPLE.replace("Quality=0", "Quality=2");
    assert_eq!(game.settings(), expected);
}

#[tokio::test(start_paused = true)]
async fn test_auto_write_burst_produces_final_state_only() {
    // Arrange
    let game = GameDir::with_settings(Some(SAMPLE));
    let store = game.store(StoreOptions {
        auto_write: true,
        ..StoreOptions::default()
    });
    store.load().expect("load");

    // Act: a slider drag
    for step in 0..=20 {
        store.set_contrast(0.5 + step as f32 * 0.025);
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
    let before_window = game.settings();
    tokio::time::sleep(Duration::from_millis(600)).await;

    // Assert
    assert_eq!(before_window, SAMPLE);
    let written = game.settings();
    assert!(written.contains("Contrast=1.00\n"), "got:\n{written}");
    assert!(written.contains("[Advanced]\nForceFP16=1\n"));
    assert!(!store.dirty());
}

#[tokio::test(start_paused = true)]
async fn test_enable_then_disable_peak_brightness() {
    let game = GameDir::with_settings(Some(SAMPLE));
    let store = game.store(StoreOptions::default());
    store.load().expect("load");

    store.set_peak_brightness_enabled(true);
    assert_eq!(store.peak_brightness().unwrap(), 1000);
    store.flush().expect("flush");
    assert!(game.settings().contains("PeakBrightness=1000\n"));

    store.set_peak_brightness_enabled(false);
    store.flush().expect("flush");
    assert!(game.settings().contains("PeakBrightness=-1\n"));
}

#[tokio::test]
async fn test_missing_settings_file_is_never_created() {
    // Arrange: tool not installed
    let game = GameDir::with_settings(None);
    let store = game.store(StoreOptions::default());

    // Act
    let result = store.load();

    // Assert
    assert!(!store.available());
    assert!(matches!(result, Err(StoreError::FileNotFound { .. })));
    assert!(!store.set_quality(Quality::High));
    assert!(!store.flush().expect("nothing to flush"));
    assert!(!game.root.join(SETTINGS_FILE_NAME).exists());
}

#[tokio::test(start_paused = true)]
async fn test_file_deleted_before_save_is_reported() {
    // Arrange
    let game = GameDir::with_settings(Some(SAMPLE));
    let store = game.store(StoreOptions::default());
    store.load().expect("load");
    store.set_gamma(2.2);
    fs::remove_file(game.root.join(SETTINGS_FILE_NAME)).expect("delete");

    // Act
    let result = store.save().wait().await;

    // Assert
    assert!(matches!(result, Err(StoreError::Io { .. })));
    assert!(store.last_error().is_some());
    assert!(!game.root.join(SETTINGS_FILE_NAME).exists());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_command_then_flush_persists_mode() {
    let game = GameDir::with_settings(Some(SAMPLE));
    let store = game.store(StoreOptions::default());
    store.load().expect("load");

    let mode = commands::toggle_display_mode(&store).expect("toggle");
    store.flush().expect("flush");

    assert_eq!(mode, HdrDisplayMode::Sdr);
    assert!(game.settings().contains("HDRDisplayMode=0\n"));
}

#[tokio::test(start_paused = true)]
async fn test_crlf_file_keeps_its_line_endings() {
    let crlf = SAMPLE.replace('\n', "\r\n");
    let game = GameDir::with_settings(Some(&crlf));
    let store = game.store(StoreOptions::default());
    store.load().expect("load");

    store.set_sdr_brightness_enabled(true);
    store.save().wait().await.expect("save");

    assert_eq!(
        game.settings(),
        crlf.replace("SDRBrightness=-1", "SDRBrightness=150")
    );
}
