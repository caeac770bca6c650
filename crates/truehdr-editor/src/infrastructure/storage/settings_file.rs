//! Access to `truehdrtweaks.ini` on disk.
//!
//! The tool installs its settings file next to the game's data directory:
//!
//! ```text
//! <game>/                     <- parent of the game data directory
//! ├── truehdrtweaks.ini       <- the file we edit
//! └── sqpack/                 <- game data directory handed to us
//! ```
//!
//! The editor never creates this file.  If it is missing the tool is not
//! installed, and writing a fresh file would only leave a stray INI behind.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the file the display tool reads.
pub const SETTINGS_FILE_NAME: &str = "truehdrtweaks.ini";

/// Something that knows where the game keeps its data files.
///
/// Only consulted once, when the settings path is computed.
pub trait GameDataDir {
    fn data_path(&self) -> &Path;
}

impl GameDataDir for Path {
    fn data_path(&self) -> &Path {
        self
    }
}

impl GameDataDir for PathBuf {
    fn data_path(&self) -> &Path {
        self.as_path()
    }
}

/// Resolves `<parent of game data dir>/<file_name>`.
///
/// A data path without a parent (a filesystem root) is used as-is.
pub fn settings_path<G: GameDataDir + ?Sized>(game: &G, file_name: &str) -> PathBuf {
    let data = game.data_path();
    data.parent().unwrap_or(data).join(file_name)
}

/// Storage port for the settings text.
///
/// The production implementation is [`FsSettingsFile`]; tests use
/// [`super::mock::MemorySettingsFile`] or the generated `MockSettingsFile`.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsFile: Send + Sync {
    /// Where the file lives, for log and error messages.
    fn location(&self) -> PathBuf;
    /// Whether the file exists right now.
    fn exists(&self) -> bool;
    /// Reads the whole file.
    fn read(&self) -> io::Result<String>;
    /// Replaces the whole file.  Must fail rather than create a missing file.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// [`SettingsFile`] backed by a real path.
#[derive(Debug, Clone)]
pub struct FsSettingsFile {
    path: PathBuf,
}

impl FsSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings file that belongs to `game`.
    pub fn for_game<G: GameDataDir + ?Sized>(game: &G, file_name: &str) -> Self {
        Self::new(settings_path(game, file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsFile for FsSettingsFile {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        // No `create(true)`: a file deleted behind our back stays deleted.
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("truehdr_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn test_settings_path_uses_parent_of_data_dir() {
        let data = PathBuf::from("/games/ffxiv/game/sqpack");
        assert_eq!(
            settings_path(&data, SETTINGS_FILE_NAME),
            PathBuf::from("/games/ffxiv/game/truehdrtweaks.ini")
        );
    }

    #[test]
    fn test_settings_path_for_root_stays_at_root() {
        let root = Path::new("/");
        assert_eq!(
            settings_path(root, SETTINGS_FILE_NAME),
            PathBuf::from("/truehdrtweaks.ini")
        );
    }

    #[test]
    fn test_fs_file_reports_missing_file() {
        let dir = scratch_dir();
        let file = FsSettingsFile::new(dir.join(SETTINGS_FILE_NAME));

        assert!(!file.exists());
        assert!(file.read().is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fs_file_write_does_not_create_missing_file() {
        // Arrange
        let dir = scratch_dir();
        let file = FsSettingsFile::new(dir.join(SETTINGS_FILE_NAME));

        // Act
        let result = file.write("[Values]\n");

        // Assert
        assert_eq!(
            result.expect_err("must not create").kind(),
            io::ErrorKind::NotFound
        );
        assert!(!file.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fs_file_write_replaces_contents() {
        // Arrange
        let dir = scratch_dir();
        let path = dir.join(SETTINGS_FILE_NAME);
        fs::write(&path, "[Values]\nQuality=0\nPeakBrightness=1000\n").expect("seed file");
        let file = FsSettingsFile::new(&path);

        // Act
        file.write("[Values]\nQuality=2\n").expect("write");

        // Assert: shorter contents must not leave a tail behind
        assert!(file.exists());
        assert_eq!(file.read().expect("read"), "[Values]\nQuality=2\n");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_for_game_points_next_to_data_dir() {
        let dir = scratch_dir();
        let data = dir.join("sqpack");
        let file = FsSettingsFile::for_game(&data, SETTINGS_FILE_NAME);
        assert_eq!(file.path(), dir.join(SETTINGS_FILE_NAME));
        assert_eq!(file.location(), dir.join(SETTINGS_FILE_NAME));
        fs::remove_dir_all(&dir).ok();
    }
}
