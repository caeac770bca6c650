//! In-memory settings file for tests.
//!
//! Records every write so tests can assert how many times the store touched
//! "disk" and what it wrote, without needing a real game directory.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use super::settings_file::{SettingsFile, SETTINGS_FILE_NAME};

/// A [`SettingsFile`] held in memory.
pub struct MemorySettingsFile {
    location: PathBuf,
    contents: Mutex<Option<String>>,
    writes: Mutex<Vec<String>>,
}

impl MemorySettingsFile {
    /// A file that exists with the given text.
    pub fn new(contents: &str) -> Self {
        Self {
            location: PathBuf::from("memory").join(SETTINGS_FILE_NAME),
            contents: Mutex::new(Some(contents.to_string())),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// A file that does not exist.
    pub fn missing() -> Self {
        let file = Self::new("");
        *file.contents.lock().expect("lock poisoned") = None;
        file
    }

    /// Current text, or `None` if the file does not exist.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().expect("lock poisoned").clone()
    }

    /// Every text passed to [`SettingsFile::write`], oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("lock poisoned").clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("lock poisoned").len()
    }
}

impl SettingsFile for MemorySettingsFile {
    fn location(&self) -> PathBuf {
        self.location.clone()
    }

    fn exists(&self) -> bool {
        self.contents.lock().expect("lock poisoned").is_some()
    }

    fn read(&self) -> io::Result<String> {
        self.contents()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "memory file missing"))
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut current = self.contents.lock().expect("lock poisoned");
        if current.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "memory file missing",
            ));
        }
        *current = Some(contents.to_string());
        self.writes
            .lock()
            .expect("lock poisoned")
            .push(contents.to_string());
        Ok(())
    }
}
