//! Infrastructure layer: everything that touches the file system.
//!
//! The application layer only sees the [`storage::SettingsFile`] trait, so
//! the debounced writer can be tested against memory instead of a real game
//! install.

pub mod storage;
