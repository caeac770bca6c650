//! Application layer use cases for the settings editor.
//!
//! Code here orchestrates the core INI model against the storage port
//! ([`crate::infrastructure::storage::SettingsFile`]).  It performs no direct
//! file system calls of its own.
//!
//! # Sub-modules
//!
//! - **`settings_store`** – Owns the loaded document: typed get/set access,
//!   dirty tracking, and the debounced write-back.  This is the only place
//!   that schedules disk writes.
//!
//! - **`commands`** – Text-level operations used by the CLI: resolve a
//!   setting by name, parse user input for it, describe its current value.

pub mod commands;
pub mod settings_store;
