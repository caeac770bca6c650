//! # truehdr-core
//!
//! Shared library for the TrueHDR Tweaks settings editor containing the INI
//! document model and the table of typed setting fields.
//!
//! This crate has zero dependencies on the file system, async runtimes, or
//! user interfaces.  It only turns text into a document, a document back into
//! text, and raw strings into typed values.
//!
//! # Architecture overview (for beginners)
//!
//! The display-tweaking tool reads its options from a small INI file called
//! `truehdrtweaks.ini`.  Every option is stored as plain text (`Quality=2`,
//! `Contrast=0.85`), so anything that wants to edit it safely needs two pieces:
//!
//! - **`ini`** – A line-preserving INI document.  Parsing keeps every comment,
//!   blank line and unknown section so that rewriting the file only changes
//!   the values that were actually edited.
//!
//! - **`domain`** – The typed view of the `[Values]` section: enums for the
//!   mode settings, integer and float projections for the tuning knobs, and
//!   the `-1` sentinel that switches an option off.

pub mod domain;
pub mod ini;

// Re-export the most-used types at the crate root so callers can write
// `truehdr_core::IniDocument` instead of `truehdr_core::ini::document::IniDocument`.
pub use domain::fields::{Field, SettingKey, ToggleField, VALUES_SECTION};
pub use domain::settings::{
    FieldError, FieldValue, HdrDisplayMode, HdrVisualization, IndicatorHud, Quality, Sentinel,
};
pub use ini::document::{IniDocument, IniOptions, LineEnding};
pub use ini::parser::{IniError, IniErrorKind};
