//! Domain types for the TrueHDR Tweaks settings.
//!
//! # What lives here? (for beginners)
//!
//! The INI file only knows strings.  The domain layer knows that `Quality`
//! is one of three levels, that `Contrast` is a float written with two
//! decimals, and that `-1` means "leave this option to the tool's default".
//!
//! - **`settings`** – The value types (`Quality`, `HdrDisplayMode`, ...) and
//!   the [`settings::FieldValue`] trait that converts them to and from raw
//!   strings.
//!
//! - **`fields`** – The table of well-known keys inside `[Values]`, including
//!   the default written when a toggleable option is switched on.

pub mod fields;
pub mod settings;
