//! INI document model: parser and verbatim-preserving serializer.
//!
//! The tool that owns `truehdrtweaks.ini` ships the file with explanatory
//! comments next to each option.  Values are read with `rust-ini`, but its
//! writer emits a fresh file from the key map and drops those comments, so
//! the document here keeps the original text of every line and only
//! re-renders entries whose value changed.

pub mod document;
pub mod parser;

pub use document::{IniDocument, IniOptions, LineEnding};
pub use parser::{IniError, IniErrorKind};
