//! INI text parser.
//!
//! Accepted syntax:
//!
//! ```text
//! # comment                (marker configurable, see IniOptions)
//! [Section]                (optionally followed by a comment)
//! Key = Value  # note      (whitespace around key and value is ignored)
//! ```
//!
//! Anything else is rejected with the offending line number rather than
//! being silently skipped: the file is hand-edited and a typo should be
//! reported, not lost on the next write.
//!
//! Parsing runs in two passes.  A line scan classifies every line, checks
//! the rules above and records where each entry's value starts.  The
//! remaining headers and entries are then read by [`ini::Ini`], whose
//! values decide where each value ends.  A `#` or `;` preceded by
//! whitespace starts an inline comment; it is kept in the line's tail.

use std::collections::HashSet;

use ::ini::{Ini, ParseOption};
use thiserror::Error;
use tracing::debug;

use crate::ini::document::{IniDocument, IniOptions, Line, LineEnding};

/// What went wrong on a malformed line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IniErrorKind {
    /// `[` without a matching `]`.
    #[error("section header is missing a closing ']'")]
    UnterminatedSection,

    /// `[]` or `[   ]`.
    #[error("section name is empty")]
    EmptySectionName,

    /// Text after `]` that is not a comment.
    #[error("unexpected text after section header: {0:?}")]
    TrailingText(String),

    /// A non-comment line without `=`.
    #[error("expected 'key=value', found {0:?}")]
    MissingSeparator(String),

    /// `=value` with nothing before the separator.
    #[error("key is empty")]
    EmptyKey,

    /// The same `[section]` header appears twice.
    #[error("duplicate section [{0}]")]
    DuplicateSection(String),

    /// The same key appears twice in one section.
    #[error("duplicate key {key:?} in section [{section}]")]
    DuplicateKey { section: String, key: String },

    /// Rejected by the INI reader.
    #[error("{0}")]
    Syntax(String),

    /// The reader split this line into a different key or value.
    #[error("cannot read a value for key {0:?}")]
    Unreadable(String),
}

/// A parse failure with its 1-based line number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct IniError {
    pub line: usize,
    pub kind: IniErrorKind,
}

impl IniError {
    fn new(line: usize, kind: IniErrorKind) -> Self {
        Self { line, kind }
    }
}

impl From<::ini::ParseError> for IniError {
    fn from(err: ::ini::ParseError) -> Self {
        Self::new(err.line, IniErrorKind::Syntax(err.msg.to_string()))
    }
}

/// An entry whose value span is still unknown.
struct PendingEntry {
    index: usize,
    number: usize,
    section: String,
}

/// Quotes and backslashes are ordinary value characters in this file.
fn reader_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Parses `text` into an [`IniDocument`].
pub(crate) fn parse(text: &str, options: &IniOptions) -> Result<IniDocument, IniError> {
    let (bom, body) = match text.strip_prefix('\u{feff}') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut doc = IniDocument {
        lines: Vec::new(),
        line_ending: if body.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        },
        trailing_newline: body.ends_with('\n'),
        bom,
    };

    let marker = options.comment_marker.as_str();
    let is_comment = |s: &str| !marker.is_empty() && s.starts_with(marker);

    let mut section = String::new();
    let mut seen_sections: HashSet<String> = HashSet::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut pending: Vec<PendingEntry> = Vec::new();
    // One reader line per source line, so reader errors keep their numbers.
    let mut reader_text: Vec<String> = Vec::new();

    for (index, raw) in body.lines().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || is_comment(trimmed) {
            doc.lines.push(Line::Verbatim(raw.to_string()));
            reader_text.push(String::new());
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let Some(close) = rest.find(']') else {
                return Err(IniError::new(number, IniErrorKind::UnterminatedSection));
            };
            let name = rest[..close].trim();
            let after = rest[close + 1..].trim();
            if name.is_empty() {
                return Err(IniError::new(number, IniErrorKind::EmptySectionName));
            }
            if !after.is_empty() && !is_comment(after) {
                return Err(IniError::new(
                    number,
                    IniErrorKind::TrailingText(after.to_string()),
                ));
            }
            if !seen_sections.insert(name.to_string()) {
                return Err(IniError::new(
                    number,
                    IniErrorKind::DuplicateSection(name.to_string()),
                ));
            }
            section = name.to_string();
            seen_keys.clear();
            doc.lines.push(Line::Header {
                name: name.to_string(),
                raw: raw.to_string(),
            });
            reader_text.push(format!("[{name}]"));
            continue;
        }

        let Some((key_part, value_part)) = raw.split_once('=') else {
            return Err(IniError::new(
                number,
                IniErrorKind::MissingSeparator(trimmed.to_string()),
            ));
        };
        let key = key_part.trim();
        if key.is_empty() {
            return Err(IniError::new(number, IniErrorKind::EmptyKey));
        }
        if !seen_keys.insert(key.to_string()) {
            return Err(IniError::new(
                number,
                IniErrorKind::DuplicateKey {
                    section: section.clone(),
                    key: key.to_string(),
                },
            ));
        }

        // Byte offset of the value inside `raw`; the end comes from the reader.
        let value_start =
            key_part.len() + 1 + (value_part.len() - value_part.trim_start().len());

        pending.push(PendingEntry {
            index: doc.lines.len(),
            number,
            section: section.clone(),
        });
        doc.lines.push(Line::Entry {
            key: key.to_string(),
            value: String::new(),
            lead: raw[..value_start].to_string(),
            trail: raw[value_start..].to_string(),
        });
        reader_text.push(format!("{key}={value_part}"));
    }

    let reader = Ini::load_from_str_opt(&reader_text.join("\n"), reader_options())?;

    for entry in &pending {
        let Line::Entry {
            key, value, trail, ..
        } = &mut doc.lines[entry.index]
        else {
            continue;
        };
        let name = (!entry.section.is_empty()).then_some(entry.section.as_str());
        let read = reader
            .section(name)
            .and_then(|props| props.get(key.as_str()))
            .filter(|read| trail.starts_with(*read));
        let Some(read) = read else {
            return Err(IniError::new(
                entry.number,
                IniErrorKind::Unreadable(key.clone()),
            ));
        };
        *value = read.to_string();
        *trail = trail[read.len()..].to_string();
    }

    debug!(
        lines = doc.lines.len(),
        sections = seen_sections.len(),
        "parsed ini document"
    );
    Ok(doc)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
