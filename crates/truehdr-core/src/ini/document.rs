//! Line-preserving INI document.
//!
//! An [`IniDocument`] is an ordered list of lines.  Each line is one of:
//!
//! ```text
//! # comment or blank line      -> kept byte-for-byte
//! [Section]                    -> header, kept byte-for-byte
//! Key = Value                  -> entry; the text around the value is kept
//! ```
//!
//! Entries remember the text before and after their value, so changing
//! `Contrast = 0.85` to `1.00` renders as `Contrast = 1.00` with the original
//! spacing intact.  Keys that appear before the first header belong to the
//! unnamed global section, addressed with `""`.

use std::fmt;

use crate::ini::parser::{self, IniError};

/// Options controlling how INI text is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniOptions {
    /// Lines whose first non-blank characters equal this marker are comments.
    pub comment_marker: String,
}

impl Default for IniOptions {
    /// The TrueHDR Tweaks file uses `#` comments.
    fn default() -> Self {
        Self {
            comment_marker: "#".to_string(),
        }
    }
}

/// Line terminator used when rendering the document back to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`, detected when the source text contains any CRLF pair.
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A single source line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Line {
    /// Blank line or comment.
    Verbatim(String),
    /// `[name]` section header.
    Header { name: String, raw: String },
    /// `key=value` pair.  `lead` is everything up to the first character of
    /// the value, `trail` is whatever followed it (usually whitespace).
    Entry {
        key: String,
        value: String,
        lead: String,
        trail: String,
    },
}

impl Line {
    fn entry(key: &str, value: String) -> Self {
        Line::Entry {
            key: key.to_string(),
            value,
            lead: format!("{key}="),
            trail: String::new(),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Line::Verbatim(raw) | Line::Header { raw, .. } => out.push_str(raw),
            Line::Entry {
                value, lead, trail, ..
            } => {
                out.push_str(lead);
                out.push_str(value);
                out.push_str(trail);
            }
        }
    }
}

/// An INI document that can be edited and rendered without losing comments,
/// ordering, or unknown sections.
///
/// # Examples
///
/// ```rust
/// use truehdr_core::{IniDocument, IniOptions};
///
/// let mut doc = IniDocument::parse("[Values]\n# 0-2\nQuality=0\n", &IniOptions::default()).unwrap();
/// assert_eq!(doc.get("Values", "Quality"), Some("0"));
///
/// assert!(doc.set("Values", "Quality", "2"));
/// assert_eq!(doc.render(), "[Values]\n# 0-2\nQuality=2\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IniDocument {
    pub(crate) lines: Vec<Line>,
    pub(crate) line_ending: LineEnding,
    pub(crate) trailing_newline: bool,
    pub(crate) bom: bool,
}

impl Default for IniDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl IniDocument {
    /// Creates an empty document that renders with `\n` line endings.
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            line_ending: LineEnding::Lf,
            trailing_newline: true,
            bom: false,
        }
    }

    /// Parses INI text.
    ///
    /// # Errors
    ///
    /// Returns [`IniError`] with the 1-based line number of the first line
    /// that is not a comment, blank, header, or `key=value` pair, or that
    /// repeats a section or key.
    pub fn parse(text: &str, options: &IniOptions) -> Result<Self, IniError> {
        parser::parse(text, options)
    }

    /// The line terminator used by [`render`](Self::render).
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Returns the value stored under `section` / `key`, if any.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let (start, end) = self.section_span(section)?;
        self.lines[start..end].iter().find_map(|line| match line {
            Line::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Returns `true` if a `[section]` header exists.  The global section
    /// (`""`) always exists.
    pub fn contains_section(&self, section: &str) -> bool {
        self.section_span(section).is_some()
    }

    /// Names of all `[section]` headers in file order.
    pub fn sections(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Header { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Keys of `section` in file order.  Empty when the section is absent.
    pub fn keys(&self, section: &str) -> Vec<&str> {
        let Some((start, end)) = self.section_span(section) else {
            return Vec::new();
        };
        self.lines[start..end]
            .iter()
            .filter_map(|line| match line {
                Line::Entry { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Stores `value` under `section` / `key`.
    ///
    /// Existing entries are updated in place.  A new key is inserted after the
    /// last entry of its section; a new section is appended to the end of the
    /// document.
    ///
    /// Returns `false` when the stored text already equals `value`.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();

        let Some((start, end)) = self.section_span(section) else {
            self.lines.push(Line::Header {
                name: section.to_string(),
                raw: format!("[{section}]"),
            });
            self.lines.push(Line::entry(key, value));
            return true;
        };

        for line in &mut self.lines[start..end] {
            if let Line::Entry {
                key: k, value: v, ..
            } = line
            {
                if k == key {
                    if *v == value {
                        return false;
                    }
                    *v = value;
                    return true;
                }
            }
        }

        let insert_at = self.lines[start..end]
            .iter()
            .rposition(|line| matches!(line, Line::Entry { .. }))
            .map_or(start, |offset| start + offset + 1);
        self.lines.insert(insert_at, Line::entry(key, value));
        true
    }

    /// Renders the document back to INI text.
    ///
    /// Untouched lines come out exactly as they were parsed; the original
    /// line ending, byte-order mark, and final newline are reproduced.
    pub fn render(&self) -> String {
        let eol = self.line_ending.as_str();
        let mut out = String::new();
        if self.bom {
            out.push('\u{feff}');
        }
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                out.push_str(eol);
            }
            line.write_to(&mut out);
        }
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(eol);
        }
        out
    }

    /// Line range `[start, end)` holding the body of `section`.
    fn section_span(&self, section: &str) -> Option<(usize, usize)> {
        let start = if section.is_empty() {
            0
        } else {
            self.lines
                .iter()
                .position(|line| matches!(line, Line::Header { name, .. } if name == section))?
                + 1
        };
        let end = self.lines[start..]
            .iter()
            .position(|line| matches!(line, Line::Header { .. }))
            .map_or(self.lines.len(), |offset| start + offset);
        Some((start, end))
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
