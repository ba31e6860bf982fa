//! Common types used throughout the runtime.

use serde::Deserialize;
use std::fmt;

/// A position in the document.
///
/// - `y`: line index (0-based)
/// - `x`: **char index** within that line (0-based). This is *not* a byte index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pos {
    pub y: usize,
    pub x: usize, // char index within line
}

impl Pos {
    pub fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The whitespace kind used for indentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indentation {
    #[default]
    Tabs,
    Spaces,
}

impl Indentation {
    /// The text inserted for one level of indentation.
    pub fn unit(self, tab_width: usize) -> String {
        match self {
            Self::Tabs => "\t".to_string(),
            Self::Spaces => " ".repeat(tab_width),
        }
    }
}

/// Severity of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Info,
    Warning,
    Error,
}

/// A fire-and-forget message shown in the feedback line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
}

impl Feedback {
    pub fn new(kind: FeedbackKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            FeedbackKind::Info => "info",
            FeedbackKind::Warning => "warning",
            FeedbackKind::Error => "error",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

/// The character sequence used to separate lines in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Unix line ending: `\n` (LF)
    LF,
    /// Windows line ending: `\r\n` (CRLF)
    CRLF,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LF => "\n",
            Self::CRLF => "\r\n",
        }
    }
}
