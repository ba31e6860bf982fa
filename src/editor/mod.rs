//! Editor: the headless host that owns the document and implements the capability surface.

mod file_ops;
mod input;

use crate::buffer::Buffer;
use crate::capabilities::Capabilities;
use crate::config::DocumentConfig;
use crate::filetypes::PLAIN_TEXT;
use crate::types::{Feedback, FeedbackKind, Indentation, Pos};
use std::collections::VecDeque;
use std::path::PathBuf;

/// The document being edited plus everything extensions may observe about it.
pub struct Editor {
    /// The editable document (lines of text).
    pub buf: Buffer,
    /// Cursor position in the buffer.
    pub cursor: Pos,
    /// Selection anchor.
    pub anchor: Option<Pos>,
    /// Path we'll save to.
    pub file_path: Option<PathBuf>,
    /// "Dirty" means there are unsaved changes.
    pub dirty: bool,
    /// Document type name, e.g. `"Python"`.
    pub(crate) doc_type: String,
    /// Whether a bulk paste is being delivered.
    pub(crate) pasting: bool,
    /// Every message shown to the user, oldest first.
    pub(crate) feedback: Vec<Feedback>,
    /// Queued answers for `prompt` (headless mode has no interactive prompt line).
    pub(crate) answers: VecDeque<String>,
    pub(crate) settings: DocumentConfig,
}

impl Editor {
    /// Create an editor over an empty, untitled document.
    pub fn new(settings: DocumentConfig) -> Self {
        Self {
            buf: Buffer::new(),
            cursor: Pos::default(),
            anchor: None,
            file_path: None,
            dirty: false,
            doc_type: PLAIN_TEXT.to_string(),
            pasting: false,
            feedback: Vec::new(),
            answers: VecDeque::new(),
            settings,
        }
    }

    /// Create an editor holding `text`.
    pub fn with_text(settings: DocumentConfig, text: &str) -> Self {
        let mut ed = Self::new(settings);
        ed.buf = Buffer::from_string(text);
        ed
    }

    /// Whole document joined with its line ending.
    pub fn contents(&self) -> String {
        self.buf.contents()
    }

    /// Messages shown so far.
    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    /// Queue an answer for the next `prompt` call.
    pub fn push_answer(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }

    pub fn set_pasting(&mut self, pasting: bool) {
        self.pasting = pasting;
    }

    /// Return the normalized selection range.
    pub fn selection_range(&self) -> Option<(Pos, Pos)> {
        let a = self.anchor?;
        if a == self.cursor {
            None
        } else if a <= self.cursor {
            Some((a, self.cursor))
        } else {
            Some((self.cursor, a))
        }
    }

    /// Clear any selection.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Delete the current selection.
    pub fn delete_selection(&mut self) {
        if let Some((a, b)) = self.selection_range() {
            self.cursor = self.buf.delete_range(a, b);
            self.clear_selection();
            self.dirty = true;
        }
    }

    /// Replace the selection or insert at cursor.
    pub fn replace_selection_or_insert(&mut self, text: &str) {
        if self.selection_range().is_some() {
            self.delete_selection();
        }
        self.anchor = None;
        self.cursor = self.buf.insert_str(self.cursor, text);
        self.dirty = true;
    }

    fn push_feedback(&mut self, kind: FeedbackKind, msg: &str) {
        match kind {
            FeedbackKind::Info => tracing::info!("{msg}"),
            FeedbackKind::Warning => tracing::warn!("{msg}"),
            FeedbackKind::Error => tracing::error!("{msg}"),
        }
        self.feedback.push(Feedback::new(kind, msg));
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.buf.clamp_pos(self.cursor);
        if let Some(a) = self.anchor {
            self.anchor = Some(self.buf.clamp_pos(a));
        }
    }
}

impl Capabilities for Editor {
    fn cursor(&self) -> Pos {
        self.cursor
    }

    fn selection_anchor(&self) -> Option<Pos> {
        self.anchor
    }

    fn move_to(&mut self, pos: Pos) {
        self.cursor = self.buf.clamp_pos(pos);
        self.anchor = None;
    }

    fn select_to(&mut self, pos: Pos) {
        if self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
        self.cursor = self.buf.clamp_pos(pos);
    }

    fn cancel_selection(&mut self) {
        self.clear_selection();
    }

    fn line(&self, row: usize) -> Option<&str> {
        self.buf.line(row)
    }

    fn line_count(&self) -> usize {
        self.buf.line_count()
    }

    fn insert_line_at(&mut self, row: usize, text: &str) {
        self.buf.insert_line(row, text);
        self.dirty = true;
    }

    fn remove_line_at(&mut self, row: usize) {
        if self.buf.remove_line(row).is_some() {
            self.dirty = true;
            self.clamp_cursor();
        }
    }

    fn insert(&mut self, text: &str) {
        self.cursor = self.buf.insert_str(self.cursor, text);
        self.dirty = true;
    }

    fn insert_at(&mut self, pos: Pos, text: &str) {
        self.buf.insert_str(pos, text);
        self.dirty = true;
    }

    fn remove_at(&mut self, pos: Pos) {
        if self.buf.remove_char(pos).is_some() {
            self.dirty = true;
            self.clamp_cursor();
        }
    }

    fn backspace(&mut self) {
        let before = self.cursor;
        self.cursor = self.buf.delete_backspace(self.cursor);
        if self.cursor != before {
            self.dirty = true;
        }
    }

    fn document_type(&self) -> &str {
        &self.doc_type
    }

    fn set_document_type(&mut self, name: &str) {
        self.doc_type = name.to_string();
    }

    fn tab_width(&self) -> usize {
        self.settings.tab_width
    }

    fn indentation(&self) -> Indentation {
        self.settings.indentation
    }

    fn is_pasting(&self) -> bool {
        self.pasting
    }

    fn display_info(&mut self, msg: &str) {
        self.push_feedback(FeedbackKind::Info, msg);
    }

    fn display_warning(&mut self, msg: &str) {
        self.push_feedback(FeedbackKind::Warning, msg);
    }

    fn display_error(&mut self, msg: &str) {
        self.push_feedback(FeedbackKind::Error, msg);
    }

    fn prompt(&mut self, question: &str) -> Option<String> {
        let answer = self.answers.pop_front();
        tracing::debug!(question, answered = answer.is_some(), "prompt");
        answer
    }
}
