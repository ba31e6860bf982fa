//! The capability surface: the only operations extensions may use to read or change a
//! document. Extensions never touch the buffer directly.

use crate::types::{Indentation, Pos};

/// Operations the host editor exposes to extensions.
///
/// Positions are 0-based, with `x` counting chars. Methods that take a position never
/// fail: out-of-range positions are clamped or ignored by the host.
pub trait Capabilities {
    // ----- cursor and selection -----

    fn cursor(&self) -> Pos;

    /// The fixed end of the selection, if one is active.
    fn selection_anchor(&self) -> Option<Pos>;

    /// Move the cursor, cancelling any selection.
    fn move_to(&mut self, pos: Pos);

    /// Extend the selection to `pos`, anchoring at the current cursor if none is active.
    fn select_to(&mut self, pos: Pos);

    fn cancel_selection(&mut self);

    // ----- document -----

    fn line(&self, row: usize) -> Option<&str>;

    fn line_count(&self) -> usize;

    /// Insert `text` as a new line at `row`. The cursor is not moved.
    fn insert_line_at(&mut self, row: usize, text: &str);

    /// Remove the line at `row`. The cursor is not moved (only clamped).
    fn remove_line_at(&mut self, row: usize);

    /// Insert text at the cursor, advancing it.
    fn insert(&mut self, text: &str);

    /// Insert text at `pos` without moving the cursor.
    fn insert_at(&mut self, pos: Pos, text: &str);

    /// Remove the char at `pos` without moving the cursor (only clamped).
    fn remove_at(&mut self, pos: Pos);

    /// Remove the char before the cursor, moving the cursor back over it.
    fn backspace(&mut self);

    fn document_type(&self) -> &str;

    fn set_document_type(&mut self, name: &str);

    fn tab_width(&self) -> usize;

    /// The configured whitespace kind for new indentation.
    fn indentation(&self) -> Indentation;

    /// Whether the host is currently receiving a bulk paste.
    fn is_pasting(&self) -> bool;

    // ----- feedback -----

    fn display_info(&mut self, msg: &str);

    fn display_warning(&mut self, msg: &str);

    fn display_error(&mut self, msg: &str);

    /// Ask the user a question. Blocks until answered; `None` if cancelled.
    fn prompt(&mut self, question: &str) -> Option<String>;

    // ----- provided helpers -----

    fn char_at(&self, pos: Pos) -> Option<char> {
        self.line(pos.y)?.chars().nth(pos.x)
    }

    /// The char immediately before `pos` on the same line.
    fn char_before(&self, pos: Pos) -> Option<char> {
        let x = pos.x.checked_sub(1)?;
        self.char_at(Pos { y: pos.y, x })
    }

    fn line_len(&self, row: usize) -> usize {
        self.line(row).map_or(0, |l| l.chars().count())
    }
}
