//! Default key handling: what the host does for a key between the pre and main phases.

use super::Editor;
use crate::extensions::event::{EventId, Key, Modifiers};
use crate::types::Pos;
use std::cmp::min;

impl Editor {
    /// Apply the host's own behavior for `event`. Non-key events are ignored.
    pub fn apply_default(&mut self, event: &EventId) {
        let EventId::Key { mods, key } = *event else {
            return;
        };

        match (mods, key) {
            (m, Key::Char(ch)) if !m.ctrl && !m.alt => {
                let mut tmp = [0u8; 4];
                self.replace_selection_or_insert(ch.encode_utf8(&mut tmp));
            }
            (Modifiers::NONE, Key::Space) => self.replace_selection_or_insert(" "),
            (Modifiers::ALT, Key::Up) => self.swap_with(-1),
            (Modifiers::ALT, Key::Down) => self.swap_with(1),
            (m, Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End | Key::PageUp | Key::PageDown)
                if !m.ctrl && !m.alt =>
            {
                self.move_cursor(key, m.shift);
            }
            (Modifiers::NONE, Key::Enter) => {
                self.delete_selection();
                self.cursor = self.buf.insert_newline(self.cursor);
                self.dirty = true;
            }
            (Modifiers::NONE, Key::Backspace) => {
                if self.selection_range().is_some() {
                    self.delete_selection();
                } else if self.cursor != Pos::default() {
                    self.cursor = self.buf.delete_backspace(self.cursor);
                    self.dirty = true;
                }
            }
            (Modifiers::NONE, Key::Delete) => {
                if self.selection_range().is_some() {
                    self.delete_selection();
                } else {
                    let Pos { y, x } = self.cursor;
                    if x < self.buf.line_len_chars(y) || y + 1 < self.buf.line_count() {
                        self.cursor = self.buf.delete_delete(self.cursor);
                        self.dirty = true;
                    }
                }
            }
            (Modifiers::NONE, Key::Tab) => {
                // With a selection, tab is range indentation, which autoindent owns.
                if self.selection_range().is_none() {
                    let unit = self.settings.indentation.unit(self.settings.tab_width);
                    self.replace_selection_or_insert(&unit);
                }
            }
            (Modifiers::NONE, Key::Esc) => self.clear_selection(),
            _ => {}
        }
    }

    /// Move the cursor in response to a movement key.
    ///
    /// If `selecting` is true (Shift held), we create/extend a selection. Otherwise we clear
    /// the selection as we move.
    fn move_cursor(&mut self, key: Key, selecting: bool) {
        if selecting && self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
        if !selecting {
            self.clear_selection();
        }

        let mut p = self.cursor;
        match key {
            Key::Left => {
                if p.x > 0 {
                    p.x -= 1;
                } else if p.y > 0 {
                    p.y -= 1;
                    p.x = self.buf.line_len_chars(p.y);
                }
            }
            Key::Right => {
                if p.x < self.buf.line_len_chars(p.y) {
                    p.x += 1;
                } else if p.y + 1 < self.buf.line_count() {
                    p.y += 1;
                    p.x = 0;
                }
            }
            Key::Up if p.y > 0 => {
                p.y -= 1;
                p.x = min(p.x, self.buf.line_len_chars(p.y));
            }
            Key::Down if p.y + 1 < self.buf.line_count() => {
                p.y += 1;
                p.x = min(p.x, self.buf.line_len_chars(p.y));
            }
            Key::Home => p.x = 0,
            Key::End => p.x = self.buf.line_len_chars(p.y),
            Key::PageUp => p = Pos::default(),
            Key::PageDown => {
                p.y = self.buf.line_count().saturating_sub(1);
                p.x = self.buf.line_len_chars(p.y);
            }
            _ => {}
        }
        self.cursor = self.buf.clamp_pos(p);
    }

    /// Swap the cursor line with its neighbour above (`-1`) or below (`1`); the cursor follows.
    fn swap_with(&mut self, dir: isize) {
        let y = self.cursor.y;
        let Some(other) = y.checked_add_signed(dir) else {
            return;
        };
        if self.buf.swap_lines(y, other) {
            self.clear_selection();
            self.cursor = self.buf.clamp_pos(Pos::new(other, self.cursor.x));
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::DocumentConfig;
    use crate::types::Indentation;
    use pretty_assertions::assert_eq;

    fn ed(text: &str) -> Editor {
        Editor::with_text(DocumentConfig::default(), text)
    }

    fn key(s: &str) -> EventId {
        EventId::parse(s).unwrap()
    }

    #[test]
    fn chars_replace_selection() {
        let mut e = ed("hello");
        e.move_to(Pos::new(0, 0));
        e.select_to(Pos::new(0, 4));
        e.apply_default(&EventId::char('j'));
        assert_eq!(e.contents(), "jo");
        assert_eq!(e.cursor(), Pos::new(0, 1));
    }

    #[test]
    fn enter_splits_line() {
        let mut e = ed("abcd");
        e.move_to(Pos::new(0, 2));
        e.apply_default(&key("enter"));
        assert_eq!(e.contents(), "ab\ncd");
        assert_eq!(e.cursor(), Pos::new(1, 0));
    }

    #[test]
    fn tab_inserts_unit_only_without_selection() {
        let mut e = Editor::with_text(
            DocumentConfig { tab_width: 2, indentation: Indentation::Spaces },
            "x",
        );
        e.apply_default(&key("tab"));
        assert_eq!(e.contents(), "  x");

        e.move_to(Pos::new(0, 0));
        e.select_to(Pos::new(0, 3));
        e.apply_default(&key("tab"));
        assert_eq!(e.contents(), "  x");
    }

    #[test]
    fn shift_arrows_extend_selection() {
        let mut e = ed("abc");
        e.apply_default(&key("shift_right"));
        e.apply_default(&key("shift_right"));
        assert_eq!(e.selection_range(), Some((Pos::new(0, 0), Pos::new(0, 2))));
        e.apply_default(&key("right"));
        assert_eq!(e.selection_anchor(), None);
    }

    #[test]
    fn backspace_joins_lines() {
        let mut e = ed("ab\ncd");
        e.move_to(Pos::new(1, 0));
        e.apply_default(&key("backspace"));
        assert_eq!(e.contents(), "abcd");
        assert_eq!(e.cursor(), Pos::new(0, 2));
    }

    #[test]
    fn alt_down_swaps_lines() {
        let mut e = ed("one\ntwo");
        e.apply_default(&key("alt_down"));
        assert_eq!(e.contents(), "two\none");
        assert_eq!(e.cursor(), Pos::new(1, 0));
        e.apply_default(&key("alt_down"));
        assert_eq!(e.contents(), "two\none");
    }

    #[test]
    fn ctrl_chords_do_not_insert() {
        let mut e = ed("");
        e.apply_default(&key("ctrl_s"));
        assert_eq!(e.contents(), "");
        assert!(!e.dirty);
    }
}
