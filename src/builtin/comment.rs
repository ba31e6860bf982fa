//! Line comment toggling.

use super::indent::restore;
use crate::capabilities::Capabilities;
use crate::extensions::{EventId, Key, Modifiers, RegisteredHandlers};
use crate::types::Pos;
use crate::utils::shift_col;

const DEFAULT_TOKEN: &str = "//";

const TOKENS: &[(&str, &str)] = &[
    ("Rust", "//"),
    ("C", "//"),
    ("C++", "//"),
    ("JavaScript", "//"),
    ("TypeScript", "//"),
    ("Go", "//"),
    ("Java", "//"),
    ("Python", "#"),
    ("Ruby", "#"),
    ("Shell", "#"),
    ("TOML", "#"),
    ("YAML", "#"),
    ("Makefile", "#"),
    ("Lua", "--"),
    ("SQL", "--"),
    ("Haskell", "--"),
];

/// The line comment prefix for a document type.
pub fn token_for(doc_type: &str) -> &'static str {
    TOKENS
        .iter()
        .find(|(name, _)| *name == doc_type)
        .map_or(DEFAULT_TOKEN, |(_, token)| token)
}

/// Char column of the first non-whitespace char, `None` for a blank line.
fn first_non_ws(line: &str) -> Option<usize> {
    line.chars().position(|c| !c.is_whitespace())
}

fn width(s: &str) -> isize {
    isize::try_from(s.chars().count()).unwrap_or(isize::MAX)
}

/// Move the cursor by `delta` if it is on `row`, keeping any selection anchor.
fn nudge_cursor<C: Capabilities + ?Sized>(
    ed: &mut C,
    row: usize,
    cursor: Pos,
    anchor: Option<Pos>,
    delta: isize,
) {
    let cursor = if cursor.y == row {
        Pos::new(row, shift_col(cursor.x, delta))
    } else {
        cursor
    };
    restore(ed, cursor, anchor);
}

pub fn is_commented<C: Capabilities + ?Sized>(ed: &C, row: usize) -> bool {
    let token = token_for(ed.document_type());
    ed.line(row)
        .and_then(|l| l.split_whitespace().next())
        .is_some_and(|first| first == token)
}

pub fn comment<C: Capabilities + ?Sized>(ed: &mut C, row: usize) {
    let Some(line) = ed.line(row) else {
        return;
    };
    let col = first_non_ws(line).unwrap_or(0);
    let text = format!("{} ", token_for(ed.document_type()));
    let (cursor, anchor) = (ed.cursor(), ed.selection_anchor());
    ed.insert_at(Pos::new(row, col), &text);
    nudge_cursor(ed, row, cursor, anchor, width(&text));
}

pub fn uncomment<C: Capabilities + ?Sized>(ed: &mut C, row: usize) {
    let Some(col) = ed.line(row).and_then(first_non_ws) else {
        return;
    };
    let token = token_for(ed.document_type());
    let (cursor, anchor) = (ed.cursor(), ed.selection_anchor());
    let at = Pos::new(row, col);
    for _ in token.chars() {
        ed.remove_at(at);
    }
    let mut removed = width(token);
    if ed.char_at(at) == Some(' ') {
        ed.remove_at(at);
        removed += 1;
    }
    nudge_cursor(ed, row, cursor, anchor, -removed);
}

pub fn toggle<C: Capabilities + ?Sized>(ed: &mut C, row: usize) {
    if is_commented(ed, row) {
        uncomment(ed, row);
    } else {
        comment(ed, row);
    }
}

/// Toggle every line the selection touches, or the cursor line without one.
///
/// Lines are toggled one by one; a multi-line selection keeps its original endpoints.
pub fn toggle_selection<C: Capabilities + ?Sized>(ed: &mut C) {
    let cursor = ed.cursor();
    match ed.selection_anchor() {
        Some(anchor) if anchor.y != cursor.y => {
            let (top, bottom) = (anchor.y.min(cursor.y), anchor.y.max(cursor.y));
            for row in top..=bottom {
                toggle(ed, row);
            }
            restore(ed, cursor, Some(anchor));
        }
        _ => toggle(ed, cursor.y),
    }
}

pub fn register(reg: &mut RegisteredHandlers) {
    reg.on(EventId::chord(Modifiers::CTRL, Key::Char('/')), |ed| {
        toggle_selection(ed);
        Ok(())
    });
    reg.command("comment", "Toggle line comments on the selection or current line", |ed| {
        toggle_selection(ed);
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::editor::Editor;
    use pretty_assertions::assert_eq;

    fn ed(text: &str, doc_type: &str) -> Editor {
        let mut e = Editor::with_text(DocumentConfig::default(), text);
        e.set_document_type(doc_type);
        e
    }

    #[test]
    fn tokens_by_type() {
        assert_eq!(token_for("Python"), "#");
        assert_eq!(token_for("Lua"), "--");
        assert_eq!(token_for("Rust"), "//");
        assert_eq!(token_for("Plain Text"), "//");
    }

    #[test]
    fn detects_comment_by_first_word() {
        let e = ed("  # note\n#note\nx # trailing\n", "Python");
        assert!(is_commented(&e, 0));
        assert!(!is_commented(&e, 1));
        assert!(!is_commented(&e, 2));
        assert!(!is_commented(&e, 3));
    }

    #[test]
    fn comment_goes_after_indent() {
        let mut e = ed("\tlet x = 1;", "Rust");
        e.move_to(Pos::new(0, 5));
        comment(&mut e, 0);
        assert_eq!(e.line(0), Some("\t// let x = 1;"));
        assert_eq!(e.cursor(), Pos::new(0, 8));
    }

    #[test]
    fn blank_line_comments_at_column_zero() {
        let mut e = ed("", "SQL");
        comment(&mut e, 0);
        assert_eq!(e.line(0), Some("-- "));
    }

    #[test]
    fn uncomment_without_trailing_space() {
        let mut e = ed("    #", "Shell");
        e.move_to(Pos::new(0, 5));
        uncomment(&mut e, 0);
        assert_eq!(e.line(0), Some("    "));
        assert_eq!(e.cursor(), Pos::new(0, 4));
    }

    #[test]
    fn toggle_twice_is_identity() {
        for (text, col) in [("    x = 1", 6), ("", 0), ("y", 1), ("\t\tz()", 0)] {
            let mut e = ed(text, "Python");
            e.move_to(Pos::new(0, col));
            toggle(&mut e, 0);
            assert_ne!(e.line(0), Some(text));
            toggle(&mut e, 0);
            assert_eq!(e.line(0), Some(text));
            assert_eq!(e.cursor(), Pos::new(0, col), "{text:?}");
        }
    }

    #[test]
    fn selection_toggles_each_line_and_keeps_endpoints() {
        let mut e = ed("a\n// b\nc", "Rust");
        e.move_to(Pos::new(0, 1));
        e.select_to(Pos::new(2, 0));
        toggle_selection(&mut e);
        assert_eq!(e.contents(), "// a\nb\n// c");
        assert_eq!(e.selection_anchor(), Some(Pos::new(0, 1)));
        assert_eq!(e.cursor(), Pos::new(2, 0));
    }

    #[test]
    fn single_line_selection_moves_cursor() {
        let mut e = ed("abc", "Rust");
        e.move_to(Pos::new(0, 0));
        e.select_to(Pos::new(0, 2));
        toggle_selection(&mut e);
        assert_eq!(e.line(0), Some("// abc"));
        assert_eq!(e.cursor(), Pos::new(0, 5));
        assert_eq!(e.selection_anchor(), Some(Pos::new(0, 0)));
    }
}
