//! Indentation oracle: measuring, rewriting and predicting leading whitespace.
//!
//! Levels are kept in width units, where a tab is `tab_width` units and a space is one,
//! so an all-tab and an all-space line measure the same when they look the same.

use crate::capabilities::Capabilities;
use crate::types::{Indentation, Pos};
use crate::utils::shift_col;
use regex::Regex;
use std::sync::OnceLock;

/// A line's indentation depth in width units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndentLevel(pub usize);

impl IndentLevel {
    pub const ZERO: Self = Self(0);

    /// `n` whole levels.
    pub fn levels(n: usize, tab_width: usize) -> Self {
        Self(n * tab_width)
    }

    #[must_use]
    pub fn raised(self, tab_width: usize) -> Self {
        Self(self.0 + tab_width)
    }

    #[must_use]
    pub fn lowered(self, tab_width: usize) -> Self {
        Self(self.0.saturating_sub(tab_width))
    }

    /// Whitespace representing this level. Tabs round down to whole levels.
    pub fn render(self, kind: Indentation, tab_width: usize) -> String {
        match kind {
            Indentation::Tabs => "\t".repeat(self.0 / tab_width.max(1)),
            Indentation::Spaces => " ".repeat(self.0),
        }
    }
}

/// Per-type keywords that open or close a block.
#[derive(Debug)]
pub struct IndentRules {
    /// A line ending in one of these indents the next line.
    pub indent_suffixes: &'static [&'static str],
    /// A line starting with one of these sits one level shallower.
    pub dedent_prefixes: &'static [&'static str],
    /// Openers that end in something other than a keyword, like a block's parameter list.
    pub indent_pattern: Option<&'static str>,
}

const DEFAULT_RULES: IndentRules = IndentRules {
    indent_suffixes: &[],
    dedent_prefixes: &[],
    indent_pattern: None,
};

pub(crate) const RULES: &[(&str, IndentRules)] = &[
    (
        "Python",
        IndentRules {
            indent_suffixes: &[":"],
            dedent_prefixes: &["else", "elif", "except", "finally"],
            indent_pattern: None,
        },
    ),
    (
        "Ruby",
        IndentRules {
            indent_suffixes: &["do", "then", "begin", "else"],
            dedent_prefixes: &["end", "else", "elsif", "when", "rescue", "ensure"],
            indent_pattern: Some(r"\bdo\s*\|[^|]*\|$"),
        },
    ),
    (
        "Lua",
        IndentRules {
            indent_suffixes: &["then", "do", "else", "repeat"],
            dedent_prefixes: &["end", "else", "elseif", "until"],
            indent_pattern: Some(r"\bfunction\b[^()]*\([^()]*\)$"),
        },
    ),
    (
        "Shell",
        IndentRules {
            indent_suffixes: &["then", "do", "else"],
            dedent_prefixes: &["fi", "done", "else", "elif", "esac"],
            indent_pattern: None,
        },
    ),
    (
        "YAML",
        IndentRules {
            indent_suffixes: &[":"],
            dedent_prefixes: &[],
            indent_pattern: None,
        },
    ),
    (
        "Haskell",
        IndentRules {
            indent_suffixes: &["where", "do", "of"],
            dedent_prefixes: &[],
            indent_pattern: None,
        },
    ),
];

/// The rule set for a document type; unknown types only get the bracket rule.
pub fn rules_for(doc_type: &str) -> &'static IndentRules {
    RULES
        .iter()
        .find(|(name, _)| *name == doc_type)
        .map_or(&DEFAULT_RULES, |(_, rules)| rules)
}

const OPENERS: [char; 3] = ['(', '[', '{'];
pub(crate) const CLOSERS: [char; 3] = [')', ']', '}'];

/// Whether `text` matches the type's opener pattern. Patterns compile once, on first use.
fn opens_by_pattern(doc_type: &str, text: &str) -> bool {
    static COMPILED: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    let compiled = COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|(name, rules)| Some((*name, Regex::new(rules.indent_pattern?).ok()?)))
            .collect()
    });
    compiled
        .iter()
        .any(|(name, re)| *name == doc_type && re.is_match(text))
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn ends_with_token(text: &str, token: &str) -> bool {
    let Some(head) = text.strip_suffix(token) else {
        return false;
    };
    !token.starts_with(is_word) || !head.ends_with(is_word)
}

fn starts_with_token(text: &str, token: &str) -> bool {
    let Some(tail) = text.strip_prefix(token) else {
        return false;
    };
    !token.ends_with(is_word) || !tail.starts_with(is_word)
}

/// True if the line at `row` opens a block for the line after it.
pub fn causes_indent_after<C: Capabilities + ?Sized>(ed: &C, row: usize) -> bool {
    let Some(line) = ed.line(row) else {
        return false;
    };
    let text = line.trim_end();
    if text.ends_with(OPENERS) {
        return true;
    }
    let doc_type = ed.document_type();
    rules_for(doc_type)
        .indent_suffixes
        .iter()
        .any(|s| ends_with_token(text, s))
        || opens_by_pattern(doc_type, text)
}

/// True if the line at `row` starts by closing a block.
pub fn causes_dedent_at<C: Capabilities + ?Sized>(ed: &C, row: usize) -> bool {
    let Some(line) = ed.line(row) else {
        return false;
    };
    let text = line.trim_start();
    if text.starts_with(CLOSERS) {
        return true;
    }
    rules_for(ed.document_type())
        .dedent_prefixes
        .iter()
        .any(|p| starts_with_token(text, p))
}

/// Indentation of `row`, or `None` if there is no such line.
pub fn measure_indent<C: Capabilities + ?Sized>(ed: &C, row: usize) -> Option<IndentLevel> {
    let tab_width = ed.tab_width();
    let line = ed.line(row)?;
    let width = line
        .chars()
        .map_while(|c| match c {
            '\t' => Some(tab_width),
            ' ' => Some(1),
            _ => None,
        })
        .sum();
    Some(IndentLevel(width))
}

fn leading_ws(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..end]
}

/// The whitespace kind a line uses, falling back to the configured one.
pub fn line_kind<C: Capabilities + ?Sized>(ed: &C, row: usize) -> Indentation {
    match ed.line(row).and_then(|l| l.chars().next()) {
        Some('\t') => Indentation::Tabs,
        Some(' ') => Indentation::Spaces,
        _ => ed.indentation(),
    }
}

/// Replace the leading whitespace of `row` with `target`, returning the char delta.
///
/// The cursor is not adjusted (the host may clamp it).
pub fn rewrite<C: Capabilities + ?Sized>(ed: &mut C, row: usize, target: IndentLevel) -> isize {
    let kind = line_kind(ed, row);
    rewrite_as(ed, row, target, kind)
}

/// [`rewrite`] with an explicit whitespace kind.
pub fn rewrite_as<C: Capabilities + ?Sized>(
    ed: &mut C,
    row: usize,
    target: IndentLevel,
    kind: Indentation,
) -> isize {
    let tab_width = ed.tab_width();
    let Some(line) = ed.line(row) else {
        return 0;
    };
    let current = leading_ws(line);
    let wanted = target.render(kind, tab_width);
    if current == wanted {
        return 0;
    }
    let old_len = current.chars().count();
    for _ in 0..old_len {
        ed.remove_at(Pos::new(row, 0));
    }
    ed.insert_at(Pos::new(row, 0), &wanted);
    let new_len = wanted.chars().count();
    isize::try_from(new_len).unwrap_or(isize::MAX) - isize::try_from(old_len).unwrap_or(isize::MAX)
}

/// Put the cursor and anchor back, keeping a selection alive if there was one.
pub(crate) fn restore<C: Capabilities + ?Sized>(ed: &mut C, cursor: Pos, anchor: Option<Pos>) {
    match anchor {
        Some(a) => {
            ed.move_to(a);
            ed.select_to(cursor);
        }
        None => ed.move_to(cursor),
    }
}

/// Set the indentation of `row` to `target`, shifting the cursor by the same amount if it
/// is on that row.
pub fn apply_indent<C: Capabilities + ?Sized>(ed: &mut C, row: usize, target: IndentLevel) {
    let kind = line_kind(ed, row);
    apply_indent_as(ed, row, target, kind);
}

/// [`apply_indent`] with an explicit whitespace kind.
pub fn apply_indent_as<C: Capabilities + ?Sized>(
    ed: &mut C,
    row: usize,
    target: IndentLevel,
    kind: Indentation,
) {
    let cursor = ed.cursor();
    let anchor = ed.selection_anchor();
    let delta = rewrite_as(ed, row, target, kind);
    if delta == 0 {
        return;
    }
    let cursor = if cursor.y == row {
        Pos::new(row, shift_col(cursor.x, delta))
    } else {
        cursor
    };
    restore(ed, cursor, anchor);
}

/// Raise (`levels > 0`) or lower one line by whole levels.
pub fn shift_line<C: Capabilities + ?Sized>(ed: &mut C, row: usize, levels: isize) {
    let Some(level) = measure_indent(ed, row) else {
        return;
    };
    let tab_width = ed.tab_width();
    let target = if levels >= 0 {
        IndentLevel(level.0 + levels.unsigned_abs() * tab_width)
    } else {
        IndentLevel(level.0.saturating_sub(levels.unsigned_abs() * tab_width))
    };
    apply_indent(ed, row, target);
}

/// Shift every line touched by the selection by one level up or down.
///
/// Cursor and anchor columns then move by 1 on tab-indented lines and by the tab width on
/// space-indented ones.
pub fn shift_range<C: Capabilities + ?Sized>(ed: &mut C, raise: bool) {
    let cursor = ed.cursor();
    let Some(anchor) = ed.selection_anchor() else {
        return;
    };
    let (top, bottom) = if anchor.y <= cursor.y {
        (anchor.y, cursor.y)
    } else {
        (cursor.y, anchor.y)
    };
    let tab_width = ed.tab_width();
    for row in top..=bottom {
        let Some(level) = measure_indent(ed, row) else {
            continue;
        };
        let target = if raise {
            level.raised(tab_width)
        } else {
            level.lowered(tab_width)
        };
        rewrite(ed, row, target);
    }

    let moved = |ed: &C, p: Pos| {
        let step = match line_kind(ed, p.y) {
            Indentation::Tabs => 1,
            Indentation::Spaces => isize::try_from(tab_width).unwrap_or(isize::MAX),
        };
        Pos::new(p.y, shift_col(p.x, if raise { step } else { -step }))
    };
    let new_cursor = moved(ed, cursor);
    let new_anchor = moved(ed, anchor);
    restore(ed, new_cursor, Some(new_anchor));
}

/// Reflow `row` to fit between its neighbours.
pub fn fix_indent<C: Capabilities + ?Sized>(ed: &mut C, row: usize) {
    if row == 0 {
        apply_indent(ed, 0, IndentLevel::ZERO);
        return;
    }
    let above = measure_indent(ed, row - 1).unwrap_or_default();
    let below = measure_indent(ed, row + 1).unwrap_or_default();
    let mut target = above.max(below);
    if causes_indent_after(ed, row - 1) && causes_dedent_at(ed, row + 1) {
        target = target.raised(ed.tab_width());
    }
    apply_indent(ed, row, target);
}
