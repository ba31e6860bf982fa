//! Auto-indentation: new lines, closing keywords, moved lines and block shifts.

use super::indent::{
    apply_indent, apply_indent_as, causes_dedent_at, causes_indent_after, fix_indent,
    line_kind, measure_indent, shift_line, shift_range,
};
use crate::capabilities::Capabilities;
use crate::extensions::{EventId, Key, Modifiers, RegisteredHandlers};
use crate::types::Pos;
use std::cell::Cell;
use std::rc::Rc;

/// Called after the host split the line: indent the new line from the one above.
pub fn on_enter<C: Capabilities + ?Sized>(ed: &mut C) {
    if ed.is_pasting() {
        return;
    }
    let row = ed.cursor().y;
    let Some(prev) = row.checked_sub(1) else {
        return;
    };
    let tab_width = ed.tab_width();
    let base = measure_indent(ed, prev).unwrap_or_default();
    let opens = causes_indent_after(ed, prev);
    let target = if opens { base.raised(tab_width) } else { base };
    // A split line without leading whitespace follows the line above.
    let kind = match ed.line(row).and_then(|l| l.chars().next()) {
        Some(' ' | '\t') => line_kind(ed, row),
        _ => line_kind(ed, prev),
    };

    if opens && causes_dedent_at(ed, row) {
        // Between an opener and its closer: the closer keeps the base level and a blank
        // line opens inside the block.
        apply_indent_as(ed, row, base, kind);
        let ws = target.render(kind, tab_width);
        ed.insert_line_at(row, &ws);
        ed.move_to(Pos::new(row, ws.chars().count()));
    } else {
        apply_indent_as(ed, row, target, kind);
    }
}

/// State shared by the before/after halves of the closing-keyword check.
#[derive(Default)]
struct DedentWatch {
    /// `(row, already_dedenting)` captured before the keystroke.
    before: Cell<Option<(usize, bool)>>,
}

impl DedentWatch {
    fn snapshot<C: Capabilities + ?Sized>(&self, ed: &C) {
        let row = ed.cursor().y;
        self.before.set(Some((row, causes_dedent_at(ed, row))));
    }

    /// Dedent once, on the keystroke that makes the line start with a closing token.
    fn check<C: Capabilities + ?Sized>(&self, ed: &mut C) {
        let Some((row, was)) = self.before.take() else {
            return;
        };
        if ed.is_pasting() || was || ed.cursor().y != row || !causes_dedent_at(ed, row) {
            return;
        }
        let target = measure_indent(ed, row)
            .unwrap_or_default()
            .lowered(ed.tab_width());
        apply_indent(ed, row, target);
    }
}

/// Tab with a selection: raise every selected line.
pub fn indent_selection<C: Capabilities + ?Sized>(ed: &mut C) {
    if ed.is_pasting() || ed.selection_anchor().is_none() {
        return;
    }
    shift_range(ed, true);
}

/// Lower the selected lines, or the cursor line with no selection.
pub fn dedent<C: Capabilities + ?Sized>(ed: &mut C) {
    if ed.selection_anchor().is_some() {
        shift_range(ed, false);
    } else {
        let row = ed.cursor().y;
        shift_line(ed, row, -1);
    }
}

/// Raise the selected lines, or the cursor line with no selection.
pub fn indent<C: Capabilities + ?Sized>(ed: &mut C) {
    if ed.selection_anchor().is_some() {
        shift_range(ed, true);
    } else {
        let row = ed.cursor().y;
        shift_line(ed, row, 1);
    }
}

/// Reflow the cursor line after it was moved.
pub fn reflow<C: Capabilities + ?Sized>(ed: &mut C) {
    if ed.is_pasting() {
        return;
    }
    let row = ed.cursor().y;
    fix_indent(ed, row);
}

/// The printable keys watched for closing keywords. `*` is excluded: it is the catch-all.
///
/// Every dedent keyword and closer is ASCII, so a non-ASCII key can never complete one.
fn watched_chars() -> impl Iterator<Item = char> {
    (' '..='~').filter(|&c| c != '*')
}

pub fn register(reg: &mut RegisteredHandlers) {
    reg.on(EventId::key(Key::Enter), |ed| {
        on_enter(ed);
        Ok(())
    });

    let watch = Rc::new(DedentWatch::default());
    for c in watched_chars() {
        let pre = Rc::clone(&watch);
        let main = Rc::clone(&watch);
        reg.pair(
            EventId::char(c),
            move |ed| {
                pre.snapshot(ed);
                Ok(())
            },
            move |ed| {
                main.check(ed);
                Ok(())
            },
        );
    }

    reg.on(EventId::key(Key::Tab), |ed| {
        indent_selection(ed);
        Ok(())
    });
    // Folded into shift_backtab by the normalizer.
    reg.on(EventId::chord(Modifiers::SHIFT, Key::Tab), |ed| {
        if !ed.is_pasting() {
            dedent(ed);
        }
        Ok(())
    });
    for key in [Key::Up, Key::Down] {
        reg.on(EventId::chord(Modifiers::ALT, key), |ed| {
            reflow(ed);
            Ok(())
        });
    }

    reg.command("reindent", "Reindent the current line from its neighbours", |ed| {
        let row = ed.cursor().y;
        fix_indent(ed, row);
        Ok(())
    });
    reg.command("indent", "Indent the selection or current line", |ed| {
        indent(ed);
        Ok(())
    });
    reg.command("dedent", "Dedent the selection or current line", |ed| {
        dedent(ed);
        Ok(())
    });
}
