//! Bracket and quote pairing.
//!
//! Typing an opener inserts its closer after the cursor. Typing that closer straight away
//! is swallowed instead of doubled. Backspace and space inside a fresh pair act on both
//! halves.

use crate::capabilities::Capabilities;
use crate::editor::Editor;
use crate::extensions::{EventId, Key, RegisteredHandlers};
use crate::types::Pos;
use std::cell::RefCell;
use std::rc::Rc;

/// Recognised pairs, opener first. Symmetric pairs use the same char twice.
pub const PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('"', '"'),
    ('\'', '\''),
    ('`', '`'),
];

/// Whether `open` pairs in this document type. Rust uses `'` for lifetimes.
fn pairs_in(doc_type: &str, open: char) -> bool {
    !(open == '\'' && doc_type == "Rust")
}

fn closer_for(doc_type: &str, open: char) -> Option<char> {
    PAIRS
        .iter()
        .find(|&&(o, _)| o == open)
        .filter(|_| pairs_in(doc_type, open))
        .map(|&(_, c)| c)
}

/// True if `pos` sits between an opener and its closer.
fn inside_pair<C: Capabilities + ?Sized>(ed: &C, pos: Pos) -> bool {
    let (Some(before), Some(at)) = (ed.char_before(pos), ed.char_at(pos)) else {
        return false;
    };
    closer_for(ed.document_type(), before) == Some(at)
}

#[derive(Debug, Default)]
struct PairState {
    /// Where the last auto-inserted closer went.
    record: Option<Pos>,
    was_pasting: bool,
    /// `(row, text)` of the cursor line before the current keystroke.
    snapshot: Option<(usize, String)>,
    collapse: bool,
    pad: bool,
}

#[derive(Debug, Default)]
pub struct PairTracker {
    state: RefCell<PairState>,
}

impl PairTracker {
    /// Runs before every key: undo a closer inserted by the keystroke that started a
    /// paste, then remember the line as it was.
    ///
    /// The opener behind the cursor stays: it is the first pasted char. Only the closer we
    /// added at the cursor is dropped, so the pasted text lands unchanged.
    fn before_key<C: Capabilities + ?Sized>(&self, ed: &mut C) {
        let mut st = self.state.borrow_mut();
        let pasting = ed.is_pasting();
        if pasting && !st.was_pasting {
            let cur = ed.cursor();
            if st.record == Some(cur) && inside_pair(ed, cur) {
                tracing::debug!(?cur, "paste started inside a fresh pair, dropping closer");
                ed.remove_at(cur);
                st.record = None;
            }
        }
        st.was_pasting = pasting;
        let row = ed.cursor().y;
        st.snapshot = ed.line(row).map(|l| (row, l.to_string()));
    }

    /// Runs after every key: forget the record once the cursor leaves it.
    fn after_key<C: Capabilities + ?Sized>(&self, ed: &C) {
        let mut st = self.state.borrow_mut();
        let Some(r) = st.record else {
            return;
        };
        let cur = ed.cursor();
        if cur.y != r.y || (cur.x != r.x && cur.x != r.x + 1) {
            st.record = None;
        }
    }

    /// True if the cursor line grew by more than one char during this keystroke.
    fn arrived_in_bulk<C: Capabilities + ?Sized>(&self, ed: &C) -> bool {
        let cur = ed.cursor();
        match &self.state.borrow().snapshot {
            Some((row, text)) if *row == cur.y => ed.line_len(cur.y) > text.chars().count() + 1,
            _ => false,
        }
    }

    fn open<C: Capabilities + ?Sized>(&self, ed: &mut C, close: char) {
        if ed.is_pasting() || self.arrived_in_bulk(ed) {
            return;
        }
        let cur = ed.cursor();
        let mut tmp = [0u8; 4];
        ed.insert_at(cur, close.encode_utf8(&mut tmp));
        self.state.borrow_mut().record = Some(cur);
    }

    /// Swallow a just-typed `close` that duplicates the tracker's own closer.
    fn suppress<C: Capabilities + ?Sized>(&self, ed: &mut C, close: char) -> bool {
        let cur = ed.cursor();
        let Some(x) = cur.x.checked_sub(1) else {
            return false;
        };
        let typed = Pos::new(cur.y, x);
        let mut st = self.state.borrow_mut();
        if st.record != Some(typed)
            || ed.char_at(typed) != Some(close)
            || ed.char_at(cur) != Some(close)
        {
            return false;
        }
        ed.backspace();
        st.record = None;
        true
    }

    fn on_opener<C: Capabilities + ?Sized>(&self, ed: &mut C, open: char) {
        let Some(close) = closer_for(ed.document_type(), open) else {
            return;
        };
        if open == close && self.suppress(ed, close) {
            return;
        }
        self.open(ed, close);
    }

    fn on_closer<C: Capabilities + ?Sized>(&self, ed: &mut C, close: char) {
        if !ed.is_pasting() {
            self.suppress(ed, close);
        }
    }

    /// True if the cursor is at the recorded spot, inside a pair.
    fn at_fresh_pair<C: Capabilities + ?Sized>(&self, ed: &C) -> bool {
        let cur = ed.cursor();
        !ed.is_pasting() && self.state.borrow().record == Some(cur) && inside_pair(ed, cur)
    }

    fn before_backspace<C: Capabilities + ?Sized>(&self, ed: &C) {
        let collapse = self.at_fresh_pair(ed);
        self.state.borrow_mut().collapse = collapse;
    }

    fn on_backspace<C: Capabilities + ?Sized>(&self, ed: &mut C) {
        let mut st = self.state.borrow_mut();
        if std::mem::take(&mut st.collapse) {
            ed.remove_at(ed.cursor());
            st.record = None;
        }
    }

    fn before_space<C: Capabilities + ?Sized>(&self, ed: &C) {
        let pad = self.at_fresh_pair(ed);
        self.state.borrow_mut().pad = pad;
    }

    fn on_space<C: Capabilities + ?Sized>(&self, ed: &mut C) {
        let mut st = self.state.borrow_mut();
        if std::mem::take(&mut st.pad) {
            ed.insert_at(ed.cursor(), " ");
            st.record = None;
        }
    }
}

/// Wrap a tracker method as a handler sharing `tracker`.
fn handler(
    tracker: &Rc<PairTracker>,
    f: impl Fn(&PairTracker, &mut Editor) + 'static,
) -> impl Fn(&mut Editor) -> anyhow::Result<()> + 'static {
    let tracker = Rc::clone(tracker);
    move |ed: &mut Editor| {
        f(&tracker, ed);
        Ok(())
    }
}

pub fn register(reg: &mut RegisteredHandlers) {
    let tracker = Rc::new(PairTracker::default());

    reg.pair(
        EventId::AnyKey,
        handler(&tracker, |t, ed| t.before_key(ed)),
        handler(&tracker, |t, ed| t.after_key(ed)),
    );
    for &(open, close) in PAIRS {
        reg.on(EventId::char(open), handler(&tracker, move |t, ed| t.on_opener(ed, open)));
        if open != close {
            reg.on(EventId::char(close), handler(&tracker, move |t, ed| t.on_closer(ed, close)));
        }
    }
    reg.pair(
        EventId::key(Key::Backspace),
        handler(&tracker, |t, ed| t.before_backspace(ed)),
        handler(&tracker, |t, ed| t.on_backspace(ed)),
    );
    reg.pair(
        EventId::key(Key::Space),
        handler(&tracker, |t, ed| t.before_space(ed)),
        handler(&tracker, |t, ed| t.on_space(ed)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandRegistry;
    use crate::config::DocumentConfig;
    use crate::extensions::Registry;
    use pretty_assertions::assert_eq;

    fn setup(doc_type: &str) -> (Registry, Editor) {
        let mut reg = RegisteredHandlers::new("pairs.rhai");
        register(&mut reg);
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = Editor::new(DocumentConfig::default());
        ed.set_document_type(doc_type);
        (registry, ed)
    }

    fn press(registry: &Registry, ed: &mut Editor, key: &str) {
        let ev = EventId::parse(key).unwrap();
        registry.dispatch(&ev, ed, |ed| ed.apply_default(&ev));
    }

    fn type_str(registry: &Registry, ed: &mut Editor, text: &str) {
        for c in text.chars() {
            let ev = EventId::char(c);
            registry.dispatch(&ev, ed, |ed| ed.apply_default(&ev));
        }
    }

    #[test]
    fn opener_inserts_closer() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "f(");
        assert_eq!(ed.contents(), "f()");
        assert_eq!(ed.cursor(), Pos::new(0, 2));
    }

    #[test]
    fn typed_closer_is_not_doubled() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "()");
        assert_eq!(ed.contents(), "()");
        assert_eq!(ed.cursor(), Pos::new(0, 1));
    }

    #[test]
    fn symmetric_quotes() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "\"");
        assert_eq!(ed.contents(), "\"\"");
        type_str(&registry, &mut ed, "\"");
        assert_eq!(ed.contents(), "\"\"");
        assert_eq!(ed.cursor(), Pos::new(0, 1));
    }

    #[test]
    fn rust_does_not_pair_single_quotes() {
        let (registry, mut ed) = setup("Rust");
        type_str(&registry, &mut ed, "'a");
        assert_eq!(ed.contents(), "'a");

        let (registry, mut ed) = setup("Python");
        type_str(&registry, &mut ed, "'");
        assert_eq!(ed.contents(), "''");
    }

    #[test]
    fn backspace_collapses_fresh_pair() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "x[");
        press(&registry, &mut ed, "backspace");
        assert_eq!(ed.contents(), "x");
        assert_eq!(ed.cursor(), Pos::new(0, 1));
    }

    #[test]
    fn space_pads_both_sides() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "{");
        press(&registry, &mut ed, "space");
        assert_eq!(ed.contents(), "{  }");
        assert_eq!(ed.cursor(), Pos::new(0, 2));

        type_str(&registry, &mut ed, " ");
        assert_eq!(ed.contents(), "{   }");
    }

    #[test]
    fn leaving_the_pair_forgets_it() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "(");
        press(&registry, &mut ed, "left");
        press(&registry, &mut ed, "right");
        type_str(&registry, &mut ed, ")");
        assert_eq!(ed.contents(), "())");

        press(&registry, &mut ed, "left");
        press(&registry, &mut ed, "backspace");
        assert_eq!(ed.contents(), "))");
    }

    #[test]
    fn paste_start_drops_auto_closer() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "(");
        ed.set_pasting(true);
        type_str(&registry, &mut ed, "a(b)");
        assert_eq!(ed.contents(), "(a(b)");
    }

    #[test]
    fn paste_guard_rearms_on_each_paste() {
        let (registry, mut ed) = setup("Plain Text");
        type_str(&registry, &mut ed, "(");
        ed.set_pasting(true);
        type_str(&registry, &mut ed, "a");
        ed.set_pasting(false);
        assert_eq!(ed.contents(), "(a");

        type_str(&registry, &mut ed, "[");
        assert_eq!(ed.contents(), "(a[]");
        ed.set_pasting(true);
        type_str(&registry, &mut ed, "b");
        ed.set_pasting(false);
        assert_eq!(ed.contents(), "(a[b");
    }

    #[test]
    fn bulk_insert_skips_pairing() {
        let (registry, mut ed) = setup("Plain Text");
        let ev = EventId::char('(');
        registry.dispatch(&ev, &mut ed, |ed| ed.insert("f("));
        assert_eq!(ed.contents(), "f(");
    }
}
