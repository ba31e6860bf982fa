//! The editor API handed to script handlers.
//!
//! Handlers get an `ed` object whose methods call through the capability surface.
//! Lines and columns are 1-based for scripting convenience.
//!
//! The editor is lent to the API only for the duration of one handler call. A script that
//! keeps `ed` around (in a captured variable, say) gets a runtime error from it later.

use crate::capabilities::Capabilities;
use crate::editor::Editor;
use crate::types::Pos;
use crate::utils::clamp_usize_i64;
use rhai::{Dynamic, EvalAltResult, Position};
use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

type ApiResult<T> = Result<T, Box<EvalAltResult>>;

/// The editor on loan to the handler currently running, if any.
type Slot = Rc<Cell<Option<NonNull<Editor>>>>;

/// API wrapper passed to script handlers.
#[derive(Clone)]
pub struct ScriptApi {
    slot: Slot,
}

/// Clears the slot when the handler call ends, even if it errors out.
pub struct Lease {
    slot: Slot,
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.slot.set(None);
    }
}

fn one_based(n: usize) -> i64 {
    i64::try_from(n).map_or(i64::MAX, |n| n.saturating_add(1))
}

fn zero_based(n: i64) -> usize {
    clamp_usize_i64(n.saturating_sub(1), 0, usize::MAX)
}

impl ScriptApi {
    /// Lend `ed` to a fresh API object. The loan ends when the returned [`Lease`] drops, so
    /// the lease must not outlive the borrow of `ed`.
    pub fn lend(ed: &mut Editor) -> (Self, Lease) {
        let slot: Slot = Rc::new(Cell::new(Some(NonNull::from(ed))));
        let lease = Lease {
            slot: Rc::clone(&slot),
        };
        (Self { slot }, lease)
    }

    /// Run `f` against the lent editor, or fail if the loan has ended.
    fn with_editor<T>(&mut self, f: impl FnOnce(&mut Editor) -> T) -> ApiResult<T> {
        let Some(mut ed) = self.slot.get() else {
            return Err(Box::new(EvalAltResult::ErrorRuntime(
                "editor used outside of its handler call".into(),
                Position::NONE,
            )));
        };
        // SAFETY: the slot is only filled while the `&mut Editor` it came from is borrowed
        // by the running handler call, and `Lease` empties it before that borrow ends.
        // Nothing else touches the editor while a script runs.
        Ok(f(unsafe { ed.as_mut() }))
    }

    fn pos(line: i64, col: i64) -> Pos {
        Pos::new(zero_based(line), zero_based(col))
    }

    // ----- cursor and selection -----

    pub fn cursor_line(&mut self) -> ApiResult<i64> {
        self.with_editor(|ed| one_based(ed.cursor().y))
    }

    pub fn cursor_col(&mut self) -> ApiResult<i64> {
        self.with_editor(|ed| one_based(ed.cursor().x))
    }

    pub fn set_cursor(&mut self, line: i64, col: i64) -> ApiResult<()> {
        self.with_editor(|ed| ed.move_to(Self::pos(line, col)))
    }

    pub fn select_to(&mut self, line: i64, col: i64) -> ApiResult<()> {
        self.with_editor(|ed| ed.select_to(Self::pos(line, col)))
    }

    pub fn has_selection(&mut self) -> ApiResult<bool> {
        self.with_editor(|ed| ed.selection_range().is_some())
    }

    /// 1-based anchor line, or 0 with no selection.
    pub fn anchor_line(&mut self) -> ApiResult<i64> {
        self.with_editor(|ed| ed.selection_anchor().map_or(0, |a| one_based(a.y)))
    }

    /// 1-based anchor column, or 0 with no selection.
    pub fn anchor_col(&mut self) -> ApiResult<i64> {
        self.with_editor(|ed| ed.selection_anchor().map_or(0, |a| one_based(a.x)))
    }

    pub fn cancel_selection(&mut self) -> ApiResult<()> {
        self.with_editor(|ed| ed.cancel_selection())
    }

    // ----- document -----

    /// Text of line `n`, or an empty string past the end.
    pub fn line(&mut self, n: i64) -> ApiResult<String> {
        self.with_editor(|ed| ed.line(zero_based(n)).unwrap_or_default().to_string())
    }

    pub fn current_line_text(&mut self) -> ApiResult<String> {
        self.with_editor(|ed| ed.line(ed.cursor().y).unwrap_or_default().to_string())
    }

    pub fn line_count(&mut self) -> ApiResult<i64> {
        self.with_editor(|ed| i64::try_from(ed.line_count()).unwrap_or(i64::MAX))
    }

    pub fn insert_line(&mut self, n: i64, text: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.insert_line_at(zero_based(n), text))
    }

    pub fn remove_line(&mut self, n: i64) -> ApiResult<()> {
        self.with_editor(|ed| ed.remove_line_at(zero_based(n)))
    }

    pub fn insert(&mut self, text: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.insert(text))
    }

    pub fn insert_at(&mut self, line: i64, col: i64, text: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.insert_at(Self::pos(line, col), text))
    }

    pub fn remove_at(&mut self, line: i64, col: i64) -> ApiResult<()> {
        self.with_editor(|ed| ed.remove_at(Self::pos(line, col)))
    }

    pub fn backspace(&mut self) -> ApiResult<()> {
        self.with_editor(|ed| ed.backspace())
    }

    /// Get the entire buffer contents as a single string.
    pub fn text(&mut self) -> ApiResult<String> {
        self.with_editor(|ed| ed.contents())
    }

    pub fn document_type(&mut self) -> ApiResult<String> {
        self.with_editor(|ed| ed.document_type().to_string())
    }

    pub fn set_document_type(&mut self, name: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.set_document_type(name))
    }

    pub fn tab_width(&mut self) -> ApiResult<i64> {
        self.with_editor(|ed| i64::try_from(ed.tab_width()).unwrap_or(i64::MAX))
    }

    pub fn is_pasting(&mut self) -> ApiResult<bool> {
        self.with_editor(|ed| ed.is_pasting())
    }

    /// Return the current file path as a string (empty if unnamed).
    pub fn file_path(&mut self) -> ApiResult<String> {
        self.with_editor(|ed| {
            ed.file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        })
    }

    // ----- feedback -----

    pub fn info(&mut self, msg: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.display_info(msg))
    }

    pub fn warning(&mut self, msg: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.display_warning(msg))
    }

    pub fn error(&mut self, msg: &str) -> ApiResult<()> {
        self.with_editor(|ed| ed.display_error(msg))
    }

    /// The answer, or `()` if the prompt was cancelled.
    pub fn prompt(&mut self, question: &str) -> ApiResult<Dynamic> {
        self.with_editor(|ed| ed.prompt(question).map_or(Dynamic::UNIT, Dynamic::from))
    }
}

/// Register all `ScriptApi` methods with the Rhai engine.
pub fn register_api(engine: &mut rhai::Engine) {
    engine.register_type_with_name::<ScriptApi>("Editor");
    engine.register_fn("cursor_line", ScriptApi::cursor_line);
    engine.register_fn("cursor_col", ScriptApi::cursor_col);
    engine.register_fn("set_cursor", ScriptApi::set_cursor);
    engine.register_fn("select_to", ScriptApi::select_to);
    engine.register_fn("has_selection", ScriptApi::has_selection);
    engine.register_fn("anchor_line", ScriptApi::anchor_line);
    engine.register_fn("anchor_col", ScriptApi::anchor_col);
    engine.register_fn("cancel_selection", ScriptApi::cancel_selection);
    engine.register_fn("line", ScriptApi::line);
    engine.register_fn("current_line_text", ScriptApi::current_line_text);
    engine.register_fn("line_count", ScriptApi::line_count);
    engine.register_fn("insert_line", ScriptApi::insert_line);
    engine.register_fn("remove_line", ScriptApi::remove_line);
    engine.register_fn("insert", ScriptApi::insert);
    engine.register_fn("insert_at", ScriptApi::insert_at);
    engine.register_fn("remove_at", ScriptApi::remove_at);
    engine.register_fn("backspace", ScriptApi::backspace);
    engine.register_fn("text", ScriptApi::text);
    engine.register_fn("document_type", ScriptApi::document_type);
    engine.register_fn("set_document_type", ScriptApi::set_document_type);
    engine.register_fn("tab_width", ScriptApi::tab_width);
    engine.register_fn("is_pasting", ScriptApi::is_pasting);
    engine.register_fn("file_path", ScriptApi::file_path);
    engine.register_fn("info", ScriptApi::info);
    engine.register_fn("warning", ScriptApi::warning);
    engine.register_fn("error", ScriptApi::error);
    engine.register_fn("prompt", ScriptApi::prompt);
}
