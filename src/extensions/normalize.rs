//! Folding of alias spellings: several identifiers name the same physical key.
//!
//! The literal spelling is canonical. `"space"` becomes `" "` (with each modifier
//! variant), and `"shift_tab"` becomes `"shift_backtab"`, which is what terminals report.

use super::event::{EventId, Key, Modifiers};
use std::collections::HashMap;

/// `(symbolic, literal)` pairs.
fn aliases() -> [(EventId, EventId); 5] {
    let space = |mods| (EventId::chord(mods, Key::Space), EventId::chord(mods, Key::Char(' ')));
    [
        space(Modifiers::NONE),
        space(Modifiers::CTRL),
        space(Modifiers::ALT),
        space(Modifiers::CTRL_ALT),
        (
            EventId::chord(Modifiers::SHIFT, Key::Tab),
            EventId::chord(Modifiers::SHIFT, Key::BackTab),
        ),
    ]
}

/// Fold every symbolic slot into its literal slot, symbolic handlers first.
///
/// A symbolic chain with no literal counterpart is simply renamed.
pub fn normalize<H>(table: &mut HashMap<EventId, Vec<H>>) {
    for (symbolic, literal) in aliases() {
        let Some(mut chain) = table.remove(&symbolic) else {
            continue;
        };
        if let Some(rest) = table.remove(&literal) {
            chain.extend(rest);
        }
        if !chain.is_empty() {
            tracing::debug!(from = %symbolic, to = %literal, handlers = chain.len(), "folded alias");
            table.insert(literal, chain);
        }
    }
}

/// The canonical identifier for an incoming event.
pub fn canonical(event: &EventId) -> EventId {
    aliases()
        .into_iter()
        .find_map(|(symbolic, literal)| (symbolic == *event).then_some(literal))
        .unwrap_or_else(|| event.clone())
}
