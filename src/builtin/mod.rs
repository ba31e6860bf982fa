//! Extensions compiled into the host. They load by file name like scripts do, so a file of
//! the same name on the search path replaces one.

pub mod autoindent;
pub mod comment;
pub mod indent;
pub mod pairs;

use crate::extensions::RegisteredHandlers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinExtension {
    Pairs,
    AutoIndent,
    QuickComment,
}

impl BuiltinExtension {
    pub const ALL: [Self; 3] = [Self::Pairs, Self::AutoIndent, Self::QuickComment];

    /// Match a load-plan entry; the `.rhai` suffix is optional.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".rhai").unwrap_or(name);
        Self::ALL.into_iter().find(|b| b.stem() == stem)
    }

    fn stem(self) -> &'static str {
        match self {
            Self::Pairs => "pairs",
            Self::AutoIndent => "autoindent",
            Self::QuickComment => "quickcomment",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Pairs => "pairs.rhai",
            Self::AutoIndent => "autoindent.rhai",
            Self::QuickComment => "quickcomment.rhai",
        }
    }

    /// Fresh handlers with fresh state, tagged with the file name.
    pub fn registrations(self) -> RegisteredHandlers {
        let mut reg = RegisteredHandlers::new(self.file_name());
        match self {
            Self::Pairs => pairs::register(&mut reg),
            Self::AutoIndent => autoindent::register(&mut reg),
            Self::QuickComment => comment::register(&mut reg),
        }
        reg
    }
}
