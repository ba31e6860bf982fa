//! Document type detection: by extension, then by file name, then by shebang line.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// The document type for anything unrecognized.
pub const PLAIN_TEXT: &str = "Plain Text";

struct FileType {
    name: &'static str,
    extensions: &'static [&'static str],
    files: &'static [&'static str],
    /// Interpreter names as they appear after `#!` (with or without `env`).
    interpreters: &'static [&'static str],
}

const TYPES: &[FileType] = &[
    FileType { name: "Rust", extensions: &["rs"], files: &[], interpreters: &[] },
    FileType { name: "Python", extensions: &["py", "pyw", "pyi"], files: &[], interpreters: &["python", "python3"] },
    FileType { name: "Ruby", extensions: &["rb", "rake", "gemspec"], files: &["Gemfile", "Rakefile"], interpreters: &["ruby"] },
    FileType { name: "Lua", extensions: &["lua"], files: &[], interpreters: &["lua"] },
    FileType { name: "Shell", extensions: &["sh", "bash", "zsh"], files: &[".bashrc", ".zshrc", ".profile"], interpreters: &["sh", "bash", "zsh"] },
    FileType { name: "C", extensions: &["c", "h"], files: &[], interpreters: &[] },
    FileType { name: "C++", extensions: &["cpp", "cc", "cxx", "hpp", "hh"], files: &[], interpreters: &[] },
    FileType { name: "JavaScript", extensions: &["js", "mjs", "cjs"], files: &[], interpreters: &["node"] },
    FileType { name: "TypeScript", extensions: &["ts", "tsx"], files: &[], interpreters: &[] },
    FileType { name: "Go", extensions: &["go"], files: &[], interpreters: &[] },
    FileType { name: "Java", extensions: &["java"], files: &[], interpreters: &[] },
    FileType { name: "TOML", extensions: &["toml"], files: &["Cargo.lock"], interpreters: &[] },
    FileType { name: "YAML", extensions: &["yml", "yaml"], files: &[], interpreters: &[] },
    FileType { name: "SQL", extensions: &["sql"], files: &[], interpreters: &[] },
    FileType { name: "Haskell", extensions: &["hs"], files: &[], interpreters: &["runhaskell"] },
    FileType { name: "Makefile", extensions: &["mk"], files: &["Makefile", "makefile", "GNUmakefile"], interpreters: &[] },
    FileType { name: "Markdown", extensions: &["md", "markdown"], files: &[], interpreters: &[] },
];

fn shebang_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    // `#!/usr/bin/python3`, `#! /bin/sh`, `#!/usr/bin/env ruby -w`
    RE.get_or_init(|| Regex::new(r"^#!\s*\S*/(?:env\s+(?:-\S+\s+)*)?([A-Za-z0-9_.+-]+)").ok())
        .as_ref()
}

/// The interpreter named by a shebang line, with any version suffix kept.
fn interpreter(first_line: &str) -> Option<&str> {
    shebang_re()?
        .captures(first_line.trim_end())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Detect the document type from a path and the document's first line.
pub fn detect(path: Option<&Path>, first_line: &str) -> &'static str {
    if let Some(path) = path {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if let Some(t) = TYPES.iter().find(|t| t.extensions.contains(&ext)) {
            return t.name;
        }
        let file = path.file_name().and_then(|f| f.to_str()).unwrap_or_default();
        if let Some(t) = TYPES.iter().find(|t| t.files.contains(&file)) {
            return t.name;
        }
    }
    interpreter(first_line)
        .and_then(|i| TYPES.iter().find(|t| t.interpreters.contains(&i)))
        .map_or(PLAIN_TEXT, |t| t.name)
}

/// Canonical spelling of a user-supplied type name (`"python"` → `"Python"`).
pub fn canonical_name(name: &str) -> Option<&'static str> {
    TYPES
        .iter()
        .map(|t| t.name)
        .chain(std::iter::once(PLAIN_TEXT))
        .find(|n| n.eq_ignore_ascii_case(name))
}
