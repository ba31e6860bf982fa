//! `kpad-ext`: the extension runtime of the kpad editor.
//!
//! ## Reading guide (high level architecture)
//! - **`extensions`**: resolves extension names on a search path, loads `.rhai` scripts or
//!   built-ins, and merges their handlers into ordered two-phase chains (`Registry`).
//! - **`builtin`**: the extensions compiled into the host: bracket/quote pairing,
//!   auto-indentation (on top of the `indent` oracle) and comment toggling.
//! - **`capabilities::Capabilities`**: the only surface extensions use to touch a document.
//! - **`editor::Editor`**: a headless host implementing that surface over a `buffer::Buffer`.
//! - **`session::Session`**: wires an editor, its chains and its commands together, and feeds
//!   keys, pastes and commands through them.

pub mod buffer;
pub mod builtin;
pub mod capabilities;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod extensions;
pub mod filetypes;
pub mod logging;
pub mod session;
pub mod types;
pub mod utils;
