//! Error types for configuration and extension loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving, loading, or running an extension.
///
/// None of these abort the session: load errors are collected into a
/// [`LoadReport`](crate::extensions::LoadReport) and handler errors become feedback.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("extension '{name}' was not found on the search path")]
    NotFound { name: String },

    #[error("failed to read extension {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile extension {}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    #[error("extension '{name}' failed while registering: {message}")]
    Script { name: String, message: String },

    #[error("invalid event identifier '{0}'")]
    InvalidTrigger(String),

    #[error("handler from '{origin}' failed on '{event}': {message}")]
    Handler {
        origin: String,
        event: String,
        message: String,
    },
}

/// Errors raised while reading `kpad.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}
