//! File operations: open and save.

use super::Editor;
use crate::buffer::Buffer;
use crate::filetypes;
use crate::types::Pos;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

impl Editor {
    /// Open `path`. A file that does not exist yet becomes an empty document with that path.
    pub fn open_path(&mut self, path: PathBuf) -> Result<()> {
        self.buf = if path.exists() {
            let s = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Buffer::from_string(&s)
        } else {
            Buffer::new()
        };
        self.cursor = Pos::default();
        self.anchor = None;
        self.dirty = false;
        let first = self.buf.line(0).unwrap_or_default();
        self.doc_type = filetypes::detect(Some(&path), first).to_string();
        tracing::debug!(path = %path.display(), doc_type = %self.doc_type, "opened");
        self.file_path = Some(path);
        Ok(())
    }

    /// Save the buffer to its own path.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .file_path
            .clone()
            .context("The document has no file name")?;
        self.save_to_path(&path)
    }

    /// Save the buffer to a specific path.
    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        let content = self.buf.contents();
        fs::write(path, content).with_context(|| format!("Failed writing {}", path.display()))?;
        self.file_path = Some(path.to_path_buf());
        self.dirty = false;
        tracing::info!(path = %path.display(), "saved");
        Ok(())
    }
}
