//! Command registry: named actions declared by extensions.

use crate::extensions::Handler;
use crate::utils::levenshtein_distance;
use std::collections::HashMap;

/// A user-invokable action.
pub struct Command {
    pub name: String,
    pub description: String,
    pub handler: Handler,
}

impl Command {
    /// Name of the extension that declared this command.
    pub fn origin(&self) -> &str {
        self.handler.origin()
    }
}

/// Registry of known commands + lookup tables for fast resolving.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    by_name: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a command.
    ///
    /// Names are case-insensitive; a later registration under the same name wins.
    pub fn register(&mut self, cmd: Command) {
        let name_key = cmd.name.to_lowercase();
        if let Some(&idx) = self.by_name.get(&name_key) {
            tracing::debug!(name = %cmd.name, replaced = self.commands[idx].origin(), "command replaced");
            self.commands[idx] = cmd;
        } else {
            let idx = self.commands.len();
            self.commands.push(cmd);
            self.by_name.insert(name_key, idx);
        }
    }

    /// Lookup a command by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Command> {
        let idx = *self.by_name.get(&name.to_lowercase())?;
        self.commands.get(idx)
    }

    /// List commands (sorted) for help output.
    pub fn list_names(&self) -> Vec<String> {
        let mut v: Vec<_> = self.commands.iter().map(|c| c.name.clone()).collect();
        v.sort();
        v
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Find the closest command by name using Levenshtein distance.
    pub fn suggest_command(&self, name: &str) -> Option<&Command> {
        let name = name.to_lowercase();
        let mut best_dist = usize::MAX;
        let mut best_cmd = None;

        for cmd in &self.commands {
            let dist = levenshtein_distance(&name, &cmd.name.to_lowercase());
            if dist < best_dist {
                best_dist = dist;
                best_cmd = Some(cmd);
            }
        }

        // Only suggest if the distance is small enough (40% of the longer name, at least 2).
        let cmd = best_cmd?;
        let longest = name.chars().count().max(cmd.name.chars().count());
        let threshold = (longest * 2).div_ceil(5).max(2);
        (best_dist <= threshold).then_some(cmd)
    }
}
