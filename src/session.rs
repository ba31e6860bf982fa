//! A running session: one editor, the merged extension chains and the command registry.

use crate::capabilities::Capabilities;
use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::editor::Editor;
use crate::extensions::normalize::canonical;
use crate::extensions::{EventId, Key, LoadPlan, LoadReport, Loader, Registry, SearchPath};
use crossterm::event::{Event, KeyEventKind};

pub struct Session {
    pub editor: Editor,
    registry: Registry,
    commands: CommandRegistry,
    loader: Loader,
    plan: LoadPlan,
    report: LoadReport,
    exited: bool,
}

impl Session {
    /// Load the configured extensions from the standard search path.
    pub fn new(config: &Config, editor: Editor) -> Self {
        Self::with_loader(
            LoadPlan::from_config(config),
            Loader::new(SearchPath::standard()),
            editor,
        )
    }

    pub fn with_loader(plan: LoadPlan, loader: Loader, editor: Editor) -> Self {
        let mut commands = CommandRegistry::new();
        let (registry, report) = Registry::build(&plan, &loader, &mut commands);
        Self {
            editor,
            registry,
            commands,
            loader,
            plan,
            report,
            exited: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Dispatch one key through both phases around the host's default handling.
    pub fn handle_key(&mut self, event: &EventId) -> usize {
        let event = canonical(event);
        self.registry
            .dispatch(&event, &mut self.editor, |ed| ed.apply_default(&event))
    }

    /// Feed a terminal event. Key releases and events with no binding are ignored.
    pub fn handle_event(&mut self, event: &Event) -> usize {
        match event {
            Event::Key(k) if k.kind != KeyEventKind::Release => {
                EventId::from_key_event(k).map_or(0, |id| self.handle_key(&id))
            }
            Event::Paste(text) => self.paste(text),
            _ => 0,
        }
    }

    /// Bracketed paste: the text goes in at once with paste mode on for both phases.
    pub fn paste(&mut self, text: &str) -> usize {
        self.editor.set_pasting(true);
        let ran = self
            .registry
            .dispatch(&EventId::Paste, &mut self.editor, |ed| {
                ed.replace_selection_or_insert(text);
            });
        self.editor.set_pasting(false);
        ran
    }

    /// A paste from a terminal without bracketed paste: one key per char. The first key
    /// arrives before paste mode is noticed, every later one with it on.
    pub fn replay_paste(&mut self, text: &str) {
        for (i, c) in text.chars().filter(|&c| c != '\r').enumerate() {
            self.editor.set_pasting(i > 0);
            let event = match c {
                '\n' => EventId::key(Key::Enter),
                '\t' => EventId::key(Key::Tab),
                c => EventId::char(c),
            };
            self.handle_key(&event);
        }
        self.editor.set_pasting(false);
    }

    /// Run a named command. Unknown names are reported with a suggestion.
    pub fn run_command(&mut self, name: &str) -> bool {
        let Some(cmd) = self.commands.get(name) else {
            let msg = match self.commands.suggest_command(name) {
                Some(s) => format!("Unknown command '{name}'. Did you mean '{}'?", s.name),
                None => format!("Unknown command '{name}'"),
            };
            self.editor.display_error(&msg);
            return false;
        };
        tracing::debug!(command = %cmd.name, origin = cmd.origin(), "running command");
        if let Err(e) = cmd.handler.call(&mut self.editor) {
            tracing::warn!(command = %cmd.name, "command failed: {e:#}");
            self.editor
                .display_error(&format!("Command '{}' failed: {e:#}", cmd.name));
        }
        true
    }

    /// Drop every chain and command, then load the plan again from scratch.
    pub fn reload(&mut self) -> &LoadReport {
        let mut commands = CommandRegistry::new();
        let (registry, report) = Registry::build(&self.plan, &self.loader, &mut commands);
        tracing::info!(loaded = report.loaded.len(), failed = report.failures.len(), "reloaded");
        self.registry = registry;
        self.commands = commands;
        self.report = report;
        &self.report
    }

    /// Fire `exit`. Only the first call dispatches.
    pub fn shutdown(&mut self) {
        if std::mem::replace(&mut self.exited, true) {
            return;
        }
        self.registry.dispatch(&EventId::Exit, &mut self.editor, |_| {});
    }
}
