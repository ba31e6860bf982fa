//! Handler chains: registration, merging in load order, and two-phase dispatch.

use super::event::{EventId, Phase, Trigger};
use super::normalize;
use crate::capabilities::Capabilities;
use crate::commands::{Command, CommandRegistry};
use crate::editor::Editor;
use crate::error::ExtensionError;
use std::collections::HashMap;
use std::fmt;

type HandlerFn = dyn Fn(&mut Editor) -> anyhow::Result<()>;

/// A unit of behavior bound to one trigger, tagged with the extension it came from.
pub struct Handler {
    origin: String,
    func: Box<HandlerFn>,
}

impl Handler {
    pub fn new(
        origin: impl Into<String>,
        func: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
    ) -> Self {
        Self {
            origin: origin.into(),
            func: Box::new(func),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn call(&self, ed: &mut Editor) -> anyhow::Result<()> {
        (self.func)(ed)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("origin", &self.origin).finish_non_exhaustive()
    }
}

/// A command declared by an extension, not yet in the command registry.
#[derive(Debug)]
struct CommandDecl {
    name: String,
    description: String,
    handler: Handler,
}

/// Everything one extension registered while loading, in declaration order.
#[derive(Debug)]
pub struct RegisteredHandlers {
    origin: String,
    bindings: Vec<(Trigger, Handler)>,
    commands: Vec<CommandDecl>,
}

impl RegisteredHandlers {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            bindings: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Bind a handler to `trigger`.
    pub fn bind(
        &mut self,
        trigger: Trigger,
        func: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
    ) -> &mut Self {
        let handler = Handler::new(self.origin.clone(), func);
        self.bindings.push((trigger, handler));
        self
    }

    /// Bind a main-phase handler (runs after the host's default handling).
    pub fn on(
        &mut self,
        event: EventId,
        func: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
    ) -> &mut Self {
        self.bind(Trigger::main(event), func)
    }

    /// Bind a pre-phase handler (runs before the host's default handling).
    pub fn before(
        &mut self,
        event: EventId,
        func: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
    ) -> &mut Self {
        self.bind(Trigger::pre(event), func)
    }

    /// Bind a pre/main pair for the same event.
    pub fn pair(
        &mut self,
        event: EventId,
        pre: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
        main: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
    ) -> &mut Self {
        self.before(event.clone(), pre);
        self.on(event, main)
    }

    /// Declare a named command.
    pub fn command(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: impl Fn(&mut Editor) -> anyhow::Result<()> + 'static,
    ) -> &mut Self {
        let handler = Handler::new(self.origin.clone(), func);
        self.commands.push(CommandDecl {
            name: name.into(),
            description: description.into(),
            handler,
        });
        self
    }

    /// Number of event bindings (commands not included).
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

/// The merged handler chains for one session.
///
/// Chains are only mutated while merging; dispatch reads them.
#[derive(Default)]
pub struct Registry {
    pre: HashMap<EventId, Vec<Handler>>,
    main: HashMap<EventId, Vec<Handler>>,
}

impl Registry {
    /// Build a registry from already-loaded extensions, in order, then normalize aliases.
    ///
    /// Commands declared by the extensions go into `commands`.
    pub fn from_registrations(
        loads: impl IntoIterator<Item = RegisteredHandlers>,
        commands: &mut CommandRegistry,
    ) -> Self {
        let mut registry = Self::default();
        for handlers in loads {
            registry.merge(handlers, commands);
        }
        registry.normalize();
        registry
    }

    /// Append one extension's handlers after everything merged before it.
    pub(crate) fn merge(&mut self, handlers: RegisteredHandlers, commands: &mut CommandRegistry) {
        let RegisteredHandlers { origin, bindings, commands: decls } = handlers;
        tracing::debug!(%origin, bindings = bindings.len(), commands = decls.len(), "merging");
        for (trigger, handler) in bindings {
            let table = match trigger.phase {
                Phase::Pre => &mut self.pre,
                Phase::Main => &mut self.main,
            };
            table.entry(trigger.event).or_default().push(handler);
        }
        for decl in decls {
            commands.register(Command {
                name: decl.name,
                description: format!("{} (extension: {origin})", decl.description),
                handler: decl.handler,
            });
        }
    }

    /// Fold alias spellings into their canonical slots. Runs once after all merges.
    pub(crate) fn normalize(&mut self) {
        normalize::normalize(&mut self.pre);
        normalize::normalize(&mut self.main);
    }

    /// The ordered chain for `trigger` (empty if nothing is bound).
    pub fn chain_for(&self, trigger: &Trigger) -> &[Handler] {
        let table = match trigger.phase {
            Phase::Pre => &self.pre,
            Phase::Main => &self.main,
        };
        table.get(&trigger.event).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every trigger with a non-empty chain, sorted by spelling.
    pub fn triggers(&self) -> Vec<Trigger> {
        let mut out: Vec<Trigger> = self
            .pre
            .keys()
            .map(|e| Trigger::pre(e.clone()))
            .chain(self.main.keys().map(|e| Trigger::main(e.clone())))
            .collect();
        out.sort_by_key(ToString::to_string);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.main.is_empty()
    }

    /// Dispatch `event`: pre catch-all, pre chain, `default`, main catch-all, main chain.
    ///
    /// The catch-all chains only run for key events. Handler errors are reported and the
    /// chain carries on. Returns the number of handlers run.
    pub fn dispatch(
        &self,
        event: &EventId,
        ed: &mut Editor,
        default: impl FnOnce(&mut Editor),
    ) -> usize {
        let event = normalize::canonical(event);
        let any = event.is_key();
        tracing::trace!(%event, "dispatch");

        let mut ran = 0;
        if any {
            ran += run_chain(&self.pre, &EventId::AnyKey, Phase::Pre, ed);
        }
        ran += run_chain(&self.pre, &event, Phase::Pre, ed);
        default(ed);
        if any {
            ran += run_chain(&self.main, &EventId::AnyKey, Phase::Main, ed);
        }
        ran += run_chain(&self.main, &event, Phase::Main, ed);
        ran
    }
}

fn run_chain(
    table: &HashMap<EventId, Vec<Handler>>,
    event: &EventId,
    phase: Phase,
    ed: &mut Editor,
) -> usize {
    let Some(chain) = table.get(event) else {
        return 0;
    };
    for handler in chain {
        if let Err(e) = handler.call(ed) {
            let err = ExtensionError::Handler {
                origin: handler.origin().to_string(),
                event: Trigger { phase, event: event.clone() }.to_string(),
                message: format!("{e:#}"),
            };
            tracing::warn!("{err}");
            ed.display_error(&err.to_string());
        }
    }
    chain.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::extensions::event::{Key, Modifiers};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(log: &Log, tag: &str) -> impl Fn(&mut Editor) -> anyhow::Result<()> + 'static {
        let log = log.clone();
        let tag = tag.to_string();
        move |_ed: &mut Editor| {
            log.borrow_mut().push(tag.clone());
            Ok(())
        }
    }

    fn editor() -> Editor {
        Editor::new(DocumentConfig::default())
    }

    #[test]
    fn chain_order_follows_load_order() {
        let log = Log::default();
        let enter = EventId::key(Key::Enter);
        let loads = ["A", "B", "C"].map(|name| {
            let mut reg = RegisteredHandlers::new(name);
            reg.on(enter.clone(), record(&log, name));
            reg
        });
        let registry = Registry::from_registrations(loads, &mut CommandRegistry::new());

        let mut ed = editor();
        for _ in 0..3 {
            registry.dispatch(&enter, &mut ed, |_| {});
        }
        assert_eq!(log.borrow().join(""), "ABCABCABC");
        let origins: Vec<_> = registry
            .chain_for(&Trigger::main(enter))
            .iter()
            .map(Handler::origin)
            .collect();
        assert_eq!(origins, vec!["A", "B", "C"]);
    }

    #[test]
    fn declaration_order_within_one_extension() {
        let log = Log::default();
        let x = EventId::char('x');
        let mut reg = RegisteredHandlers::new("A");
        reg.on(x.clone(), record(&log, "A"))
            .on(x.clone(), record(&log, "A"));
        let mut later = RegisteredHandlers::new("B");
        later.on(x.clone(), record(&log, "B"));
        let registry = Registry::from_registrations([reg, later], &mut CommandRegistry::new());
        registry.dispatch(&x, &mut editor(), |_| {});
        assert_eq!(*log.borrow(), vec!["A", "A", "B"]);
    }

    #[test]
    fn phases_run_around_default() {
        let log = Log::default();
        let enter = EventId::key(Key::Enter);
        let mut reg = RegisteredHandlers::new("A");
        reg.on(enter.clone(), record(&log, "main"))
            .before(enter.clone(), record(&log, "pre"))
            .on(EventId::AnyKey, record(&log, "*"))
            .before(EventId::AnyKey, record(&log, "before:*"));
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());

        let default_log = log.clone();
        let ran = registry.dispatch(&enter, &mut editor(), move |_| {
            default_log.borrow_mut().push("default".into());
        });
        assert_eq!(ran, 4);
        assert_eq!(*log.borrow(), vec!["before:*", "pre", "default", "*", "main"]);
    }

    #[test]
    fn catch_all_skips_lifecycle_events() {
        let log = Log::default();
        let mut reg = RegisteredHandlers::new("A");
        reg.on(EventId::AnyKey, record(&log, "*"))
            .on(EventId::Exit, record(&log, "exit"));
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        registry.dispatch(&EventId::Exit, &mut editor(), |_| {});
        assert_eq!(*log.borrow(), vec!["exit"]);
    }

    #[test]
    fn handler_error_does_not_stop_chain() {
        let log = Log::default();
        let s = EventId::chord(Modifiers::CTRL, Key::Char('s'));
        let mut bad = RegisteredHandlers::new("bad");
        bad.on(s.clone(), |_ed| anyhow::bail!("boom"));
        let mut good = RegisteredHandlers::new("good");
        good.on(s.clone(), record(&log, "good"));
        let registry = Registry::from_registrations([bad, good], &mut CommandRegistry::new());

        let mut ed = editor();
        registry.dispatch(&s, &mut ed, |_| {});
        assert_eq!(*log.borrow(), vec!["good"]);
        assert_eq!(ed.feedback().len(), 1);
        assert!(ed.feedback()[0].text.contains("'bad'"));
        assert!(ed.feedback()[0].text.contains("ctrl_s"));
    }

    #[test]
    fn partial_mutation_stands_after_error() {
        let x = EventId::char('x');
        let mut reg = RegisteredHandlers::new("A");
        reg.on(x.clone(), |ed| {
            ed.insert("half");
            anyhow::bail!("then failed")
        });
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = editor();
        registry.dispatch(&x, &mut ed, |_| {});
        assert_eq!(ed.contents(), "half");
    }

    #[test]
    fn loading_twice_registers_twice() {
        let log = Log::default();
        let x = EventId::char('x');
        let make = || {
            let mut reg = RegisteredHandlers::new("A");
            reg.on(x.clone(), record(&log, "A"));
            reg
        };
        let registry = Registry::from_registrations([make(), make()], &mut CommandRegistry::new());
        assert_eq!(registry.chain_for(&Trigger::main(x)).len(), 2);
    }

    #[test]
    fn symbolic_dispatch_reaches_literal_chain() {
        let log = Log::default();
        let mut reg = RegisteredHandlers::new("A");
        reg.on(EventId::char(' '), record(&log, "lit"));
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        registry.dispatch(&EventId::key(Key::Space), &mut editor(), |_| {});
        assert_eq!(*log.borrow(), vec!["lit"]);
    }

    #[test]
    fn commands_are_registered() {
        let mut commands = CommandRegistry::new();
        let mut reg = RegisteredHandlers::new("tools");
        reg.command("shout", "Insert a bang", |ed| {
            ed.insert("!");
            Ok(())
        });
        let _ = Registry::from_registrations([reg], &mut commands);
        let cmd = commands.get("SHOUT").unwrap();
        assert_eq!(cmd.description, "Insert a bang (extension: tools)");
        let mut ed = editor();
        cmd.handler.call(&mut ed).unwrap();
        assert_eq!(ed.contents(), "!");
    }
}
