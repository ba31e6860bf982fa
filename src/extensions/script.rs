//! Script extensions: compile a `.rhai` file, run its top level, collect what it registered.
//!
//! ```rhai
//! ext.on("enter", |ed| ed.info("new line"));
//! ext.before("backspace", |ed| { /* ... */ });
//! ext.command("shout", "Insert a bang", |ed| ed.insert("!"));
//! ```

use super::api::{register_api, ScriptApi};
use super::event::Trigger;
use super::registry::RegisteredHandlers;
use crate::editor::Editor;
use crate::error::ExtensionError;
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, Position, Scope, AST};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Operation limit per script call; keeps a runaway handler from hanging the editor forever.
const MAX_OPERATIONS: u64 = 2_000_000;

/// What a script's top level declared, in declaration order.
#[derive(Default)]
struct Declared {
    bindings: Vec<(Trigger, FnPtr)>,
    commands: Vec<(String, String, FnPtr)>,
}

/// The `ext` object scripts register through.
#[derive(Clone, Default)]
struct Registrar {
    declared: Rc<RefCell<Declared>>,
}

impl Registrar {
    fn bind(&mut self, spelling: &str, f: FnPtr) -> Result<(), Box<EvalAltResult>> {
        let trigger = Trigger::parse(spelling).map_err(|e| {
            Box::new(EvalAltResult::ErrorRuntime(e.to_string().into(), Position::NONE))
        })?;
        self.declared.borrow_mut().bindings.push((trigger, f));
        Ok(())
    }

    fn on(&mut self, event: &str, f: FnPtr) -> Result<(), Box<EvalAltResult>> {
        self.bind(event, f)
    }

    fn before(&mut self, event: &str, f: FnPtr) -> Result<(), Box<EvalAltResult>> {
        let spelling = format!("{}{event}", super::event::BEFORE_PREFIX);
        self.bind(&spelling, f)
    }

    fn command(&mut self, name: &str, description: &str, f: FnPtr) {
        self.declared
            .borrow_mut()
            .commands
            .push((name.to_string(), description.to_string(), f));
    }
}

/// A configured scripting engine shared by every handler it produces.
pub struct ScriptHost {
    engine: Rc<Engine>,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        register_api(&mut engine);
        engine.register_type_with_name::<Registrar>("Registrar");
        engine.register_fn("on", Registrar::on);
        engine.register_fn("before", Registrar::before);
        engine.register_fn("command", Registrar::command);
        Self {
            engine: Rc::new(engine),
        }
    }

    /// Compile and run the script at `path`, returning its registrations.
    pub fn load(&self, name: &str, path: &Path) -> Result<RegisteredHandlers, ExtensionError> {
        let source = std::fs::read_to_string(path).map_err(|source| ExtensionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ast = self
            .engine
            .compile(&source)
            .map_err(|e| ExtensionError::Compile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        self.run(name, ast)
    }

    /// Run compiled top-level code and wrap every declared closure as a handler.
    fn run(&self, name: &str, ast: AST) -> Result<RegisteredHandlers, ExtensionError> {
        let registrar = Registrar::default();
        let mut scope = Scope::new();
        scope.push("ext", registrar.clone());
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| ExtensionError::Script {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let declared = registrar.declared.take();
        let ast = Rc::new(ast);
        let mut handlers = RegisteredHandlers::new(name);
        for (trigger, f) in declared.bindings {
            let call = self.caller(&ast, f, trigger.to_string());
            handlers.bind(trigger, call);
        }
        for (cmd, description, f) in declared.commands {
            let call = self.caller(&ast, f, cmd.clone());
            handlers.command(cmd, description, call);
        }
        Ok(handlers)
    }

    fn caller(
        &self,
        ast: &Rc<AST>,
        f: FnPtr,
        what: String,
    ) -> impl Fn(&mut Editor) -> anyhow::Result<()> + 'static {
        let engine = Rc::clone(&self.engine);
        let ast = Rc::clone(ast);
        move |ed: &mut Editor| {
            let (api, _lease) = ScriptApi::lend(ed);
            f.call::<Dynamic>(&engine, &ast, (api,))
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!("{what}: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::commands::CommandRegistry;
    use crate::config::DocumentConfig;
    use crate::extensions::event::EventId;
    use crate::extensions::registry::Registry;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn script(src: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".rhai").tempfile().unwrap();
        f.write_all(src.as_bytes()).unwrap();
        f
    }

    #[test]
    fn script_handlers_run_in_declaration_order() {
        let f = script(
            r#"
            ext.on("x", |ed| ed.insert("1"));
            ext.before("x", |ed| ed.insert("0"));
            ext.on("x", |ed| ed.insert("2"));
            "#,
        );
        let reg = ScriptHost::new().load("nums.rhai", f.path()).unwrap();
        assert_eq!(reg.len(), 3);

        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::char('x'), &mut ed, |ed| ed.apply_default(&EventId::char('x')));
        assert_eq!(ed.contents(), "0x12");
    }

    #[test]
    fn api_is_one_based() {
        let f = script(
            r#"
            ext.on("enter", |ed| {
                ed.insert_line(1, "top");
                ed.set_cursor(1, 2);
                ed.info(`${ed.cursor_line()}:${ed.cursor_col()} of ${ed.line_count()}`);
            });
            "#,
        );
        let reg = ScriptHost::new().load("pos.rhai", f.path()).unwrap();
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::parse("enter").unwrap(), &mut ed, |_| {});
        assert_eq!(ed.line(0), Some("top"));
        assert_eq!(ed.feedback()[0].text, "1:2 of 2");
    }

    #[test]
    fn closures_capture_top_level_state() {
        let f = script(
            r#"
            let greeting = "hi";
            ext.command("greet", "Say hello", |ed| ed.insert(greeting));
            "#,
        );
        let reg = ScriptHost::new().load("greet.rhai", f.path()).unwrap();
        assert_eq!(reg.command_count(), 1);
        let mut commands = CommandRegistry::new();
        let _ = Registry::from_registrations([reg], &mut commands);
        let mut ed = Editor::new(DocumentConfig::default());
        commands.get("greet").unwrap().handler.call(&mut ed).unwrap();
        assert_eq!(ed.contents(), "hi");
    }

    #[test]
    fn prompt_returns_unit_when_cancelled() {
        let f = script(
            r#"
            ext.on("ctrl_g", |ed| {
                let a = ed.prompt("name?");
                if a == () { ed.warning("cancelled") } else { ed.insert(a) }
            });
            "#,
        );
        let reg = ScriptHost::new().load("ask.rhai", f.path()).unwrap();
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = Editor::new(DocumentConfig::default());
        let ctrl_g = EventId::parse("ctrl_g").unwrap();
        ed.push_answer("bob");
        registry.dispatch(&ctrl_g, &mut ed, |_| {});
        registry.dispatch(&ctrl_g, &mut ed, |_| {});
        assert_eq!(ed.contents(), "bob");
        assert_eq!(ed.feedback()[0].text, "cancelled");
    }

    #[test]
    fn runtime_error_in_handler_is_reported() {
        let f = script(r#"ext.on("x", |ed| { throw "nope"; });"#);
        let reg = ScriptHost::new().load("bad.rhai", f.path()).unwrap();
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::char('x'), &mut ed, |_| {});
        assert!(ed.feedback()[0].text.contains("nope"));
    }

    #[test]
    fn kept_editor_handle_is_dead_after_its_call() {
        let f = script(
            r#"
            let saved = ();
            ext.on("x", |ed| { saved = ed; });
            ext.on("y", |ed| saved.insert("!"));
            "#,
        );
        let reg = ScriptHost::new().load("keep.rhai", f.path()).unwrap();
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());

        let mut first = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::char('x'), &mut first, |_| {});
        drop(first);

        let mut second = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::char('y'), &mut second, |_| {});
        assert_eq!(second.contents(), "");
        assert_eq!(second.feedback().len(), 1);
        assert!(second.feedback()[0].text.contains("outside of its handler call"));
    }

    #[test]
    fn infinite_loop_hits_operation_limit() {
        let f = script(r#"ext.on("x", |ed| { loop { } });"#);
        let reg = ScriptHost::new().load("spin.rhai", f.path()).unwrap();
        let registry = Registry::from_registrations([reg], &mut CommandRegistry::new());
        let mut ed = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::char('x'), &mut ed, |_| {});
        assert_eq!(ed.feedback().len(), 1);
    }

    #[test]
    fn load_errors() {
        let host = ScriptHost::new();
        let f = script("ext.on(");
        assert!(matches!(host.load("a", f.path()), Err(ExtensionError::Compile { .. })));

        let f = script(r#"ext.on("ctrl_bogus", |ed| 1);"#);
        assert!(matches!(host.load("b", f.path()), Err(ExtensionError::Script { .. })));

        let err = host.load("c", Path::new("/no/such/file.rhai")).unwrap_err();
        assert!(matches!(err, ExtensionError::Read { .. }));
    }
}
