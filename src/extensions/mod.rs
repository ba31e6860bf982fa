//! Extension system: resolves extension names, loads them in order, and merges their
//! handlers into a [`Registry`].
//!
//! An extension named `X` is looked up as `./X`, then in the user configuration
//! directory (`~/.config/kpad/extensions/X` on Linux), then in the platform data directory.
//! The first existing file wins. Built-in extensions need no file; a file of the same name
//! on the search path replaces the built-in.

pub mod api;
pub mod event;
pub mod normalize;
pub mod registry;
pub mod script;

use crate::builtin::BuiltinExtension;
use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::error::ExtensionError;
use directories::ProjectDirs;
use script::ScriptHost;
use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

pub use event::{EventId, Key, Modifiers, Phase, Trigger};
pub use registry::{Handler, RegisteredHandlers, Registry};

/// Ordered list of extensions to load. Order decides chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    entries: Vec<String>,
}

impl LoadPlan {
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.extensions.iter().cloned())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Directories searched for extension files, in priority order.
#[derive(Debug, Clone)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Current directory, then the user config subdirectory, then the platform data one.
    pub fn standard() -> Self {
        let mut dirs = vec![PathBuf::from(".")];
        if let Some(proj) = ProjectDirs::from("", "", "kpad") {
            dirs.push(proj.config_dir().join("extensions"));
            let data = proj.data_dir().join("extensions");
            if !dirs.contains(&data) {
                dirs.push(data);
            }
        }
        Self { dirs }
    }

    /// The first existing file called `name`.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|d| d.join(name))
            .find(|p| p.is_file())
    }
}

/// Where an extension's behavior came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Builtin(BuiltinExtension),
    Script(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(b) => write!(f, "built-in {}", b.file_name()),
            Self::Script(p) => write!(f, "{}", p.display()),
        }
    }
}

/// One successfully loaded extension.
#[derive(Debug, Clone)]
pub struct LoadedExtension {
    pub name: String,
    pub source: Source,
    pub handlers: usize,
    pub commands: usize,
}

/// Outcome of loading a plan.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LoadedExtension>,
    pub failures: Vec<ExtensionError>,
}

impl LoadReport {
    pub fn any_failed(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One aggregated message for every failure, or `None` if all loaded.
    pub fn warning(&self) -> Option<String> {
        if !self.any_failed() {
            return None;
        }
        let mut msg = String::from("Some extensions failed to load:\n");
        for e in &self.failures {
            let _ = writeln!(msg, "  - {e}");
        }
        msg.push_str(
            "Install the missing extensions into one of the extension directories, \
             or remove them from `extensions` in kpad.toml.",
        );
        Some(msg)
    }
}

/// Resolves extension names to behavior.
pub struct Loader {
    search: SearchPath,
    scripts: ScriptHost,
}

impl Loader {
    pub fn new(search: SearchPath) -> Self {
        Self {
            search,
            scripts: ScriptHost::new(),
        }
    }

    /// Find where `name` comes from without loading it.
    pub fn resolve(&self, name: &str) -> Result<Source, ExtensionError> {
        if let Some(path) = self.search.find(name) {
            return Ok(Source::Script(path));
        }
        BuiltinExtension::from_file_name(name)
            .map(Source::Builtin)
            .ok_or_else(|| ExtensionError::NotFound {
                name: name.to_string(),
            })
    }

    /// Load `name`, producing its registrations.
    pub fn load(&self, name: &str) -> Result<(Source, RegisteredHandlers), ExtensionError> {
        let source = self.resolve(name)?;
        let handlers = match &source {
            Source::Builtin(b) => b.registrations(),
            Source::Script(path) => self.scripts.load(name, path)?,
        };
        Ok((source, handlers))
    }
}

impl Registry {
    /// Load every plan entry in order, merge, then normalize aliases once.
    ///
    /// Failures never abort the build: they are logged and collected in the report.
    pub fn build(
        plan: &LoadPlan,
        loader: &Loader,
        commands: &mut CommandRegistry,
    ) -> (Self, LoadReport) {
        let mut registry = Self::default();
        let mut report = LoadReport::default();

        for name in plan.entries() {
            match loader.load(name) {
                Ok((source, handlers)) => {
                    tracing::info!(%name, %source, handlers = handlers.len(), "loaded extension");
                    report.loaded.push(LoadedExtension {
                        name: name.clone(),
                        source,
                        handlers: handlers.len(),
                        commands: handlers.command_count(),
                    });
                    registry.merge(handlers, commands);
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    report.failures.push(e);
                }
            }
        }

        registry.normalize();
        (registry, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::editor::Editor;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn empty_loader() -> (tempfile::TempDir, Loader) {
        let dir = tempfile::tempdir().unwrap();
        let loader = Loader::new(SearchPath::new(vec![dir.path().to_path_buf()]));
        (dir, loader)
    }

    #[test]
    fn first_directory_wins() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(b.path().join("x.rhai"), "").unwrap();
        let search = SearchPath::new(vec![a.path().into(), b.path().into()]);
        assert_eq!(search.find("x.rhai"), Some(b.path().join("x.rhai")));

        fs::write(a.path().join("x.rhai"), "").unwrap();
        assert_eq!(search.find("x.rhai"), Some(a.path().join("x.rhai")));
        assert_eq!(search.find("y.rhai"), None);
    }

    #[test]
    fn builtins_need_no_file() {
        let (_dir, loader) = empty_loader();
        assert_eq!(
            loader.resolve("pairs.rhai").unwrap(),
            Source::Builtin(BuiltinExtension::Pairs)
        );
        assert!(matches!(
            loader.resolve("missing.rhai"),
            Err(ExtensionError::NotFound { .. })
        ));
    }

    #[test]
    fn file_overrides_builtin() {
        let (dir, loader) = empty_loader();
        let path = dir.path().join("pairs.rhai");
        fs::write(&path, r#"ext.on("x", |ed| ed.insert("!"));"#).unwrap();
        assert_eq!(loader.resolve("pairs.rhai").unwrap(), Source::Script(path));
    }

    #[test]
    fn missing_extension_is_reported_not_fatal() {
        let (dir, loader) = empty_loader();
        fs::write(dir.path().join("mine.rhai"), r#"ext.on("x", |ed| ed.insert("!"));"#).unwrap();
        let plan = LoadPlan::new(["nope.rhai", "mine.rhai", "gone.rhai"]);
        let (registry, report) = Registry::build(&plan, &loader, &mut CommandRegistry::new());

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.failures.len(), 2);
        let warning = report.warning().unwrap();
        assert!(warning.contains("nope.rhai"));
        assert!(warning.contains("gone.rhai"));
        assert!(warning.contains("kpad.toml"));

        let mut ed = Editor::new(DocumentConfig::default());
        registry.dispatch(&EventId::char('x'), &mut ed, |_| {});
        assert_eq!(ed.contents(), "!");
    }

    #[test]
    fn broken_script_does_not_stop_later_ones() {
        let (dir, loader) = empty_loader();
        fs::write(dir.path().join("bad.rhai"), "ext.on(").unwrap();
        let plan = LoadPlan::new(["bad.rhai", "quickcomment.rhai"]);
        let mut commands = CommandRegistry::new();
        let (_registry, report) = Registry::build(&plan, &loader, &mut commands);
        assert!(report.any_failed());
        assert_eq!(report.loaded[0].name, "quickcomment.rhai");
        assert!(commands.get("comment").is_some());
    }

    #[test]
    fn clean_load_has_no_warning() {
        let (_dir, loader) = empty_loader();
        let plan = LoadPlan::from_config(&Config::default());
        let (registry, report) = Registry::build(&plan, &loader, &mut CommandRegistry::new());
        assert!(report.warning().is_none());
        assert_eq!(report.loaded.len(), 3);
        assert!(!registry.is_empty());
    }

    #[test]
    fn alias_consolidation_across_extensions() {
        let (dir, loader) = empty_loader();
        fs::write(dir.path().join("a.rhai"), r#"ext.on("space", |ed| ed.insert("A"));"#).unwrap();
        fs::write(dir.path().join("b.rhai"), r#"ext.on(" ", |ed| ed.insert("B"));"#).unwrap();
        let plan = LoadPlan::new(["a.rhai", "b.rhai"]);
        let (registry, _) = Registry::build(&plan, &loader, &mut CommandRegistry::new());

        let chain = registry.chain_for(&Trigger::main(EventId::char(' ')));
        let origins: Vec<_> = chain.iter().map(Handler::origin).collect();
        assert_eq!(origins, vec!["a.rhai", "b.rhai"]);
        assert!(registry.chain_for(&Trigger::main(EventId::key(Key::Space))).is_empty());
    }
}
