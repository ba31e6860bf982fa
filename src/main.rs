//! `kpad-ext`: run a document through the kpad extension runtime without a terminal.
//!
//! Opens a file, loads the configured extensions, replays keys/pastes/commands, fires
//! `exit`, then prints the buffer (or writes it back with `--write`).

use anyhow::{Context, Result};
use clap::Parser;
use kpad_ext::capabilities::Capabilities;
use kpad_ext::config::Config;
use kpad_ext::editor::Editor;
use kpad_ext::extensions::{EventId, Handler};
use kpad_ext::filetypes;
use kpad_ext::logging;
use kpad_ext::session::Session;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kpad-ext")]
#[command(version, about = "Replay input through kpad's extension runtime")]
struct Cli {
    /// Configuration file (defaults to the user-level kpad.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Document type, overriding detection (e.g. "python")
    #[arg(long = "type", value_name = "NAME")]
    doc_type: Option<String>,

    /// Whitespace-separated key identifiers, e.g. "i f space x : enter"
    #[arg(long)]
    keys: Option<String>,

    /// Literal text typed one key per char
    #[arg(long)]
    text: Option<String>,

    /// Text delivered as a bracketed paste
    #[arg(long)]
    paste: Option<String>,

    /// Commands to run after the input, in order
    #[arg(long = "command", value_name = "NAME")]
    commands: Vec<String>,

    /// Answers for prompts, consumed in order
    #[arg(long = "answer", value_name = "TEXT")]
    answers: Vec<String>,

    /// Save the result back to FILE instead of printing it
    #[arg(long)]
    write: bool,

    /// List the merged handler chains and exit
    #[arg(long)]
    chains: bool,

    /// File to open (a missing file starts empty)
    file: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init(&config.log);

    let mut editor = Editor::new(config.document);
    editor.open_path(cli.file.clone())?;
    if let Some(name) = &cli.doc_type {
        let name = filetypes::canonical_name(name).unwrap_or(name.as_str());
        editor.set_document_type(name);
    }
    for answer in &cli.answers {
        editor.push_answer(answer.clone());
    }

    let mut session = Session::new(&config, editor);
    if let Some(warning) = session.report().warning() {
        eprintln!("{warning}");
    }

    if cli.chains {
        print_chains(&session);
        return Ok(());
    }

    if let Some(keys) = &cli.keys {
        for spelling in keys.split_whitespace() {
            let event = EventId::parse(spelling)
                .with_context(|| format!("Invalid key '{spelling}'"))?;
            session.handle_key(&event);
        }
    }
    if let Some(text) = &cli.text {
        for c in text.chars() {
            session.handle_key(&EventId::char(c));
        }
    }
    if let Some(text) = &cli.paste {
        session.paste(text);
    }
    for name in &cli.commands {
        session.run_command(name);
    }
    session.shutdown();

    for fb in session.editor.feedback() {
        eprintln!("{fb}");
    }
    if cli.write {
        session.editor.save()?;
    } else {
        print!("{}", session.editor.contents());
    }
    Ok(())
}

fn print_chains(session: &Session) {
    for ext in &session.report().loaded {
        println!(
            "loaded {} from {} ({} handlers, {} commands)",
            ext.name, ext.source, ext.handlers, ext.commands
        );
    }
    let registry = session.registry();
    for trigger in registry.triggers() {
        let origins: Vec<_> = registry
            .chain_for(&trigger)
            .iter()
            .map(Handler::origin)
            .collect();
        println!("{trigger}: {}", origins.join(", "));
    }
    for name in session.commands().list_names() {
        if let Some(cmd) = session.commands().get(&name) {
            println!("command {name}: {}", cmd.description);
        }
    }
}
