use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use engine::commit::commit_pending;
use engine::docs::describe;
use engine::exec::{BatchOutcome, Interpreter};
use engine::exit_codes;
use engine::io::config::load_config;
use engine::io::deck::{load_slide, write_slide};
use engine::logging;

#[derive(Parser)]
#[command(
    name = "engine",
    version,
    about = "Whitelist-checked execution of agent-generated slide edits"
)]
struct Cli {
    /// Optional engine config (TOML); defaults apply when missing.
    #[arg(long, global = true, default_value = "engine.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the operation whitelist documentation shown to the agent.
    Docs {
        /// Emit call signatures without descriptions.
        #[arg(long)]
        signatures_only: bool,
    },
    /// Run one action batch against a slide document.
    Exec {
        /// Slide document (JSON).
        #[arg(long)]
        slide: PathBuf,
        /// File holding the agent's action batch.
        #[arg(long)]
        actions: PathBuf,
        /// Apply queued edits and rewrite the slide document.
        #[arg(long)]
        commit: bool,
        /// Write batch/statement history to this file as JSON.
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Check a slide document against schema and invariants.
    Validate {
        /// Slide document (JSON).
        #[arg(long)]
        slide: PathBuf,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Docs { signatures_only } => cmd_docs(signatures_only),
        Command::Exec {
            slide,
            actions,
            commit,
            history,
        } => cmd_exec(&cli.config, &slide, &actions, commit, history.as_deref()),
        Command::Validate { slide } => cmd_validate(&slide),
    }
}

fn cmd_docs(signatures_only: bool) -> Result<()> {
    let interpreter = Interpreter::new(Default::default())?;
    let rendered = describe(interpreter.registry().operations(), !signatures_only)?;
    println!("{rendered}");
    Ok(())
}

fn cmd_exec(
    config_path: &Path,
    slide_path: &Path,
    actions_path: &Path,
    commit: bool,
    history_path: Option<&Path>,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let mut interpreter = Interpreter::new(cfg.interpreter_config())?;
    let mut slide = load_slide(slide_path)?;
    let actions = fs::read_to_string(actions_path)
        .with_context(|| format!("read actions {}", actions_path.display()))?;

    let outcome = interpreter.execute(&actions, &mut slide);

    if let Some(path) = history_path {
        let mut buf = serde_json::to_string_pretty(interpreter.history())?;
        buf.push('\n');
        fs::write(path, buf).with_context(|| format!("write history {}", path.display()))?;
    }

    match outcome {
        BatchOutcome::Applied => {
            if commit {
                commit_pending(&mut slide)?;
                write_slide(slide_path, &slide)?;
            }
            println!("applied");
            Ok(())
        }
        BatchOutcome::Rejected { annotated, trace } => {
            eprintln!("{annotated}");
            eprintln!("\n{trace}");
            std::process::exit(exit_codes::REJECTED);
        }
    }
}

fn cmd_validate(slide_path: &Path) -> Result<()> {
    load_slide(slide_path)?;
    println!("ok");
    Ok(())
}
