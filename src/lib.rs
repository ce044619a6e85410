//! Waymark: durable progress checkpoints for autonomous agents.
//!
//! An agent records "what I just finished" with `waymark save`; a supervisor, or the
//! same agent after an interruption, asks `waymark latest` where to resume.
//!
//! # Core Principles
//!
//! - **Local-first**: State lives in `<project>/.waymark/data/` (or `~/.waymark/data/`)
//! - **Append-only**: A checkpoint is never rewritten; a newer one supersedes it
//! - **Ordered**: Per-agent `sequence` numbers are assigned by the store, never the caller
//! - **Absence-tolerant**: A project without a checkpoint store is not an error for callers
//!
//! # Architecture
//!
//! - `CheckpointStore` persists records (SQLite in WAL mode, one connection per call)
//! - `CheckpointWriter` validates input and serializes saves per agent
//! - `CheckpointReader` serves `latest`/`history` for recovery flows
//! - `core::discovery` finds the project root and probes for the service
//!
//! # Examples
//!
//! ```bash
//! waymark init
//! waymark save implementer "Implementation complete - all tests pass"
//! waymark latest implementer
//! waymark history implementer --limit 5
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: Storage plumbing, discovery, config, errors and logging
//! - [`plugins`]: The checkpoint subsystem

pub mod core;
pub mod plugins;

use crate::core::config::Config;
use crate::core::discovery::{self, DEFAULT_MARKERS};
use crate::core::error::CheckpointError;
use crate::core::logging;
use crate::core::store::{self, Store, StoreKind, WAYMARK_DIR};
use crate::plugins::checkpoint::{
    self, CheckpointService,
    cli::{self as checkpoint_cli, CheckpointCommand},
};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "waymark",
    version = env!("CARGO_PKG_VERSION"),
    about = "Durable progress checkpoints for autonomous agents"
)]
struct Cli {
    /// Store to use: 'repo' (discovered project root) or 'user' (~/.waymark).
    #[clap(long, global = true, default_value = "repo")]
    store: String,
    /// Project root to use instead of walking up from the current directory.
    #[clap(long, global = true)]
    root: Option<PathBuf>,
    /// Fail when no checkpoint store exists instead of skipping.
    #[clap(long, global = true)]
    strict: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the checkpoint store under the project root (or ~/.waymark)
    Init {
        /// Directory to initialize (defaults to the current working directory).
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },
    #[clap(flatten)]
    Checkpoint(CheckpointCommand),
    /// Print the checkpoint subsystem schema as JSON
    Schema,
    /// Print the version
    Version,
}

/// Base directory (the one holding `.waymark`) for the selected store.
fn resolve_base(
    cli: &Cli,
    current_dir: &std::path::Path,
) -> Result<(StoreKind, PathBuf), CheckpointError> {
    match cli.store.as_str() {
        "user" => Ok((StoreKind::User, store::user_home()?)),
        "repo" => Ok((
            StoreKind::Repo,
            match &cli.root {
                Some(root) => root.clone(),
                None => discovery::find_root(current_dir, DEFAULT_MARKERS),
            },
        )),
        other => Err(CheckpointError::InvalidArgument(format!(
            "unknown store '{}': expected 'repo' or 'user'",
            other
        ))),
    }
}

pub fn run() -> Result<(), CheckpointError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match &cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&checkpoint::schema())
                    .unwrap_or_else(|_| checkpoint::schema().to_string())
            );
            return Ok(());
        }
        _ => {}
    }

    let (kind, discovered) = resolve_base(&cli, &current_dir)?;
    let base = match (&cli.command, kind) {
        (Command::Init { dir: Some(dir) }, StoreKind::Repo) => dir.clone(),
        (Command::Init { dir: None }, StoreKind::Repo) if cli.root.is_none() => current_dir.clone(),
        _ => discovered,
    };

    let config = Config::load(&base.join(WAYMARK_DIR))?;
    logging::init(&config.log_filter());
    tracing::debug!(base = %base.display(), ?kind, "resolved checkpoint store base");

    match cli.command {
        Command::Init { .. } => checkpoint_cli::run_init(&Store::under(kind, &base)),
        Command::Checkpoint(command) => match discovery::probe_service(&base, kind) {
            Ok(handle) => {
                let service = CheckpointService::open(&handle.store, &config)?;
                checkpoint_cli::run_checkpoint_cli(&service, command)
            }
            Err(absent) if !cli.strict => {
                tracing::info!(
                    root = %absent.root.display(),
                    "checkpoint service absent, skipping"
                );
                checkpoint_cli::print_skipped(command.name(), command.format(), &absent);
                Ok(())
            }
            Err(absent) => Err(absent.into()),
        },
        Command::Schema | Command::Version => Ok(()),
    }
}
