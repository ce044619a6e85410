//! CLI surface for the checkpoint plugin.

use super::{AgentSummary, CheckpointRecord, CheckpointService, SqliteCheckpointStore};
use crate::core::config::Config;
use crate::core::error::{CheckpointError, ServiceAbsent};
use crate::core::output::{envelope, preview};
use crate::core::store::Store;
use crate::core::time::format_epoch_ms;
use colored::Colorize;

#[derive(clap::Subcommand, Debug)]
pub enum CheckpointCommand {
    /// Append a checkpoint for an agent
    Save {
        /// Agent identity (e.g. a role name such as "implementer")
        agent: String,
        /// What the agent has completed
        message: String,
        /// Output format: 'text' or 'json'
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Show the most recent checkpoint for an agent
    Latest {
        agent: String,
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// List an agent's checkpoints, oldest first
    History {
        agent: String,
        /// Only show the last N records (N >= 1)
        #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Summarize every agent that has checkpointed
    Agents {
        #[clap(long, default_value = "text")]
        format: String,
    },
}

impl CheckpointCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CheckpointCommand::Save { .. } => "save",
            CheckpointCommand::Latest { .. } => "latest",
            CheckpointCommand::History { .. } => "history",
            CheckpointCommand::Agents { .. } => "agents",
        }
    }

    pub fn format(&self) -> &str {
        match self {
            CheckpointCommand::Save { format, .. }
            | CheckpointCommand::Latest { format, .. }
            | CheckpointCommand::History { format, .. }
            | CheckpointCommand::Agents { format } => format,
        }
    }
}

fn is_json(format: &str) -> bool {
    format == "json"
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

fn print_record_line(record: &CheckpointRecord) {
    println!(
        "  #{:<4} {}  {}",
        record.sequence,
        format_epoch_ms(record.timestamp).dimmed(),
        preview(&record.message, 100)
    );
}

/// Create the `.waymark` directory, default config and database. Idempotent.
pub fn run_init(store: &Store) -> Result<(), CheckpointError> {
    let created_config = Config::write_default_if_missing(store.waymark_dir())?;
    let config = Config::load(store.waymark_dir())?;
    let backing = SqliteCheckpointStore::open(store, &config.storage)?;

    println!(
        "{} Checkpoint store ready at {}",
        "✓".green(),
        backing.db_path().display()
    );
    if created_config {
        println!(
            "  Wrote default config to {}",
            store.waymark_dir().join(crate::core::store::CONFIG_FILE).display()
        );
    }
    Ok(())
}

pub fn run_checkpoint_cli(
    service: &CheckpointService,
    command: CheckpointCommand,
) -> Result<(), CheckpointError> {
    match command {
        CheckpointCommand::Save {
            agent,
            message,
            format,
        } => {
            let record = service.save(&agent, &message)?;
            if is_json(&format) {
                print_json(&envelope(
                    "save",
                    "ok",
                    serde_json::json!({ "checkpoint": record }),
                ));
            } else {
                println!(
                    "{} Checkpoint saved: {} #{}",
                    "✓".green(),
                    record.agent_id,
                    record.sequence
                );
            }
        }
        CheckpointCommand::Latest { agent, format } => {
            let latest = service.latest(&agent)?;
            if is_json(&format) {
                print_json(&envelope(
                    "latest",
                    "ok",
                    serde_json::json!({ "agent_id": agent.trim(), "checkpoint": latest }),
                ));
            } else {
                match latest {
                    Some(record) => {
                        println!("{}", record.agent_id.bold());
                        print_record_line(&record);
                    }
                    None => println!("No checkpoint recorded for {}", agent.trim()),
                }
            }
        }
        CheckpointCommand::History {
            agent,
            limit,
            format,
        } => {
            let mut history = service.reader().history(&agent)?;
            if let Some(n) = limit {
                let keep = usize::try_from(n).unwrap_or(usize::MAX);
                let skip = history.len().saturating_sub(keep);
                history.drain(..skip);
            }
            if is_json(&format) {
                print_json(&envelope(
                    "history",
                    "ok",
                    serde_json::json!({ "agent_id": agent.trim(), "checkpoints": history }),
                ));
            } else if history.is_empty() {
                println!("No checkpoint recorded for {}", agent.trim());
            } else {
                println!("{}", agent.trim().bold());
                for record in &history {
                    print_record_line(record);
                }
            }
        }
        CheckpointCommand::Agents { format } => {
            let agents: Vec<AgentSummary> = service.reader().agents()?;
            if is_json(&format) {
                print_json(&envelope(
                    "agents",
                    "ok",
                    serde_json::json!({ "agents": agents }),
                ));
            } else if agents.is_empty() {
                println!("No checkpoints recorded yet.");
            } else {
                for summary in &agents {
                    println!(
                        "{} ({} checkpoint{})",
                        summary.agent_id.bold(),
                        summary.count,
                        if summary.count == 1 { "" } else { "s" }
                    );
                    print_record_line(&summary.latest);
                }
            }
        }
    }
    Ok(())
}

/// Report a missing service without failing the command.
pub fn print_skipped(cmd: &str, format: &str, absent: &ServiceAbsent) {
    if is_json(format) {
        print_json(&envelope(
            cmd,
            "skipped",
            serde_json::json!({ "reason": absent.to_string() }),
        ));
    } else {
        println!("{} Checkpoint skipped ({})", "ℹ".blue(), absent);
    }
}
