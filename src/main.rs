//! # Taskpilot CLI (`tp`)
//!
//! The `tp` binary runs the assistant engine against the corpora named in
//! the config file.
//!
//! ## Usage
//!
//! ```bash
//! tp --config ./config/taskpilot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tp classify "<query>"` | Print the intent category of a query |
//! | `tp knowledge "<query>"` | Top help documents for a query |
//! | `tp tasks "<query>" --owner <o>` | Top work items of an owner for a query |
//! | `tp rank --owner <o>` | Open work items, most urgent first |
//! | `tp schedule --owner <o>` | Urgent items placed into daily work slots |
//! | `tp ask "<query>" --owner <o>` | Full answer for a question |
//! | `tp stats` | Corpus statistics |
//!
//! Every command accepts `--json` for machine-readable output. Logs go to
//! stderr; set `TASKPILOT_LOG` (e.g. `TASKPILOT_LOG=debug`) or pass
//! `--verbose` to see them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use taskpilot::{commands, config, stats};

/// Taskpilot CLI, a retrieval-and-ranking assistant for task workspaces.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/taskpilot.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Taskpilot: answers questions about help docs and your tasks",
    version,
    long_about = "Taskpilot classifies free-text questions, retrieves matching help documents \
    or work items, ranks open work by urgency, and builds a short slot-based work plan."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/taskpilot.toml")]
    config: PathBuf,

    /// Print the structured result as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Classify a query into an intent category.
    ///
    /// Needs no config or corpora.
    Classify {
        /// The query text.
        query: String,
    },

    /// Retrieve help documents for a query.
    Knowledge {
        /// The query text.
        query: String,

        /// Maximum number of documents (defaults to `retrieval.knowledge_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Show the per-document score breakdown.
        #[arg(long)]
        explain: bool,

        /// List every document with its score, including non-positive ones.
        #[arg(long)]
        all: bool,
    },

    /// Retrieve an owner's work items for a query.
    Tasks {
        /// The query text.
        query: String,

        /// Owner whose work items are searched.
        #[arg(long)]
        owner: String,

        /// Maximum number of items (defaults to `retrieval.entity_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rank an owner's open work items by urgency.
    Rank {
        #[arg(long)]
        owner: String,

        /// Maximum number of items (defaults to `ranking.limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Place an owner's most urgent items into daily work slots.
    Schedule {
        #[arg(long)]
        owner: String,

        /// Number of days to plan (defaults to `schedule.days`).
        #[arg(long)]
        days: Option<u32>,
    },

    /// Answer a free-text question on behalf of an owner.
    Ask {
        /// The question.
        query: String,

        #[arg(long)]
        owner: String,
    },

    /// Show corpus statistics.
    Stats {
        /// Also break down one owner's work items.
        #[arg(long)]
        owner: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TASKPILOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Commands that don't require config
    if let Commands::Classify { query } = &cli.command {
        commands::run_classify(query, cli.json)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Classify { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Knowledge {
            query,
            limit,
            explain,
            all,
        } => {
            commands::run_knowledge(&cfg, &query, limit, explain, all, cli.json).await?;
        }
        Commands::Tasks {
            query,
            owner,
            limit,
        } => {
            commands::run_tasks(&cfg, &query, &owner, limit, cli.json).await?;
        }
        Commands::Rank { owner, limit } => {
            commands::run_rank(&cfg, &owner, limit, cli.json).await?;
        }
        Commands::Schedule { owner, days } => {
            commands::run_schedule(&cfg, &owner, days, cli.json).await?;
        }
        Commands::Ask { query, owner } => {
            commands::run_ask(&cfg, &query, &owner, cli.json).await?;
        }
        Commands::Stats { owner } => {
            stats::run_stats(&cfg, owner.as_deref(), cli.json).await?;
        }
    }

    Ok(())
}
