//! # Topic Curator CLI (`curate`)
//!
//! ## Usage
//!
//! ```bash
//! curate --config ./config/curate.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `curate init` | Create the SQLite database and run schema migrations |
//! | `curate topics` | List topics with their queries and trusted sources |
//! | `curate populate <topic\|all>` | Search, filter, deduplicate, score, and store |
//! | `curate fetch <topic>...` | Print ranked content |
//! | `curate stats` | Per-topic totals |
//! | `curate deactivate <url>` | Hide an item from retrieval |
//! | `curate reactivate <url>` | Show a hidden item again |
//! | `curate clear --yes` | Delete every stored item |
//! | `curate serve` | Start the HTTP read API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use topic_curator::{admin, config, ingest, logging, migrate, retrieval, server, stats, topics};

/// Topic Curator: curated child-development reading lists, ranked by trust
/// and recency.
#[derive(Parser)]
#[command(
    name = "curate",
    about = "Topic Curator: curated child-development content, ranked by trust and recency",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/curate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// List topics with their configured queries and trusted sources.
    Topics,

    /// Run the ingestion job for one topic or `all`.
    ///
    /// Exits non-zero when any topic failed to store.
    Populate {
        /// Topic identifier (e.g. `sleep_patterns`) or `all`.
        topic: String,

        /// Search query; replaces the configured queries. Repeatable.
        #[arg(long = "query")]
        queries: Vec<String>,

        /// Trusted domain; replaces the configured list. Repeatable.
        #[arg(long)]
        trusted: Vec<String>,

        /// Search and report counts without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print ranked content for one or more topics.
    Fetch {
        /// Topic identifiers.
        #[arg(required = true)]
        topics: Vec<String>,

        /// Inclusive quality floor (defaults to `[retrieval].min_quality`).
        #[arg(long)]
        min_quality: Option<f64>,

        /// Maximum items per topic (defaults to `[retrieval].final_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show per-topic totals, active counts, and average quality.
    Stats,

    /// Hide an item from retrieval without deleting it.
    Deactivate {
        url: String,
    },

    /// Make a deactivated item visible again.
    Reactivate {
        url: String,
    },

    /// Delete every stored item.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Start the HTTP read API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Topics => {
            topics::list_topics(&cfg)?;
        }
        Commands::Populate {
            topic,
            queries,
            trusted,
            dry_run,
        } => {
            ingest::run_populate(&cfg, &topic, &queries, &trusted, dry_run).await?;
        }
        Commands::Fetch {
            topics,
            min_quality,
            limit,
            json,
        } => {
            retrieval::run_fetch(&cfg, &topics, min_quality, limit, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Deactivate { url } => {
            admin::run_set_active(&cfg, &url, false).await?;
        }
        Commands::Reactivate { url } => {
            admin::run_set_active(&cfg, &url, true).await?;
        }
        Commands::Clear { yes } => {
            admin::run_clear(&cfg, yes).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
