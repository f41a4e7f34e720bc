//! CLI argument parsing for relkv.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// relkv
///
/// Relational views over an embedded key-value store.
#[derive(Parser, Debug)]
#[command(name = "relkv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/relkv/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Count keys per prefix and show a few sample keys
    Summary,

    /// Dump every key/value pair under a prefix
    View {
        /// Key prefix to dump (e.g. "users:" or "counter")
        prefix: String,
    },

    /// Load the demo dataset
    Seed,

    /// Run every relational view and print the results
    Report {
        /// User whose orders are listed
        #[arg(short, long, default_value = "1")]
        user_id: u64,

        /// Keep at most this many products per category
        #[arg(short, long)]
        top: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
