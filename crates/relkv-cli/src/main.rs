//! relkv
//!
//! Inspect and query a relkv database.
//!
//! # Usage
//!
//! ```bash
//! relkv summary [--db-path PATH]
//! relkv view <PREFIX>
//! relkv seed
//! relkv report [--user-id ID] [--top N] [--json]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/relkv/config.toml)
//! 3. Environment variables (RELKV_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use relkv_cli::{run, Cli};

fn main() -> Result<()> {
    run(Cli::parse())
}
