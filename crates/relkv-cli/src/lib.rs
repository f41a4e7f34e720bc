//! relkv command-line library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (summary, view, seed, report)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    init_logging, open_existing, run, show_summary, view_prefix, write_report,
};
pub use relkv_storage::{seed_demo_data, SeedCounts};
