//! Command implementations for relkv.
//!
//! Handles:
//! - summary: key counts per prefix
//! - view: raw dump of one prefix
//! - seed: demo dataset
//! - report: every relational view

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use relkv_query::{QueryEngine, QueryError, SalesByCategory};
use relkv_storage::{dump_prefix, seed_demo_data, summarize_prefixes, RecordStore, Storage};
use relkv_types::{OrderWithDetails, RecordId, Settings};

use crate::cli::{Cli, Commands};

/// Load configuration, apply CLI overrides, set up logging, and dispatch.
pub fn run(cli: Cli) -> Result<()> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(db_path) = cli.db_path {
        settings.db_path = db_path;
    }
    if let Some(log_level) = cli.log_level {
        settings.log_level = log_level;
    }

    init_logging(&settings.log_level);

    let db_path = settings.expanded_db_path();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Summary => {
            let storage = open_existing(&db_path)?;
            show_summary(&storage, settings.summary_sample_size, &mut out)
        }
        Commands::View { prefix } => {
            let storage = open_existing(&db_path)?;
            view_prefix(&storage, &prefix, &mut out)
        }
        Commands::Seed => {
            let store = RecordStore::open(&db_path)
                .with_context(|| format!("Failed to open database at {:?}", db_path))?;
            let counts = seed_demo_data(&store).context("Failed to seed demo data")?;
            writeln!(
                out,
                "Seeded {} categories, {} companies, {} users, {} products, {} orders",
                counts.categories, counts.companies, counts.users, counts.products, counts.orders
            )?;
            Ok(())
        }
        Commands::Report { user_id, top, json } => {
            let store = RecordStore::open(&db_path)
                .with_context(|| format!("Failed to open database at {:?}", db_path))?;
            let engine = QueryEngine::new(Arc::new(store));
            write_report(&engine, user_id, top, json, &mut out)
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Open an existing database read-only. Nothing is created or written.
pub fn open_existing(path: &Path) -> Result<Storage> {
    if !path.exists() {
        bail!("No database found at {:?}", path);
    }
    Storage::open_read_only(path)
        .with_context(|| format!("Failed to open database at {:?}", path))
}

/// Print key counts per prefix, preceded by sample keys.
pub fn show_summary(storage: &Storage, sample_size: usize, out: &mut impl Write) -> Result<()> {
    let summary = summarize_prefixes(storage, sample_size).context("Error scanning database")?;

    for samples in summary.samples.values() {
        for key in samples {
            writeln!(out, "Key: {}", key)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Key prefixes summary:")?;
    for (prefix, count) in &summary.counts {
        writeln!(out, "{}: {} keys", prefix, count)?;
    }

    if !summary.highest_ids.is_empty() {
        writeln!(out)?;
        writeln!(out, "Highest record ids:")?;
        for (kind, id) in &summary.highest_ids {
            writeln!(out, "{}: {}", kind, id)?;
        }
    }
    info!(total = summary.total_keys(), "Summary complete");
    Ok(())
}

/// Print every key/value pair under `prefix`.
pub fn view_prefix(storage: &Storage, prefix: &str, out: &mut impl Write) -> Result<()> {
    if prefix.is_empty() {
        bail!("Please specify a non-empty prefix");
    }

    writeln!(out, "Contents of prefix '{}':", prefix)?;
    let entries = dump_prefix(storage, prefix).context("Error reading from database")?;

    for entry in &entries {
        writeln!(out, "Key: {}", entry.key)?;
        writeln!(out, "Value: {}", entry.value)?;
        writeln!(out)?;
    }

    if entries.is_empty() {
        writeln!(out, "No keys found with the specified prefix")?;
    } else {
        writeln!(out, "Found {} keys with prefix '{}'", entries.len(), prefix)?;
    }
    Ok(())
}

/// Run every view and print it as text or a single JSON document.
pub fn write_report(
    engine: &QueryEngine,
    user_id: RecordId,
    top: Option<usize>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let users = engine.users_with_companies()?;
    let orders = engine.orders_with_details()?;
    let stats = engine.company_stats()?;
    let user_orders = match engine.user_orders_with_products(user_id) {
        Ok(rows) => Some(rows),
        Err(QueryError::NotFound(what)) => {
            warn!(user_id, "Report user not found: {}", what);
            None
        }
        Err(e) => return Err(e.into()),
    };
    let top_products = match top {
        Some(limit) => engine.top_products_by_category(limit)?,
        None => engine.top_selling_products_by_category()?,
    };

    if json {
        let doc = serde_json::json!({
            "users_with_companies": users,
            "orders_with_details": orders,
            "company_stats": stats,
            "user_orders": user_orders,
            "top_products_by_category": top_products,
        });
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "=== Users with Companies ===")?;
    for row in &users {
        writeln!(
            out,
            "User: {} works at {} ({})",
            row.user.name, row.company.name, row.company.industry
        )?;
    }

    writeln!(out, "\n=== Orders with Details ===")?;
    for row in &orders {
        write_order_line(out, row)?;
    }

    writeln!(out, "\n=== Company Statistics ===")?;
    for row in &stats {
        writeln!(
            out,
            "Company: {} | Users: {} | Orders: {} | Revenue: ${:.2}",
            row.company.name, row.user_count, row.order_count, row.total_revenue
        )?;
    }

    writeln!(out, "\n=== Orders for User {} ===", user_id)?;
    match &user_orders {
        Some(rows) => {
            for row in rows {
                writeln!(
                    out,
                    "{} ordered: {} - ${:.2} [{}]",
                    row.user.name, row.product.name, row.order.amount, row.order.status
                )?;
            }
        }
        None => writeln!(out, "User {} not found", user_id)?,
    }

    writeln!(out, "\n=== Top Selling Products by Category ===")?;
    write_rankings(out, &top_products)?;
    Ok(())
}

fn write_order_line(out: &mut impl Write, row: &OrderWithDetails) -> Result<()> {
    writeln!(
        out,
        "Order #{}: {} bought {} ({}) - ${:.2} [{}]",
        row.order.id,
        row.user.name,
        row.product.name,
        row.category.name,
        row.order.amount,
        row.order.status
    )?;
    Ok(())
}

fn write_rankings(out: &mut impl Write, grouped: &SalesByCategory) -> Result<()> {
    for (category, ranked) in grouped {
        writeln!(out, "Category: {}", category)?;
        for sales in ranked {
            writeln!(
                out,
                "  - {}: {} orders, ${:.2} revenue",
                sales.product.name, sales.total_orders, sales.total_revenue
            )?;
        }
    }
    Ok(())
}
