//! CLI administration tool for linkshort.
//!
//! Manages the database schema without starting the HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! cargo run --bin admin -- migrate up
//!
//! # Show applied and pending migrations
//! cargo run --bin admin -- migrate status
//!
//! # Roll back the latest applied migration
//! cargo run --bin admin -- migrate down 3
//! cargo run --bin admin -- migrate down 3 --yes
//! ```
//!
//! # Environment Variables
//!
//! Same as the server, see [`linkshort::config`]. `STORAGE_BACKEND` must be
//! `postgres` and `DATABASE_URL` must be set.

use linkshort::application::services::MigrationRunner;
use linkshort::config::{self, Config, StorageBackend};
use linkshort::domain::entities::{MigrationState, RollbackOutcome};
use linkshort::infrastructure::migrations::MIGRATIONS;
use linkshort::infrastructure::persistence::PgMigrationRepository;
use linkshort::{server, telemetry};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing linkshort.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage the database schema
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

/// Schema migration subcommands.
#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,

    /// Show applied and pending migrations
    Status,

    /// Roll back the latest applied migration
    Down {
        /// Version to roll back; must be the latest applied one
        version: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    telemetry::init(&config);

    match cli.command {
        Commands::Migrate { action } => handle_migrate_action(action, &config).await,
    }
}

/// Dispatches schema migration commands.
async fn handle_migrate_action(action: MigrateAction, config: &Config) -> Result<()> {
    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("Migrations apply to the postgres backend only (STORAGE_BACKEND=postgres)");
    }

    let pool = Arc::new(server::connect(config).await?);

    match action {
        MigrateAction::Up => migrate_up(pool).await,
        MigrateAction::Status => migrate_status(pool).await,
        MigrateAction::Down { version, yes } => migrate_down(pool, version, yes).await,
    }
}

async fn migrate_up(pool: Arc<sqlx::PgPool>) -> Result<()> {
    println!("{}", "Applying migrations".bright_blue().bold());
    println!();

    let report = server::run_migrations(pool).await?;

    if report.is_noop() {
        println!("{}", "  Schema is up to date".green());
    } else {
        for version in &report.applied {
            println!("  {} {:04}", "applied".green(), version);
        }
        println!();
        println!(
            "  Applied: {}",
            report.applied.len().to_string().bright_white().bold()
        );
    }
    println!();

    Ok(())
}

/// Prints every registry entry with its state.
///
/// # Output Format
///
/// ```text
/// Schema migrations
///
///   Migration                        State      Applied at
///   ────────────────────────────────────────────────────────────
///   0001_create_links                applied    2024-01-15 10:30
///   0002_links_created_at_index      pending
/// ```
async fn migrate_status(pool: Arc<sqlx::PgPool>) -> Result<()> {
    let runner = MigrationRunner::new(Arc::new(PgMigrationRepository::new(pool)), MIGRATIONS)?;
    let statuses = runner
        .status()
        .await
        .context("Failed to read migration history")?;

    println!("{}", "Schema migrations".bright_blue().bold());
    println!();
    println!(
        "  {:<32} {:<10} {}",
        "Migration".bright_white().bold(),
        "State".bright_white().bold(),
        "Applied at".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for status in &statuses {
        let state = match status.state {
            MigrationState::Applied => status.state.to_string().green(),
            _ => status.state.to_string().yellow(),
        };
        let applied_at = status
            .applied_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        println!(
            "  {:<32} {:<10} {}",
            status.migration.to_string().cyan(),
            state,
            applied_at.bright_black()
        );
    }

    let pending = statuses
        .iter()
        .filter(|s| s.state != MigrationState::Applied)
        .count();
    println!();
    println!(
        "  Pending: {}",
        pending.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Rolls back the latest applied migration after confirmation.
async fn migrate_down(pool: Arc<sqlx::PgPool>, version: i64, skip_confirm: bool) -> Result<()> {
    let runner = MigrationRunner::new(Arc::new(PgMigrationRepository::new(pool)), MIGRATIONS)?;

    let name = MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{:04}", version));

    println!("{}", "Roll back migration".bright_blue().bold());
    println!();
    println!("  Migration: {}", name.cyan());
    println!();
    println!(
        "{}",
        "WARNING: the down step may drop tables or indexes and their data."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Roll back this migration?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    match runner.rollback(version).await? {
        RollbackOutcome::RolledBack { version } => {
            println!("{}", format!("Rolled back {:04}", version).green().bold());
        }
        RollbackOutcome::NotApplied { version } => {
            println!(
                "{}",
                format!("Migration {:04} is not applied, nothing to do", version).yellow()
            );
        }
    }
    println!();

    Ok(())
}
