//! CLI administration tool for expiring-shortener.
//!
//! Provides commands for purging expired links, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Purge expired links now instead of waiting for the worker
//! cargo run --bin admin -- cleanup
//!
//! # Same, without the confirmation prompt
//! cargo run --bin admin -- cleanup --yes
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//!
//! Cached entries of purged links are not touched; they expire on their own TTL.

use expiring_shortener::domain::repositories::UrlRepository;
use expiring_shortener::infrastructure::persistence::PgUrlRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing expiring-shortener.
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
    /// Delete expired links from the database
    Cleanup {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Cleanup { yes } => handle_cleanup(&pool, yes).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Deletes every link whose expiration time has passed.
///
/// Shows how many links are due first and asks for confirmation
/// (default: No) unless `--yes` is given.
async fn handle_cleanup(pool: &PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Cleanup expired links".bright_blue().bold());
    println!();

    let due: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE expired_at <= NOW()")
        .fetch_one(pool)
        .await?;

    if due == 0 {
        println!("{}", "  Nothing to delete".yellow());
        return Ok(());
    }

    println!("  Expired links: {}", due.to_string().cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete them now?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let repo = PgUrlRepository::new(Arc::new(pool.clone()));
    let deleted = repo
        .delete_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete expired links: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✅ Deleted".green().bold(),
        deleted.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Displays link statistics.
///
/// Shows:
/// - Total number of stored links
/// - Links past their expiration that the worker has not purged yet
/// - Links created with a caller-chosen code
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let expired: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE expired_at <= NOW()")
        .fetch_one(pool)
        .await?;

    let custom: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE is_custom")
        .fetch_one(pool)
        .await?;

    println!("  Links:        {}", total.to_string().bright_green().bold());
    println!("  Active:       {}", (total - expired).to_string().bright_green().bold());
    println!("  Expired:      {}", expired.to_string().yellow().bold());
    println!("  Custom codes: {}", custom.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let repo = PgUrlRepository::new(Arc::new(pool.clone()));
            if !repo.health_check().await {
                anyhow::bail!("Database check failed");
            }

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
