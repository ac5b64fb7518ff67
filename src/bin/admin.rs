//! CLI administration tool for linkpulse.
//!
//! Creates links, shows click counts and manages the database schema without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link (prompts for the URL when --url is omitted)
//! cargo run --bin admin -- create --url https://example.com/page
//!
//! # Show clicks for a short code
//! cargo run --bin admin -- stats --code aZ3kP9
//!
//! # Apply schema migrations
//! cargo run --bin admin -- migrate
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Reads the same configuration as the server. `DATABASE_URL` (or the `DB_*`
//! parts) is required; `BASE_URL` is used to print full short URLs.

use linkpulse::application::services::LinkService;
use linkpulse::config::{Config, StorageBackend};
use linkpulse::error::AppError;
use linkpulse::infrastructure::persistence::{self, PgLinkRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkpulse.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Create {
        /// Long URL to shorten
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Show the click count of a short link
    Stats {
        /// Short code
        #[arg(short, long)]
        code: String,
    },

    /// Apply database migrations
    Migrate,

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
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    if config.storage != StorageBackend::Postgres {
        anyhow::bail!("admin commands need STORAGE=postgres");
    }
    config.validate()?;

    let pool = persistence::connect(&config).await?;

    match cli.command {
        Commands::Create { url } => create_link(&config, &pool, url).await?,
        Commands::Stats { code } => show_stats(&config, &pool, &code).await?,
        Commands::Migrate => migrate(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn link_service(config: &Config, pool: &PgPool) -> LinkService<PgLinkRepository> {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    LinkService::new(repo, config.code_policy())
}

/// Creates a short link, prompting for the URL if needed.
async fn create_link(config: &Config, pool: &PgPool, url: Option<String>) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let long_url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Long URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let service = link_service(config, pool);

    let link = service
        .create_link(&long_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created".green().bold());
    println!();
    println!("  Code:      {}", link.code.bright_yellow().bold());
    println!("  Long URL:  {}", link.long_url.cyan());
    println!(
        "  Short URL: {}",
        service.short_url(&config.base_url, &link.code).bright_white()
    );
    println!();

    Ok(())
}

/// Prints the long URL and click count of a short code.
async fn show_stats(config: &Config, pool: &PgPool, code: &str) -> Result<()> {
    println!("{}", "📊 Link Statistics".bright_blue().bold());
    println!();

    let (link, clicks) = match link_service(config, pool).get_link_stats(code).await {
        Ok(stats) => stats,
        Err(AppError::NotFound { .. }) => {
            anyhow::bail!("Short code '{}' not found", code);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to load statistics: {}", e)),
    };

    println!("  Code:     {}", link.code.cyan());
    println!("  Long URL: {}", link.long_url.bright_white());
    println!(
        "  Created:  {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!("  Clicks:   {}", clicks.to_string().bright_green().bold());
    println!();

    Ok(())
}

async fn migrate(pool: &PgPool) -> Result<()> {
    println!("{}", "🛠  Applying migrations...".bright_blue());

    persistence::run_migrations(pool).await?;

    println!("{}", "✅ Schema up to date".green().bold());

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1")
                .fetch_one(pool)
                .await
                .context("Database did not answer")?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}
