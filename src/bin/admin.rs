//! CLI administration tool for shortlink.
//!
//! Provides commands for managing user accounts, inspecting links and
//! checking the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a user account
//! cargo run --bin admin -- user create
//!
//! # List user accounts
//! cargo run --bin admin -- user list
//!
//! # Show a short link
//! cargo run --bin admin -- link show aB3xY9
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
//! - `BASE_URL` (optional): used to print full short URLs

use shortlink::application::services::auth_service::validate_new_credentials;
use shortlink::domain::entities::NewUser;
use shortlink::domain::repositories::{LinkRepository, UserRepository};
use shortlink::infrastructure::persistence::{PgLinkRepository, PgUserRepository};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
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
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Inspect short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create a user account
    Create {
        /// Login name (prompted if omitted)
        #[arg(short, long)]
        user_id: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List user accounts
    List,
}

/// Link inspection subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Show a short link and its click count
    Show {
        /// Short code
        code: String,
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
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    match action {
        UserAction::Create { user_id, yes } => {
            let repo = PgUserRepository::new(Arc::new(pool.clone()));
            create_user(&repo, user_id, yes).await?;
        }
        UserAction::List => list_users(pool).await?,
    }

    Ok(())
}

/// Creates a user account with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for user ID (or use provided)
/// 2. Prompt for password twice
/// 3. Apply the same rules as `POST /api/signup`
/// 4. Confirm creation (unless `--yes` flag)
/// 5. Hash password with bcrypt and store
async fn create_user(repo: &PgUserRepository, user_id: Option<String>, skip_confirm: bool) -> Result<()> {
    println!("{}", "Create user".bright_blue().bold());
    println!();

    let user_id = match user_id {
        Some(id) => id,
        None => Input::new().with_prompt("User ID").interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    validate_new_credentials(&user_id, &password).map_err(|e| anyhow::anyhow!("{}", e))?;

    if repo
        .exists(&user_id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    {
        anyhow::bail!("User ID '{}' already exists", user_id);
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create user '{}'?", user_id))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await?
        .context("Failed to hash password")?;

    let user = repo
        .create(NewUser {
            user_id,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!("{}", "User created successfully!".green().bold());
    println!("  ID:      {}", user.id.to_string().bright_black());
    println!("  User ID: {}", user.user_id.cyan());
    println!();

    Ok(())
}

/// Lists user accounts, newest first.
async fn list_users(pool: &PgPool) -> Result<()> {
    println!("{}", "Users".bright_blue().bold());
    println!();

    let users: Vec<(i64, String, DateTime<Utc>)> =
        sqlx::query_as("SELECT id, user_id, created_at FROM users ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        println!();
        println!(
            "  Create one with: {} admin user create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<6} {:<30} {:<20}",
        "ID".bright_white().bold(),
        "User ID".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "-".repeat(58).bright_black());

    for (id, user_id, created_at) in &users {
        println!(
            "  {:<6} {:<30} {}",
            id.to_string().bright_black(),
            user_id.cyan(),
            created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Dispatches link inspection commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    match action {
        LinkAction::Show { code } => {
            let repo = PgLinkRepository::new(Arc::new(pool.clone()));

            let link = repo
                .find_by_code(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .with_context(|| format!("No short link with code '{}'", code))?;

            let base_url = std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

            let status = if link.is_expired() {
                "EXPIRED".red()
            } else {
                "ACTIVE".green()
            };

            println!("{}", "Short link".bright_blue().bold());
            println!();
            println!(
                "  Short URL: {}",
                format!("{}/{}", base_url.trim_end_matches('/'), link.code).bright_yellow()
            );
            println!("  Target:    {}", link.target.cyan());
            println!("  Created:   {}", link.created_at.format("%Y-%m-%d %H:%M"));
            match link.expires_at {
                Some(at) => println!("  Expires:   {}", at.format("%Y-%m-%d %H:%M")),
                None => println!("  Expires:   {}", "never".bright_black()),
            }
            println!("  Clicks:    {}", link.clicks.to_string().bright_green().bold());
            println!("  Status:    {}", status);
            println!();
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total and expired link counts
/// - Total number of clicks
/// - Number of user accounts
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
        .fetch_one(pool)
        .await?;

    let expired_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM short_links WHERE expires_at < NOW()")
            .fetch_one(pool)
            .await?;

    let clicks_count: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM short_links")
            .fetch_one(pool)
            .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    println!("  Links:   {}", links_count.to_string().bright_green().bold());
    println!("  Expired: {}", expired_count.to_string().yellow());
    println!("  Clicks:  {}", clicks_count.to_string().bright_green().bold());
    println!("  Users:   {}", users_count.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database information".bright_blue().bold());
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
