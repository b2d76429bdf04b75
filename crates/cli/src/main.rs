//! Afrah Organic Mart CLI - migrations, demo data and admin access.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! afrah-cli migrate
//!
//! # Insert the demo catalog
//! afrah-cli seed
//!
//! # Give an existing account back-office access
//! afrah-cli admin grant -e owner@afrahorganic.com
//!
//! # Take it away again
//! afrah-cli admin revoke -e owner@afrahorganic.com
//!
//! # Show every admin
//! afrah-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "afrah-cli")]
#[command(author, version, about = "Afrah Organic Mart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert demo products for every category (skips existing slugs)
    Seed,
    /// Manage back-office access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant admin access to an existing account
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke admin access
    Revoke {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// List every admin
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pool = commands::connect().await?;
    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed => {
            commands::seed::run(&pool).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::grant(&pool, &email).await?,
            AdminAction::Revoke { email } => commands::admin::revoke(&pool, &email).await?,
            AdminAction::List => commands::admin::list(&pool).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_grant() {
        let cli = Cli::try_parse_from(["afrah-cli", "admin", "grant", "-e", "owner@afrahorganic.com"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Grant { email }
            }) if email == "owner@afrahorganic.com"
        ));
    }

    #[test]
    fn test_grant_requires_email() {
        assert!(Cli::try_parse_from(["afrah-cli", "admin", "grant"]).is_err());
    }
}
