//! Administrative command handlers.
//!
//! CLI commands for running migrations and inspecting or removing a single
//! short URL without going through the HTTP API.

use crate::config::{Config, StorageBackend};
use crate::error::{AppError, AppResult};
use crate::server::{build_service, connect_repository};
use clap::Subcommand;
use tracing::info;

/// Administrative commands available via CLI.
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Run database migrations
    Migrate,

    /// Show a short URL record without counting an access
    Show {
        /// Short code to look up
        short_code: String,
    },

    /// Permanently delete a short URL
    Delete {
        /// Short code to delete
        short_code: String,
    },
}

/// Run an administrative command with the given configuration.
pub async fn run(config: Config, admin_command: AdminCommands) -> AppResult<()> {
    match admin_command {
        AdminCommands::Migrate => migrate(config).await,
        AdminCommands::Show { short_code } => show(config, &short_code).await,
        AdminCommands::Delete { short_code } => delete(config, &short_code).await,
    }
}

/// Run database migrations.
async fn migrate(config: Config) -> AppResult<()> {
    if config.storage != StorageBackend::Postgres {
        return Err(AppError::Configuration(
            "Migrations only apply to the postgres storage backend".to_string(),
        ));
    }

    connect_repository(&config, true).await?;
    Ok(())
}

/// Print a short URL record.
async fn show(config: Config, short_code: &str) -> AppResult<()> {
    let repository = connect_repository(&config, false).await?;
    let mapping = build_service(&config, repository).stats(short_code).await?;

    println!("\n=== {} ===", mapping.short_code);
    println!("Original URL:    {}", mapping.original_url);
    println!("Access count:    {}", mapping.access_count);
    println!("Created at:      {}", mapping.created_at.to_rfc3339());
    println!("Updated at:      {}", mapping.updated_at.to_rfc3339());
    println!();

    Ok(())
}

/// Delete a short URL.
async fn delete(config: Config, short_code: &str) -> AppResult<()> {
    let repository = connect_repository(&config, false).await?;
    build_service(&config, repository).delete(short_code).await?;

    info!("Deleted short URL {}", short_code);
    Ok(())
}
