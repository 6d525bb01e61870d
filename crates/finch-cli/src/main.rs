//! Finch CLI - explainable financial-wellness recommendations
//!
//! Usage:
//!   finch init                    Initialize database
//!   finch seed                    Seed the five demo profiles
//!   finch assign --user ID        Assign a persona
//!   finch recommend --user ID     Generate recommendations
//!   finch traces                  Show the operator review queue
//!   finch serve --port 3000       Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, cli.no_encrypt),
        Commands::Seed => commands::cmd_seed(&db_path, cli.no_encrypt),
        Commands::Assign {
            user,
            force_refresh,
            json,
        } => commands::cmd_assign(&db_path, cli.no_encrypt, &user, force_refresh, json),
        Commands::Recommend {
            user,
            force_refresh,
            json,
        } => commands::cmd_recommend(&db_path, cli.no_encrypt, &user, force_refresh, json).await,
        Commands::Traces { status, limit } => {
            commands::cmd_traces(&db_path, cli.no_encrypt, status.as_deref(), limit)
        }
        Commands::Review { id, status, note } => {
            commands::cmd_review(&db_path, cli.no_encrypt, id, &status, note.as_deref())
        }
        Commands::Report { json } => commands::cmd_report(&db_path, cli.no_encrypt, json).await,
        Commands::Serve { host, port } => {
            commands::cmd_serve(&db_path, cli.no_encrypt, &host, port).await
        }
    }
}
