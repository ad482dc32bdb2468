//! sst - Session state store operator CLI
//!
//! Maintenance and inspection for the shared session store: creates the
//! collection, sweeps expired sessions, and shows or clears stuck locks.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::from_default_env()
        .add_directive("sst=info".parse()?)
        .add_directive("sst_core=info".parse()?);
    if cli.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Load configuration
    let settings = Settings::load(cli.config, cli.connection)?;
    tracing::debug!(path = %settings.path.display(), "configuration loaded");
    let json = cli.json;

    // Execute command
    match cli.command {
        Commands::Init => commands::init::execute(&settings).await,
        Commands::Sweep { every } => commands::sweep::execute(every, &settings).await,
        Commands::Show(key) => commands::show::execute(&key, json, &settings).await,
        Commands::List { scope, limit } => {
            commands::list::execute(scope.as_deref(), limit, json, &settings).await
        }
        Commands::Release { key, token } => commands::release::execute(&key, token, &settings).await,
        Commands::Remove(key) => commands::remove::execute(&key, &settings).await,
        Commands::Touch(key) => commands::touch::execute(&key, &settings).await,
        Commands::Audit { limit } => commands::audit::execute(limit, json, &settings).await,
        Commands::Doctor => commands::doctor::execute(&settings).await,
    }
}
