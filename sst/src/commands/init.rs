//! Collection setup.

use anyhow::Result;
use colored::Colorize;
use sst_core::config::ConnectionTarget;

use super::open_store;
use crate::config::Settings;

pub async fn execute(settings: &Settings) -> Result<()> {
    println!("{}", "Initializing session store...".cyan());

    let db = open_store(settings)?;
    let store = &settings.store;

    match db.target() {
        ConnectionTarget::Memory => println!("  Target: {}", "in-memory (not persisted)".yellow()),
        ConnectionTarget::File(path) => println!("  Target: {}", path.display()),
    }
    println!("  Database: {}", store.database);
    println!("  Collection: {}", store.collection);
    println!("  Write concern: {}", db.write_concern());
    println!("  Timeout: {} min", store.timeout_minutes);
    println!("  {} collection ready", "✓".green());

    if settings.file_exists() {
        println!("  Config: {} (unchanged)", settings.path.display());
    } else {
        settings.save()?;
        println!("  {} Config written to {}", "✓".green(), settings.path.display());
    }

    Ok(())
}
