//! Diagnostics command.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use sst_core::Database;
use sst_core::config::ConnectionTarget;
use sst_core::store::Filter;

use crate::config::Settings;

pub async fn execute(settings: &Settings) -> Result<()> {
    println!("{}", "sst Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    if settings.file_exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check configuration
    print!("  Configuration: ");
    match settings.store.validate() {
        Ok(()) => println!("{}", "✓ valid".green()),
        Err(e) => {
            println!("{}", format!("✗ {e}").red());
            issues.push("Configuration is invalid - set connection_string or SST_CONNECTION_STRING");
        }
    }

    if let Ok(ConnectionTarget::Memory) = settings.store.target() {
        println!(
            "  {} in-memory store: nothing is shared between processes",
            "⚠".yellow()
        );
    }

    // Check store
    print!("  Store: ");
    match Database::open(&settings.store) {
        Ok(db) => match db.ping() {
            Ok(()) => {
                println!("{}", "✓ reachable".green());
                report_counts(&db);
            }
            Err(e) => {
                println!("{}", format!("✗ {e}").red());
                issues.push("Session collection is not readable");
            }
        },
        Err(e) => {
            println!("{}", format!("✗ {e}").red());
            issues.push("Session store could not be opened");
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}

fn report_counts(db: &Database) {
    let now = Utc::now();
    let counts = (
        db.count(&Filter::all().expires_after(now)),
        db.count(&Filter::all().expires_after(now).locked(true)),
        db.count(&Filter::all().expired_as_of(now)),
    );

    match counts {
        (Ok(live), Ok(locked), Ok(expired)) => {
            println!("    Live sessions: {live}");
            println!("    Locked: {locked}");
            if expired > 0 {
                println!(
                    "    Expired: {} {}",
                    expired,
                    "(run `sst sweep` to reclaim)".dimmed()
                );
            } else {
                println!("    Expired: 0");
            }
        }
        _ => println!("    {}", "counts unavailable".yellow()),
    }
}
