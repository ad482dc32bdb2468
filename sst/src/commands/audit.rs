//! Recorded store failures.

use anyhow::{Context, Result};
use colored::Colorize;

use super::open_store;
use crate::config::Settings;

pub async fn execute(limit: usize, json: bool, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let events = db
        .recent_audit_events(limit)
        .context("Failed to read audit events")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    println!("{}", "Audit events".cyan().bold());
    println!("{}", "─".repeat(70));

    if !settings.store.write_exceptions_to_event_log {
        println!(
            "  {}",
            "write_exceptions_to_event_log is off; new failures go to the log only".yellow()
        );
    }

    if events.is_empty() {
        println!("  No events recorded");
        return Ok(());
    }

    for event in &events {
        println!(
            "  {} {} [{}] {}",
            event.occurred_at.format("%Y-%m-%d %H:%M:%S"),
            event.operation.yellow(),
            event.host,
            event.message
        );
    }

    Ok(())
}
