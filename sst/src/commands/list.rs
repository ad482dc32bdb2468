//! List stored sessions.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use super::{human_duration, manager, open_store, status_label};
use crate::config::Settings;

pub async fn execute(scope: Option<&str>, limit: usize, json: bool, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let docs = manager(db, settings).list(scope, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&docs)?);
        return Ok(());
    }

    println!("{}", "Sessions".cyan().bold());
    println!("{}", "─".repeat(70));

    if docs.is_empty() {
        println!("  No sessions found");
        return Ok(());
    }

    let now = Utc::now();
    for doc in &docs {
        println!(
            "  {} [{}] {} token={} expires in {}",
            doc.id,
            status_label(doc, now),
            doc.application_scope,
            doc.lock_token,
            human_duration(doc.expires_at - now)
        );
    }

    if docs.len() == limit {
        println!();
        println!("  {}", format!("(showing first {limit}; use --limit for more)").dimmed());
    }

    Ok(())
}
