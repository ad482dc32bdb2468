//! Show one stored session.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use sst_core::types::decode_payload;

use super::{human_duration, manager, open_store, status_label};
use crate::cli::SessionKey;
use crate::config::Settings;

pub async fn execute(key: &SessionKey, json: bool, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let doc = manager(db, settings).inspect(&key.id, &key.scope)?;

    let Some(doc) = doc else {
        if json {
            println!("null");
        } else {
            println!("{}", format!("Session '{}' not found in {}", key.id, key.scope).red());
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let now = Utc::now();
    let payload_len = decode_payload(&doc.payload).map(|p| p.len());

    println!("{}", format!("Session {}", doc.id).cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Scope: {}", doc.application_scope);
    println!("  Status: {}", status_label(&doc, now));
    println!("  Lock token: {}", doc.lock_token);
    if doc.is_locked {
        println!("  Locked for: {}", human_duration(doc.lock_age_at(now)));
    }
    println!("  Created: {}", doc.created_at.to_rfc3339());
    println!(
        "  Expires: {} ({})",
        doc.expires_at.to_rfc3339(),
        human_duration(doc.expires_at - now)
    );
    println!("  Timeout: {} min", doc.timeout_minutes);
    println!("  Flags: {}", doc.action_flags);
    match payload_len {
        Ok(len) => println!("  Payload: {len} bytes"),
        Err(e) => println!("  Payload: {}", format!("undecodable ({e})").red()),
    }

    Ok(())
}
