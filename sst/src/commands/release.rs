//! Forced lock release.

use anyhow::Result;
use colored::Colorize;
use sst_core::SessionStateStore;

use super::{manager, open_store};
use crate::cli::SessionKey;
use crate::config::Settings;

pub async fn execute(key: &SessionKey, token: Option<i64>, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let manager = manager(db, settings);

    let Some(doc) = manager.inspect(&key.id, &key.scope)? else {
        println!("{}", format!("Session '{}' not found in {}", key.id, key.scope).red());
        return Ok(());
    };

    if !doc.is_locked {
        println!("{}", format!("Session '{}' is not locked", key.id).yellow());
        return Ok(());
    }

    let token = token.unwrap_or(doc.lock_token);
    manager.release(&key.id, &key.scope, token)?;

    match manager.inspect(&key.id, &key.scope)? {
        Some(after) if after.is_locked => {
            println!(
                "{}",
                format!(
                    "✗ Token {token} is not current; the lock is held under token {}",
                    after.lock_token
                )
                .red()
            );
        }
        _ => println!("{}", format!("✓ Released '{}' (token {token})", key.id).green()),
    }

    Ok(())
}
