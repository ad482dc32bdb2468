//! Session removal.

use anyhow::Result;
use colored::Colorize;
use sst_core::SessionStateStore;

use super::{manager, open_store};
use crate::cli::SessionKey;
use crate::config::Settings;

pub async fn execute(key: &SessionKey, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let manager = manager(db, settings);

    let Some(doc) = manager.inspect(&key.id, &key.scope)? else {
        println!("{}", format!("Session '{}' not found in {}", key.id, key.scope).red());
        return Ok(());
    };

    manager.delete(&key.id, &key.scope, doc.lock_token)?;

    if manager.inspect(&key.id, &key.scope)?.is_some() {
        println!(
            "{}",
            format!("✗ Session '{}' changed while removing it; try again", key.id).red()
        );
    } else {
        println!("{}", format!("✓ Removed '{}'", key.id).green());
    }

    Ok(())
}
