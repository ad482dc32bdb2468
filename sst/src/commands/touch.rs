//! Expiry reset.

use anyhow::Result;
use colored::Colorize;
use sst_core::SessionStateStore;

use super::{manager, open_store};
use crate::cli::SessionKey;
use crate::config::Settings;

pub async fn execute(key: &SessionKey, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let manager = manager(db, settings);

    manager.reset_timeout(&key.id, &key.scope)?;

    match manager.inspect(&key.id, &key.scope)? {
        Some(doc) => println!(
            "{}",
            format!("✓ '{}' now expires at {}", key.id, doc.expires_at.to_rfc3339()).green()
        ),
        None => println!("{}", format!("Session '{}' not found in {}", key.id, key.scope).red()),
    }

    Ok(())
}
