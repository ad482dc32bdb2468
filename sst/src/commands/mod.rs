//! Command implementations for the sst CLI.
//!
//! Each submodule implements one command.

pub mod audit;
pub mod doctor;
pub mod init;
pub mod list;
pub mod release;
pub mod remove;
pub mod show;
pub mod sweep;
pub mod touch;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use sst_core::{Database, SessionDocument, SessionRecordManager};

use crate::config::Settings;

/// Open the configured store.
pub(crate) fn open_store(settings: &Settings) -> Result<Arc<Database>> {
    let db = Database::open(&settings.store).context("Failed to open session store")?;
    Ok(Arc::new(db))
}

/// Session manager over `db`, auditing store failures into the same database.
pub(crate) fn manager(db: Arc<Database>, settings: &Settings) -> SessionRecordManager {
    SessionRecordManager::new(db.clone(), settings.store.session_settings()).with_audit_sink(db)
}

/// Colored lock/expiry status for a document.
pub(crate) fn status_label(doc: &SessionDocument, now: DateTime<Utc>) -> ColoredString {
    if !doc.is_live_at(now) {
        "expired".red()
    } else if doc.is_locked {
        "locked".yellow()
    } else {
        "idle".green()
    }
}

/// `1h 5m`, `3m 12s`, `42s`; negative spans render as `-…`.
pub(crate) fn human_duration(span: chrono::Duration) -> String {
    let total = span.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{sign}{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{sign}{minutes}m {seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}
