//! Expired session cleanup, one-shot or periodic.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use sst_core::maintenance::ExpirySweeper;

use super::open_store;
use crate::config::Settings;

pub async fn execute(every: Option<u64>, settings: &Settings) -> Result<()> {
    let db = open_store(settings)?;
    let sweeper = Arc::new(ExpirySweeper::new(db));

    let Some(secs) = every else {
        let removed = sweeper.sweep_once().context("Sweep failed")?;
        println!("{}", format!("✓ Removed {removed} expired session(s)").green());
        return Ok(());
    };

    if secs == 0 {
        bail!("--every must be at least 1 second");
    }

    println!(
        "{}",
        format!("Sweeping every {secs}s (Ctrl-C to stop)...").cyan()
    );
    sweeper.clone().start(Duration::from_secs(secs)).await;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    sweeper.stop().await;
    println!("{}", "✓ Sweeper stopped".green());
    Ok(())
}
