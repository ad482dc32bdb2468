//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Session state store operator CLI
///
/// Schema setup, expiry sweeps and lock inspection for a shared session store.
#[derive(Parser, Debug)]
#[command(name = "sst")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: ~/.sst/config.toml)
    #[arg(long, global = true, env = "SST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Connection string, overriding the config file and environment
    #[arg(long, global = true)]
    pub connection: Option<String>,

    /// JSON logs and JSON command output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the session collection and write a config file if none exists
    Init,

    /// Delete expired session documents
    Sweep {
        /// Keep running, sweeping every SECS seconds until interrupted
        #[arg(long, value_name = "SECS")]
        every: Option<u64>,
    },

    /// Show one stored session document
    Show(SessionKey),

    /// List stored sessions, soonest expiry first
    List {
        /// Only sessions in this application scope
        #[arg(short, long)]
        scope: Option<String>,

        /// Maximum number of sessions to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Release a session lock, e.g. one left behind by a crashed worker
    Release {
        #[command(flatten)]
        key: SessionKey,

        /// Lock token to release (default: the current holder's token)
        #[arg(short, long)]
        token: Option<i64>,
    },

    /// Remove a session regardless of who holds it
    Remove(SessionKey),

    /// Push a session's expiry out by the configured timeout
    Touch(SessionKey),

    /// Recent store failures recorded in the audit table
    Audit {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Run diagnostics
    Doctor,
}

/// Identifies one session document.
#[derive(Args, Debug, Clone)]
pub struct SessionKey {
    /// Session ID
    pub id: String,

    /// Application scope the session belongs to
    #[arg(short, long)]
    pub scope: String,
}
