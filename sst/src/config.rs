//! Configuration resolution for the CLI.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults
//! 2. Config file (`--config`, `$SST_CONFIG`, or ~/.sst/config.toml)
//! 3. `SST_*` environment variables
//! 4. `--connection`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sst_core::StoreConfig;

/// Resolved configuration plus where it was read from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreConfig,
    pub path: PathBuf,
}

impl Settings {
    pub fn load(path: Option<PathBuf>, connection: Option<String>) -> Result<Self> {
        let path = path.unwrap_or_else(StoreConfig::default_path);
        let mut store = StoreConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        if let Some(connection) = connection {
            store.connection_string = connection;
        }

        Ok(Self { store, path })
    }

    pub fn file_exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the store config to `self.path`.
    pub fn save(&self) -> Result<()> {
        save_to(&self.store, &self.path)
    }
}

fn save_to(store: &StoreConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = toml::to_string_pretty(store).context("Failed to serialize config")?;
    std::fs::write(path, content).context("Failed to write config file")?;

    Ok(())
}
