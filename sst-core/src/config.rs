//! Store configuration.
//!
//! Configuration is resolved once at startup with precedence:
//! 1. Environment variables (SST_*)
//! 2. Config file (`$SST_CONFIG` or ~/.sst/config.toml)
//! 3. Default values
//!
//! The resulting [`StoreConfig`] is immutable and shared by every store
//! operation for the life of the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE: &str = "SessionState";
pub const DEFAULT_COLLECTION: &str = "Sessions";
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 20;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `sqlite://<path>`, a plain path, or `sqlite::memory:`
    #[serde(default)]
    pub connection_string: String,

    /// Database name; the SQLite schema alias the store file is attached under
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection (table) holding the session documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Durability applied to every write
    #[serde(default)]
    pub write_concern: WriteConcern,

    /// Idle timeout used by release and timeout resets (default: 20)
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u32,

    /// Report store failures to the audit sink
    #[serde(default)]
    pub write_exceptions_to_event_log: bool,

    /// How long a write waits on another process's lock (default: 5000)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_timeout_minutes() -> u32 {
    DEFAULT_TIMEOUT_MINUTES
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            database: default_database(),
            collection: default_collection(),
            write_concern: WriteConcern::default(),
            timeout_minutes: default_timeout_minutes(),
            write_exceptions_to_event_log: false,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Create a config for the given connection string with default settings
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Default::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = write_concern;
        self
    }

    pub fn with_timeout_minutes(mut self, timeout_minutes: u32) -> Self {
        self.timeout_minutes = timeout_minutes;
        self
    }

    pub fn with_event_log(mut self, enabled: bool) -> Self {
        self.write_exceptions_to_event_log = enabled;
        self
    }

    /// Load from a TOML file (defaults if it does not exist), then apply
    /// SST_* environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Overlay values from a variable lookup (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SST_CONNECTION_STRING") {
            self.connection_string = v;
        }
        if let Some(v) = lookup("SST_DATABASE") {
            self.database = v;
        }
        if let Some(v) = lookup("SST_COLLECTION") {
            self.collection = v;
        }
        if let Some(v) = lookup("SST_WRITE_CONCERN") {
            self.write_concern = v.parse()?;
        }
        if let Some(v) = lookup("SST_TIMEOUT_MINUTES") {
            self.timeout_minutes = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("timeout_minutes", format!("not a number: {v}")))?;
        }
        Ok(())
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("SST_CONFIG") {
            PathBuf::from(path)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".sst")
                .join("config.toml")
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target()?;

        validate_identifier("database", &self.database)?;
        validate_identifier("collection", &self.collection)?;

        if self.timeout_minutes == 0 {
            return Err(ConfigError::invalid("timeout_minutes", "must be greater than 0"));
        }

        Ok(())
    }

    /// Resolve the connection string to a storage location
    pub fn target(&self) -> Result<ConnectionTarget, ConfigError> {
        ConnectionTarget::parse(&self.connection_string)
    }

    /// Settings the session manager needs from this config
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            timeout_minutes: self.timeout_minutes,
            write_exceptions_to_event_log: self.write_exceptions_to_event_log,
        }
    }
}

/// Manager-level settings derived from [`StoreConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub timeout_minutes: u32,
    pub write_exceptions_to_event_log: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            write_exceptions_to_event_log: false,
        }
    }
}

fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    let valid = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("'{value}' must be letters, digits and underscores"),
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection Target
// ─────────────────────────────────────────────────────────────────────────────

/// Where the document store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// Private to this process; gone when the store is dropped
    Memory,
    /// Shared file, safe for concurrent processes
    File(PathBuf),
}

impl ConnectionTarget {
    pub fn parse(connection_string: &str) -> Result<Self, ConfigError> {
        let s = connection_string.trim();
        if s.is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }

        match s {
            ":memory:" | "sqlite::memory:" | "sqlite://:memory:" => Ok(Self::Memory),
            _ => {
                let path = s.strip_prefix("sqlite://").unwrap_or(s);
                if path.is_empty() {
                    return Err(ConfigError::MissingConnectionString);
                }
                Ok(Self::File(PathBuf::from(path)))
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write Concern
// ─────────────────────────────────────────────────────────────────────────────

/// Write durability level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WriteConcernRepr", into = "WriteConcernRepr")]
pub enum WriteConcern {
    /// Fire-and-forget
    #[default]
    Unacknowledged,
    /// Wait for `n` acknowledgments; higher counts ask for stronger durability
    Acknowledged(u32),
}

impl WriteConcern {
    pub fn from_count(n: u32) -> Self {
        if n == 0 {
            Self::Unacknowledged
        } else {
            Self::Acknowledged(n)
        }
    }
}

impl FromStr for WriteConcern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "unacknowledged" => Ok(Self::Unacknowledged),
            "acknowledged" => Ok(Self::Acknowledged(1)),
            other => other.parse::<u32>().map(Self::from_count).map_err(|_| {
                ConfigError::invalid(
                    "write_concern",
                    format!("'{s}' is not 'unacknowledged', 'acknowledged' or a count"),
                )
            }),
        }
    }
}

impl fmt::Display for WriteConcern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unacknowledged => f.write_str("unacknowledged"),
            Self::Acknowledged(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WriteConcernRepr {
    Count(u32),
    Name(String),
}

impl TryFrom<WriteConcernRepr> for WriteConcern {
    type Error = ConfigError;

    fn try_from(repr: WriteConcernRepr) -> Result<Self, Self::Error> {
        match repr {
            WriteConcernRepr::Count(n) => Ok(Self::from_count(n)),
            WriteConcernRepr::Name(name) => name.parse(),
        }
    }
}

impl From<WriteConcern> for WriteConcernRepr {
    fn from(wc: WriteConcern) -> Self {
        match wc {
            WriteConcern::Unacknowledged => Self::Name("unacknowledged".to_string()),
            WriteConcern::Acknowledged(n) => Self::Count(n),
        }
    }
}
