//! Error types for sst-core.
//!
//! Three layers:
//!
//! - [`ConfigError`]: bad or missing startup configuration. Fatal, raised once.
//! - [`StoreError`]: what a [`DocumentStore`](crate::store::DocumentStore) reports.
//!   It carries backend detail and never leaves the session manager.
//! - [`Error`]: what callers of the session manager see. Store failures are
//!   collapsed into the opaque [`Error::StoreUnavailable`].

use std::fmt;

use thiserror::Error;

/// Result type alias using sst-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for document store implementations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced to callers of the session manager
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The document store failed during a request-scoped operation.
    ///
    /// The message is deliberately generic; backend detail is logged and sent
    /// to the audit sink, never carried here.
    #[error("Session store error during {operation}")]
    StoreUnavailable { operation: Operation },

    /// The store could not be opened at startup. Fatal, like a config error.
    #[error("Failed to open session store: {0}")]
    Open(#[source] StoreError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Check if this error came from the document store
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

/// Configuration validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("connection string is required")]
    MissingConnectionString,

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by document store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "db")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Corrupt session document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn corrupt(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by audit sinks
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    #[error("audit store error: {0}")]
    Store(#[from] StoreError),
}

/// The session manager operation an error or audit event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AcquireAndRead,
    ReleaseAndWrite,
    Release,
    Delete,
    ResetTimeout,
    CreatePlaceholder,
    Inspect,
    Sweep,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::AcquireAndRead => "acquire_and_read",
            Operation::ReleaseAndWrite => "release_and_write",
            Operation::Release => "release",
            Operation::Delete => "delete",
            Operation::ResetTimeout => "reset_timeout",
            Operation::CreatePlaceholder => "create_placeholder",
            Operation::Inspect => "inspect",
            Operation::Sweep => "sweep",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
