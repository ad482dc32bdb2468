//! sst-core - Shared session state store
//!
//! Keeps one document per (session id, application scope) in a shared
//! document store and coordinates concurrent requests with a lock token
//! protocol built from conditional single-document writes:
//!
//! - **session**: the lock/expire protocol ([`SessionRecordManager`])
//! - **store**: the [`DocumentStore`] abstraction and an in-memory backend
//! - **db**: embedded SQLite backend (feature `db`)
//! - **config**: connection settings, file and environment loading
//! - **audit**: where store failures are reported
//! - **maintenance**: sweeping expired documents

pub mod audit;
pub mod clock;
pub mod config;
#[cfg(feature = "db")]
pub mod db;
pub mod error;
pub mod maintenance;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{SessionSettings, StoreConfig, WriteConcern};
#[cfg(feature = "db")]
pub use db::Database;
pub use error::{Error, Result};
pub use session::{SessionRecordManager, SessionStateStore};
pub use store::{DocumentStore, MemoryDocumentStore};
pub use types::{AcquireOutcome, ActionFlags, LockState, SessionDocument, SessionRecord};
