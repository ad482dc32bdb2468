//! Session record lifecycle and its lock/expire protocol.
//!
//! ## Request flow
//!
//! ```text
//! Request start
//!   │
//!   ├─► acquire_and_read(exclusive = true)
//!   │     ├─ Absent   → new session (release_and_write with is_new = true)
//!   │     ├─ Locked   → retry later; lock_age tells the caller how stale it is
//!   │     └─ Acquired → deserialize payload (or start empty on INITIALIZE)
//!   │
//! Request end
//!   │
//!   ├─► release_and_write(lock_token, payload)   data changed
//!   ├─► release(lock_token)                      data unchanged
//!   └─► delete(lock_token)                       session abandoned
//! ```
//!
//! All mutual exclusion comes from conditional single-document writes: the
//! manager keeps no in-process state, so any number of threads and processes
//! may share one store.

mod manager;

pub use manager::*;

use crate::error::Result;
use crate::types::AcquireOutcome;

/// Operations a session middleware calls on every request.
pub trait SessionStateStore: Send + Sync {
    /// Read a session, optionally taking its exclusive lock.
    fn acquire_and_read(&self, id: &str, scope: &str, exclusive: bool) -> Result<AcquireOutcome>;

    /// Write the payload and release the lock held under `lock_token`.
    ///
    /// With `is_new`, upsert a fresh unlocked document instead.
    fn release_and_write(
        &self,
        id: &str,
        scope: &str,
        lock_token: i64,
        payload: &[u8],
        timeout_minutes: u32,
        is_new: bool,
    ) -> Result<()>;

    /// Release the lock held under `lock_token` without touching the payload.
    fn release(&self, id: &str, scope: &str, lock_token: i64) -> Result<()>;

    /// Remove the session if `lock_token` is still current.
    fn delete(&self, id: &str, scope: &str, lock_token: i64) -> Result<()>;

    /// Push expiry out by the configured timeout, regardless of lock state.
    fn reset_timeout(&self, id: &str, scope: &str) -> Result<()>;

    /// Reserve an id with an empty document flagged for initialization.
    fn create_placeholder(&self, id: &str, scope: &str, timeout_minutes: u32) -> Result<()>;
}
