//! Session record types for sst-core.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StoreError, StoreResult};

// ─────────────────────────────────────────────────────────────────────────────
// Action Flags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitmask of pending actions recorded on a session document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionFlags(i32);

impl ActionFlags {
    pub const NONE: ActionFlags = ActionFlags(0);
    /// The record is an empty placeholder; treat it as new state, do not deserialize.
    pub const INITIALIZE: ActionFlags = ActionFlags(1);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: ActionFlags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ActionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("none")
        } else if *self == Self::INITIALIZE {
            f.write_str("initialize")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stored Document
// ─────────────────────────────────────────────────────────────────────────────

/// A session document exactly as the document store holds it.
///
/// The payload stays text-encoded here; [`SessionRecord`] is the decoded view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub id: String,
    pub application_scope: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub locked_at: DateTime<Utc>,
    pub lock_token: i64,
    pub timeout_minutes: u32,
    pub is_locked: bool,
    /// Base64 text; empty means "no data yet".
    pub payload: String,
    pub action_flags: ActionFlags,
}

impl SessionDocument {
    /// Build a fresh, unlocked document that expires `timeout_minutes` after `now`.
    pub fn new(
        id: impl Into<String>,
        application_scope: impl Into<String>,
        now: DateTime<Utc>,
        timeout_minutes: u32,
        payload: &[u8],
    ) -> Self {
        Self {
            id: id.into(),
            application_scope: application_scope.into(),
            created_at: now,
            expires_at: expiry_from(now, timeout_minutes),
            locked_at: now,
            lock_token: 0,
            timeout_minutes,
            is_locked: false,
            payload: encode_payload(payload),
            action_flags: ActionFlags::NONE,
        }
    }

    /// Build an empty placeholder marked for initialization.
    pub fn placeholder(
        id: impl Into<String>,
        application_scope: impl Into<String>,
        now: DateTime<Utc>,
        timeout_minutes: u32,
    ) -> Self {
        Self {
            action_flags: ActionFlags::INITIALIZE,
            ..Self::new(id, application_scope, now, timeout_minutes, &[])
        }
    }

    /// A document is live while `expires_at` is strictly in the future.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn lock_age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.locked_at
    }

    /// Decode into the caller-facing record.
    pub fn into_record(self) -> StoreResult<SessionRecord> {
        let payload = decode_payload(&self.payload)
            .map_err(|e| StoreError::corrupt(&self.id, format!("payload is not base64: {e}")))?;

        Ok(SessionRecord {
            id: self.id,
            application_scope: self.application_scope,
            created_at: self.created_at,
            expires_at: self.expires_at,
            locked_at: self.locked_at,
            lock_token: self.lock_token,
            timeout_minutes: self.timeout_minutes,
            is_locked: self.is_locked,
            payload,
            action_flags: self.action_flags,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Caller-facing Record
// ─────────────────────────────────────────────────────────────────────────────

/// A live session record with its payload decoded to the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub application_scope: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub locked_at: DateTime<Utc>,
    pub lock_token: i64,
    pub timeout_minutes: u32,
    pub is_locked: bool,
    pub payload: Vec<u8>,
    pub action_flags: ActionFlags,
}

impl SessionRecord {
    /// True when the record is an uninitialized placeholder.
    pub fn needs_initialization(&self) -> bool {
        self.action_flags.contains(ActionFlags::INITIALIZE)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Acquire Result
// ─────────────────────────────────────────────────────────────────────────────

/// How an acquire/read attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No live record exists (never created, removed, or expired).
    Absent,
    /// The record was returned and the caller owns the new lock token.
    Acquired,
    /// The record exists but another caller holds it.
    Locked,
}

/// Result of [`SessionStateStore::acquire_and_read`](crate::session::SessionStateStore::acquire_and_read).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireOutcome {
    /// The live record; `None` when absent, expired or locked by another caller.
    pub record: Option<SessionRecord>,
    /// True when the record could not be obtained because another caller holds it.
    pub locked: bool,
    /// Time since the lock was last taken; `None` when no record was found.
    pub lock_age: Option<Duration>,
    /// The caller's token when acquired, otherwise the current holder's token.
    pub lock_token: i64,
    /// Flags as stored before this call cleared them.
    pub action_flags: ActionFlags,
}

impl AcquireOutcome {
    pub fn absent() -> Self {
        Self {
            record: None,
            locked: false,
            lock_age: None,
            lock_token: 0,
            action_flags: ActionFlags::NONE,
        }
    }

    pub fn locked(lock_token: i64, lock_age: Duration, action_flags: ActionFlags) -> Self {
        Self {
            record: None,
            locked: true,
            lock_age: Some(lock_age),
            lock_token,
            action_flags,
        }
    }

    pub fn state(&self) -> LockState {
        match (&self.record, self.locked) {
            (_, true) => LockState::Locked,
            (Some(_), false) => LockState::Acquired,
            (None, false) => LockState::Absent,
        }
    }

    /// True when the middleware must start from fresh, empty session state.
    pub fn needs_initialization(&self) -> bool {
        self.record.is_some() && self.action_flags.contains(ActionFlags::INITIALIZE)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `now + timeout_minutes`
pub fn expiry_from(now: DateTime<Utc>, timeout_minutes: u32) -> DateTime<Utc> {
    now + Duration::minutes(i64::from(timeout_minutes))
}

pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_payload(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_action_flags() {
        assert!(ActionFlags::INITIALIZE.contains(ActionFlags::INITIALIZE));
        assert!(!ActionFlags::NONE.contains(ActionFlags::INITIALIZE));
        assert!(!ActionFlags::INITIALIZE.contains(ActionFlags::NONE));
        assert!(ActionFlags::from_bits(3).contains(ActionFlags::INITIALIZE));
        assert_eq!(ActionFlags::INITIALIZE.to_string(), "initialize");
        assert_eq!(ActionFlags::NONE.to_string(), "none");
    }

    #[test]
    fn test_new_document_expiry() {
        let now = at(1_700_000_000_000);
        let doc = SessionDocument::new("s1", "/app", now, 20, b"hello");

        assert_eq!(doc.created_at, now);
        assert_eq!(doc.expires_at, now + Duration::minutes(20));
        assert_eq!(doc.lock_token, 0);
        assert!(!doc.is_locked);
        assert!(doc.is_live_at(now));
        assert!(!doc.is_live_at(doc.expires_at));
    }

    #[test]
    fn test_placeholder_is_empty_and_flagged() {
        let doc = SessionDocument::placeholder("s1", "/app", at(0), 20);
        assert!(doc.payload.is_empty());
        assert_eq!(doc.action_flags, ActionFlags::INITIALIZE);

        let record = doc.into_record().unwrap();
        assert!(record.payload.is_empty());
        assert!(record.needs_initialization());
    }

    #[test]
    fn test_into_record_decodes_payload() {
        let bytes = [0u8, 159, 146, 150, 255];
        let doc = SessionDocument::new("s1", "/app", at(0), 5, &bytes);
        let record = doc.into_record().unwrap();
        assert_eq!(record.payload, bytes);
    }

    #[test]
    fn test_into_record_rejects_garbage() {
        let mut doc = SessionDocument::new("s1", "/app", at(0), 5, b"x");
        doc.payload = "not base64!!".to_string();
        let err = doc.into_record().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_outcome_states() {
        assert_eq!(AcquireOutcome::absent().state(), LockState::Absent);

        let locked = AcquireOutcome::locked(4, Duration::seconds(30), ActionFlags::NONE);
        assert_eq!(locked.state(), LockState::Locked);
        assert_eq!(locked.lock_token, 4);
        assert!(!locked.needs_initialization());
    }
}
