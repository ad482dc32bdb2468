//! Document store contract used by the session manager.
//!
//! The manager only needs single-document atomic operations: a lookup, a
//! conditional update that reports how many documents matched, an upsert, and
//! a conditional delete. Zero matches is a normal outcome and must be returned
//! as `Ok(0)`, never as an error.

mod memory;

pub use memory::MemoryDocumentStore;

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::types::{ActionFlags, SessionDocument};

/// A predicate on one document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    IsLocked(bool),
    LockToken(i64),
    /// `expires_at > t`
    ExpiresAfter(DateTime<Utc>),
    /// `expires_at < t`
    ExpiresBefore(DateTime<Utc>),
    /// `expires_at <= t`, i.e. no longer live at `t`
    ExpiredAsOf(DateTime<Utc>),
}

/// Conjunction of predicates, optionally keyed by `(id, application_scope)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub id: Option<String>,
    pub application_scope: Option<String>,
    pub predicates: Vec<Predicate>,
}

impl Filter {
    /// Match every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the single document keyed by `(id, scope)`.
    pub fn session(id: &str, scope: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            application_scope: Some(scope.to_string()),
            predicates: Vec::new(),
        }
    }

    /// Match every document of one application scope.
    pub fn scope(scope: &str) -> Self {
        Self {
            application_scope: Some(scope.to_string()),
            ..Self::default()
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.predicates.push(Predicate::IsLocked(locked));
        self
    }

    pub fn lock_token(mut self, token: i64) -> Self {
        self.predicates.push(Predicate::LockToken(token));
        self
    }

    pub fn expires_after(mut self, t: DateTime<Utc>) -> Self {
        self.predicates.push(Predicate::ExpiresAfter(t));
        self
    }

    pub fn expires_before(mut self, t: DateTime<Utc>) -> Self {
        self.predicates.push(Predicate::ExpiresBefore(t));
        self
    }

    pub fn expired_as_of(mut self, t: DateTime<Utc>) -> Self {
        self.predicates.push(Predicate::ExpiredAsOf(t));
        self
    }

    /// Evaluate the filter against a document in memory.
    pub fn matches(&self, doc: &SessionDocument) -> bool {
        if self.id.as_deref().is_some_and(|id| id != doc.id) {
            return false;
        }
        if self
            .application_scope
            .as_deref()
            .is_some_and(|scope| scope != doc.application_scope)
        {
            return false;
        }
        self.predicates.iter().all(|p| match p {
            Predicate::IsLocked(locked) => doc.is_locked == *locked,
            Predicate::LockToken(token) => doc.lock_token == *token,
            Predicate::ExpiresAfter(t) => doc.expires_at > *t,
            Predicate::ExpiresBefore(t) => doc.expires_at < *t,
            Predicate::ExpiredAsOf(t) => doc.expires_at <= *t,
        })
    }
}

/// A single field assignment applied by [`DocumentStore::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    IsLocked(bool),
    LockedAt(DateTime<Utc>),
    ExpiresAt(DateTime<Utc>),
    LockToken(i64),
    TimeoutMinutes(u32),
    Payload(String),
    ActionFlags(ActionFlags),
}

impl Update {
    /// Apply the assignment to a document in memory.
    pub fn apply(&self, doc: &mut SessionDocument) {
        match self {
            Update::IsLocked(v) => doc.is_locked = *v,
            Update::LockedAt(v) => doc.locked_at = *v,
            Update::ExpiresAt(v) => doc.expires_at = *v,
            Update::LockToken(v) => doc.lock_token = *v,
            Update::TimeoutMinutes(v) => doc.timeout_minutes = *v,
            Update::Payload(v) => doc.payload = v.clone(),
            Update::ActionFlags(v) => doc.action_flags = *v,
        }
    }
}

/// Storage backend for session documents.
///
/// Implementations must make `update` and `delete` atomic per document: the
/// filter check and the write happen as one step with respect to every other
/// caller, including callers in other processes.
pub trait DocumentStore: Send + Sync {
    /// Fetch the first document matching the filter.
    fn find_one(&self, filter: &Filter) -> StoreResult<Option<SessionDocument>>;

    /// Fetch up to `limit` matching documents, ordered by `expires_at`.
    fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<SessionDocument>>;

    /// Apply the updates to every matching document. Returns the match count.
    fn update(&self, filter: &Filter, updates: &[Update]) -> StoreResult<u64>;

    /// Insert the document, replacing any existing one with the same key.
    fn insert_or_replace(&self, doc: &SessionDocument) -> StoreResult<()>;

    /// Delete every matching document. Returns the number removed.
    fn delete(&self, filter: &Filter) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn doc() -> SessionDocument {
        let now = DateTime::from_timestamp_millis(1_000_000).unwrap();
        SessionDocument::new("s1", "/app", now, 10, b"data")
    }

    #[test]
    fn test_filter_key_matching() {
        let d = doc();
        assert!(Filter::session("s1", "/app").matches(&d));
        assert!(!Filter::session("s1", "/other").matches(&d));
        assert!(!Filter::session("s2", "/app").matches(&d));
        assert!(Filter::scope("/app").matches(&d));
        assert!(Filter::all().matches(&d));
    }

    #[test]
    fn test_filter_predicates() {
        let d = doc();
        let before = d.expires_at - Duration::seconds(1);
        let after = d.expires_at + Duration::seconds(1);

        assert!(Filter::session("s1", "/app").locked(false).matches(&d));
        assert!(!Filter::session("s1", "/app").locked(true).matches(&d));
        assert!(Filter::session("s1", "/app").lock_token(0).matches(&d));
        assert!(!Filter::session("s1", "/app").lock_token(1).matches(&d));
        assert!(Filter::all().expires_after(before).matches(&d));
        assert!(!Filter::all().expires_after(d.expires_at).matches(&d));
        assert!(Filter::all().expires_before(after).matches(&d));
        assert!(!Filter::all().expires_before(d.expires_at).matches(&d));
        assert!(Filter::all().expired_as_of(d.expires_at).matches(&d));
        assert!(!Filter::all().expired_as_of(before).matches(&d));
    }

    #[test]
    fn test_update_apply() {
        let mut d = doc();
        Update::IsLocked(true).apply(&mut d);
        Update::LockToken(7).apply(&mut d);
        Update::ActionFlags(ActionFlags::INITIALIZE).apply(&mut d);
        Update::Payload(String::new()).apply(&mut d);

        assert!(d.is_locked);
        assert_eq!(d.lock_token, 7);
        assert_eq!(d.action_flags, ActionFlags::INITIALIZE);
        assert!(d.payload.is_empty());
    }
}
