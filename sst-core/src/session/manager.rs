//! Session record manager: the lock/expire protocol over a [`DocumentStore`].

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::SessionStateStore;
use crate::audit::{AuditEvent, AuditSink, TracingAuditSink};
use crate::clock::{Clock, SystemClock};
use crate::config::SessionSettings;
use crate::error::{Error, Operation, Result, StoreError};
use crate::store::{DocumentStore, Filter, Update};
use crate::types::{AcquireOutcome, ActionFlags, SessionDocument, encode_payload, expiry_from};

/// Stateless coordinator for session documents.
///
/// Cheap to share behind an `Arc`; every call is a handful of conditional
/// store operations and nothing is cached between calls.
pub struct SessionRecordManager {
    store: Arc<dyn DocumentStore>,
    settings: SessionSettings,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl SessionRecordManager {
    pub fn new(store: Arc<dyn DocumentStore>, settings: SessionSettings) -> Self {
        Self {
            store,
            settings,
            audit: Arc::new(TracingAuditSink),
            clock: Arc::new(SystemClock),
        }
    }

    /// Send store failures to `audit` instead of the tracing sink.
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Read the raw stored document without touching locks or expiry.
    pub fn inspect(&self, id: &str, scope: &str) -> Result<Option<SessionDocument>> {
        validate_key(id, scope)?;
        self.store
            .find_one(&Filter::session(id, scope))
            .map_err(|e| self.store_failure(Operation::Inspect, e))
    }

    /// List stored documents, soonest expiry first.
    pub fn list(&self, scope: Option<&str>, limit: usize) -> Result<Vec<SessionDocument>> {
        let filter = match scope {
            Some(scope) => Filter::scope(scope),
            None => Filter::all(),
        };
        self.store
            .find(&filter, limit)
            .map_err(|e| self.store_failure(Operation::Inspect, e))
    }

    /// Log, optionally audit, and collapse a store failure into the opaque caller error.
    fn store_failure(&self, operation: Operation, err: StoreError) -> Error {
        error!(%operation, error = %err, "session store operation failed");

        if self.settings.write_exceptions_to_event_log {
            let event = AuditEvent::new(operation, err.to_string(), self.clock.now());
            if let Err(audit_err) = self.audit.record(&event) {
                warn!(%operation, error = %audit_err, "failed to record audit event");
            }
        }

        Error::StoreUnavailable { operation }
    }

    /// Best-effort undo of a lock taken by this call that cannot be handed out.
    fn abandon_lock(&self, id: &str, scope: &str, lock_token: i64) {
        let filter = Filter::session(id, scope).lock_token(lock_token).locked(true);
        match self.store.update(&filter, &[Update::IsLocked(false)]) {
            Ok(n) => debug!(session_id = id, scope, released = n, "abandoned lock"),
            Err(err) => warn!(session_id = id, scope, error = %err, "failed to abandon lock"),
        }
    }

    /// Best-effort removal of a document found expired during a read.
    fn discard_expired(&self, id: &str, scope: &str, now: chrono::DateTime<chrono::Utc>) {
        let filter = Filter::session(id, scope).expired_as_of(now);
        match self.store.delete(&filter) {
            Ok(n) => debug!(session_id = id, scope, removed = n, "discarded expired session"),
            Err(err) => warn!(session_id = id, scope, error = %err, "failed to discard expired session"),
        }
    }
}

impl SessionStateStore for SessionRecordManager {
    fn acquire_and_read(&self, id: &str, scope: &str, exclusive: bool) -> Result<AcquireOutcome> {
        const OP: Operation = Operation::AcquireAndRead;
        validate_key(id, scope)?;

        let now = self.clock.now();
        let key = Filter::session(id, scope);

        let mut locked = false;
        if exclusive {
            let available = key.clone().locked(false).expires_after(now);
            let matched = self
                .store
                .update(&available, &[Update::IsLocked(true), Update::LockedAt(now)])
                .map_err(|e| self.store_failure(OP, e))?;
            locked = matched == 0;
        }

        let Some(doc) = self
            .store
            .find_one(&key)
            .map_err(|e| self.store_failure(OP, e))?
        else {
            return Ok(AcquireOutcome::absent());
        };

        if !doc.is_live_at(now) {
            self.discard_expired(id, scope, now);
            return Ok(AcquireOutcome::absent());
        }

        if !exclusive {
            locked = doc.is_locked;
        }

        let lock_age = doc.lock_age_at(now);
        let observed_token = doc.lock_token;
        let action_flags = doc.action_flags;

        if locked {
            debug!(session_id = id, scope, lock_token = observed_token, "session held by another request");
            return Ok(AcquireOutcome::locked(observed_token, lock_age, action_flags));
        }

        let mut record = match doc.into_record() {
            Ok(record) => record,
            Err(e) => {
                if exclusive {
                    self.abandon_lock(id, scope, observed_token);
                }
                return Err(self.store_failure(OP, e));
            }
        };

        // The lock bit must still be as this call left it: set by our step-1
        // update for exclusive reads, clear for shared reads.
        let finalize = key.lock_token(observed_token).locked(exclusive);
        let token = observed_token + 1;
        let matched = self
            .store
            .update(
                &finalize,
                &[Update::LockToken(token), Update::ActionFlags(ActionFlags::NONE)],
            )
            .map_err(|e| self.store_failure(OP, e))?;

        if matched == 0 {
            debug!(session_id = id, scope, "lost lock token race");
            return Ok(AcquireOutcome::locked(observed_token, lock_age, action_flags));
        }

        record.lock_token = token;
        Ok(AcquireOutcome {
            record: Some(record),
            locked: false,
            lock_age: Some(lock_age),
            lock_token: token,
            action_flags,
        })
    }

    fn release_and_write(
        &self,
        id: &str,
        scope: &str,
        lock_token: i64,
        payload: &[u8],
        timeout_minutes: u32,
        is_new: bool,
    ) -> Result<()> {
        const OP: Operation = Operation::ReleaseAndWrite;
        validate_key(id, scope)?;
        validate_timeout(timeout_minutes)?;

        let now = self.clock.now();

        if is_new {
            let doc = SessionDocument::new(id, scope, now, timeout_minutes, payload);
            return self
                .store
                .insert_or_replace(&doc)
                .map_err(|e| self.store_failure(OP, e));
        }

        let held = Filter::session(id, scope).lock_token(lock_token).locked(true);
        let matched = self
            .store
            .update(
                &held,
                &[
                    Update::Payload(encode_payload(payload)),
                    Update::TimeoutMinutes(timeout_minutes),
                    Update::ExpiresAt(expiry_from(now, timeout_minutes)),
                    Update::IsLocked(false),
                ],
            )
            .map_err(|e| self.store_failure(OP, e))?;

        if matched == 0 {
            warn!(session_id = id, scope, lock_token, "write skipped: lock token is no longer current");
        }
        Ok(())
    }

    fn release(&self, id: &str, scope: &str, lock_token: i64) -> Result<()> {
        validate_key(id, scope)?;

        let now = self.clock.now();
        let held = Filter::session(id, scope).lock_token(lock_token).locked(true);
        let matched = self
            .store
            .update(
                &held,
                &[
                    Update::IsLocked(false),
                    Update::ExpiresAt(expiry_from(now, self.settings.timeout_minutes)),
                ],
            )
            .map_err(|e| self.store_failure(Operation::Release, e))?;

        if matched == 0 {
            debug!(session_id = id, scope, lock_token, "release skipped: lock token is no longer current");
        }
        Ok(())
    }

    fn delete(&self, id: &str, scope: &str, lock_token: i64) -> Result<()> {
        validate_key(id, scope)?;

        let removed = self
            .store
            .delete(&Filter::session(id, scope).lock_token(lock_token))
            .map_err(|e| self.store_failure(Operation::Delete, e))?;

        if removed == 0 {
            debug!(session_id = id, scope, lock_token, "delete skipped: lock token is no longer current");
        }
        Ok(())
    }

    fn reset_timeout(&self, id: &str, scope: &str) -> Result<()> {
        validate_key(id, scope)?;

        let now = self.clock.now();
        self.store
            .update(
                &Filter::session(id, scope),
                &[Update::ExpiresAt(expiry_from(now, self.settings.timeout_minutes))],
            )
            .map_err(|e| self.store_failure(Operation::ResetTimeout, e))?;
        Ok(())
    }

    fn create_placeholder(&self, id: &str, scope: &str, timeout_minutes: u32) -> Result<()> {
        validate_key(id, scope)?;
        validate_timeout(timeout_minutes)?;

        let doc = SessionDocument::placeholder(id, scope, self.clock.now(), timeout_minutes);
        self.store
            .insert_or_replace(&doc)
            .map_err(|e| self.store_failure(Operation::CreatePlaceholder, e))
    }
}

fn validate_key(id: &str, scope: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_argument("session id must not be empty"));
    }
    if scope.is_empty() {
        return Err(Error::invalid_argument("application scope must not be empty"));
    }
    Ok(())
}

fn validate_timeout(timeout_minutes: u32) -> Result<()> {
    if timeout_minutes == 0 {
        return Err(Error::invalid_argument("timeout_minutes must be greater than 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{AuditError, StoreResult};
    use crate::store::MemoryDocumentStore;
    use crate::types::LockState;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Mutex;

    const SCOPE: &str = "/app";

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn setup() -> (SessionRecordManager, Arc<MemoryDocumentStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let manager = SessionRecordManager::new(store.clone(), SessionSettings::default())
            .with_clock(clock.clone());
        (manager, store, clock)
    }

    #[test]
    fn test_absent_session() {
        let (manager, _, _) = setup();

        let outcome = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert_eq!(outcome.state(), LockState::Absent);
        assert!(outcome.lock_age.is_none());
    }

    #[test]
    fn test_full_request_cycle() {
        let (manager, store, _) = setup();

        manager.release_and_write("s1", SCOPE, 0, b"cart=1", 20, true).unwrap();

        let first = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert_eq!(first.state(), LockState::Acquired);
        assert_eq!(first.lock_token, 1);
        assert_eq!(first.record.as_ref().unwrap().payload, b"cart=1");

        let second = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert_eq!(second.state(), LockState::Locked);
        assert_eq!(second.lock_token, 1);

        manager.release_and_write("s1", SCOPE, 1, b"cart=2", 20, false).unwrap();

        let doc = store.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert!(!doc.is_locked);
        assert_eq!(doc.lock_token, 1);

        let third = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert_eq!(third.lock_token, 2);
        assert_eq!(third.record.unwrap().payload, b"cart=2");
    }

    #[test]
    fn test_stale_token_cannot_write() {
        let (manager, store, _) = setup();
        manager.release_and_write("s1", SCOPE, 0, b"v1", 20, true).unwrap();

        let held = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        manager.release("s1", SCOPE, held.lock_token).unwrap();

        // Same token again: the lock it named is gone.
        manager.release_and_write("s1", SCOPE, held.lock_token, b"stale", 20, false).unwrap();

        let doc = store.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert_eq!(doc.payload, encode_payload(b"v1"));
    }

    #[test]
    fn test_non_exclusive_read_of_held_session() {
        let (manager, _, clock) = setup();
        manager.release_and_write("s1", SCOPE, 0, b"v1", 20, true).unwrap();
        let held = manager.acquire_and_read("s1", SCOPE, true).unwrap();

        clock.advance(Duration::seconds(5));
        let read = manager.acquire_and_read("s1", SCOPE, false).unwrap();
        assert!(read.locked);
        assert_eq!(read.lock_token, held.lock_token);
        assert_eq!(read.lock_age, Some(Duration::seconds(5)));

        // The reader did not disturb the holder.
        manager.release_and_write("s1", SCOPE, held.lock_token, b"v2", 20, false).unwrap();
        let next = manager.acquire_and_read("s1", SCOPE, false).unwrap();
        assert_eq!(next.record.unwrap().payload, b"v2");
    }

    #[test]
    fn test_non_exclusive_read_does_not_lock() {
        let (manager, store, _) = setup();
        manager.release_and_write("s1", SCOPE, 0, b"v1", 20, true).unwrap();

        let read = manager.acquire_and_read("s1", SCOPE, false).unwrap();
        assert_eq!(read.state(), LockState::Acquired);

        let doc = store.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert!(!doc.is_locked);

        let exclusive = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert_eq!(exclusive.state(), LockState::Acquired);
    }

    #[test]
    fn test_expired_session_is_absent_and_removed() {
        let (manager, store, clock) = setup();
        manager.release_and_write("s1", SCOPE, 0, b"v1", 1, true).unwrap();

        clock.advance(Duration::minutes(1));
        let outcome = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert_eq!(outcome.state(), LockState::Absent);
        assert!(store.is_empty());
    }

    #[test]
    fn test_placeholder_requests_initialization() {
        let (manager, store, _) = setup();
        manager.create_placeholder("s1", SCOPE, 20).unwrap();

        let outcome = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert!(outcome.needs_initialization());
        assert!(outcome.record.as_ref().unwrap().payload.is_empty());

        let doc = store.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert_eq!(doc.action_flags, ActionFlags::NONE);

        manager.release("s1", SCOPE, outcome.lock_token).unwrap();
        let again = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        assert!(!again.needs_initialization());
    }

    #[test]
    fn test_reset_timeout_ignores_lock() {
        let (manager, store, clock) = setup();
        manager.release_and_write("s1", SCOPE, 0, b"v1", 20, true).unwrap();
        manager.acquire_and_read("s1", SCOPE, true).unwrap();

        clock.advance(Duration::minutes(10));
        manager.reset_timeout("s1", SCOPE).unwrap();

        let doc = store.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert!(doc.is_locked);
        assert_eq!(doc.expires_at, start() + Duration::minutes(30));
    }

    #[test]
    fn test_delete_requires_current_token() {
        let (manager, store, _) = setup();
        manager.release_and_write("s1", SCOPE, 0, b"v1", 20, true).unwrap();
        let held = manager.acquire_and_read("s1", SCOPE, true).unwrap();

        manager.delete("s1", SCOPE, held.lock_token + 7).unwrap();
        assert_eq!(store.len(), 1);

        manager.delete("s1", SCOPE, held.lock_token).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_scopes_are_isolated() {
        let (manager, _, _) = setup();
        manager.release_and_write("s1", "/a", 0, b"a", 20, true).unwrap();
        manager.release_and_write("s1", "/b", 0, b"b", 20, true).unwrap();

        let a = manager.acquire_and_read("s1", "/a", true).unwrap();
        let b = manager.acquire_and_read("s1", "/b", true).unwrap();
        assert_eq!(a.state(), LockState::Acquired);
        assert_eq!(b.state(), LockState::Acquired);
        assert_eq!(b.record.unwrap().payload, b"b");
    }

    #[test]
    fn test_invalid_arguments() {
        let (manager, _, _) = setup();

        let err = manager.acquire_and_read("", SCOPE, true).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = manager.release("s1", "", 1).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = manager.create_placeholder("s1", SCOPE, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_list_and_inspect() {
        let (manager, _, clock) = setup();
        manager.release_and_write("s1", "/a", 0, b"a", 20, true).unwrap();
        clock.advance(Duration::minutes(1));
        manager.release_and_write("s2", "/a", 0, b"b", 20, true).unwrap();
        manager.release_and_write("s3", "/b", 0, b"c", 20, true).unwrap();

        let scoped = manager.list(Some("/a"), 10).unwrap();
        assert_eq!(
            scoped.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["s1", "s2"]
        );
        assert_eq!(manager.list(None, 2).unwrap().len(), 2);

        assert!(manager.inspect("s3", "/b").unwrap().is_some());
        assert!(manager.inspect("s3", "/a").unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Failure reporting
    // ─────────────────────────────────────────────────────────────────────────

    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn find_one(&self, _: &Filter) -> StoreResult<Option<SessionDocument>> {
            Err(StoreError::Other("connection refused".to_string()))
        }
        fn find(&self, _: &Filter, _: usize) -> StoreResult<Vec<SessionDocument>> {
            Err(StoreError::Other("connection refused".to_string()))
        }
        fn update(&self, _: &Filter, _: &[Update]) -> StoreResult<u64> {
            Err(StoreError::Other("connection refused".to_string()))
        }
        fn insert_or_replace(&self, _: &SessionDocument) -> StoreResult<()> {
            Err(StoreError::Other("connection refused".to_string()))
        }
        fn delete(&self, _: &Filter) -> StoreResult<u64> {
            Err(StoreError::Other("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl AuditSink for RecordingSink {
        fn record(&self, event: &AuditEvent) -> std::result::Result<(), AuditError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn record(&self, _: &AuditEvent) -> std::result::Result<(), AuditError> {
            Err(AuditError::Unavailable("event log full".to_string()))
        }
    }

    fn broken(event_log: bool, sink: Arc<dyn AuditSink>) -> SessionRecordManager {
        let settings = SessionSettings {
            write_exceptions_to_event_log: event_log,
            ..SessionSettings::default()
        };
        SessionRecordManager::new(Arc::new(BrokenStore), settings).with_audit_sink(sink)
    }

    #[test]
    fn test_store_failure_is_opaque() {
        let manager = broken(false, Arc::new(TracingAuditSink));

        let err = manager.acquire_and_read("s1", SCOPE, true).unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(!err.to_string().contains("connection refused"));

        let err = manager.release("s1", SCOPE, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::StoreUnavailable {
                operation: Operation::Release
            }
        ));
    }

    #[test]
    fn test_store_failure_is_audited_when_enabled() {
        let sink = Arc::new(RecordingSink::default());
        let manager = broken(true, sink.clone());

        manager.reset_timeout("s1", SCOPE).unwrap_err();

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, "reset_timeout");
        assert!(events[0].message.contains("connection refused"));
    }

    #[test]
    fn test_store_failure_not_audited_when_disabled() {
        let sink = Arc::new(RecordingSink::default());
        let manager = broken(false, sink.clone());

        manager.delete("s1", SCOPE, 1).unwrap_err();
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_audit_failure_does_not_mask_store_error() {
        let manager = broken(true, Arc::new(FailingSink));

        let err = manager.create_placeholder("s1", SCOPE, 20).unwrap_err();
        assert!(matches!(
            err,
            Error::StoreUnavailable {
                operation: Operation::CreatePlaceholder
            }
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Interleavings
    // ─────────────────────────────────────────────────────────────────────────

    type Hook = Box<dyn FnOnce() + Send>;

    /// Runs a one-shot hook before the next `find_one`, i.e. between the lock
    /// attempt and the read of an acquire.
    struct InterleavedStore {
        inner: Arc<MemoryDocumentStore>,
        before_find: Mutex<Option<Hook>>,
    }

    impl InterleavedStore {
        fn new(inner: Arc<MemoryDocumentStore>) -> Self {
            Self {
                inner,
                before_find: Mutex::new(None),
            }
        }

        fn before_next_find(&self, hook: impl FnOnce() + Send + 'static) {
            *self.before_find.lock().unwrap() = Some(Box::new(hook));
        }
    }

    impl DocumentStore for InterleavedStore {
        fn find_one(&self, filter: &Filter) -> StoreResult<Option<SessionDocument>> {
            let hook = self.before_find.lock().unwrap().take();
            if let Some(hook) = hook {
                hook();
            }
            self.inner.find_one(filter)
        }
        fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<SessionDocument>> {
            self.inner.find(filter, limit)
        }
        fn update(&self, filter: &Filter, updates: &[Update]) -> StoreResult<u64> {
            self.inner.update(filter, updates)
        }
        fn insert_or_replace(&self, doc: &SessionDocument) -> StoreResult<()> {
            self.inner.insert_or_replace(doc)
        }
        fn delete(&self, filter: &Filter) -> StoreResult<u64> {
            self.inner.delete(filter)
        }
    }

    #[test]
    fn test_repeated_release_during_acquire_keeps_single_holder() {
        let inner = Arc::new(MemoryDocumentStore::new());
        let store = Arc::new(InterleavedStore::new(inner.clone()));
        let manager = Arc::new(SessionRecordManager::new(store.clone(), SessionSettings::default()));

        manager.release_and_write("s1", SCOPE, 0, b"v1", 20, true).unwrap();
        let first = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        manager.release("s1", SCOPE, first.lock_token).unwrap();

        // The previous holder repeats its release while the next caller is
        // between taking the lock and reading the document.
        let previous = manager.clone();
        let stale_token = first.lock_token;
        store.before_next_find(move || {
            previous.release("s1", SCOPE, stale_token).unwrap();
        });
        let second = manager.acquire_and_read("s1", SCOPE, true).unwrap();
        let third = manager.acquire_and_read("s1", SCOPE, true).unwrap();

        let holders = [&second, &third]
            .iter()
            .filter(|o| o.state() == LockState::Acquired)
            .count();
        assert_eq!(holders, 1);
        assert_eq!(second.state(), LockState::Locked);
        assert_eq!(third.lock_token, stale_token + 1);

        let doc = inner.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert!(doc.is_locked);
        assert_eq!(doc.lock_token, third.lock_token);
    }

    #[test]
    fn test_corrupt_payload_does_not_leave_lock_behind() {
        let (manager, store, _) = setup();
        let mut doc = SessionDocument::new("s1", SCOPE, start(), 20, b"");
        doc.payload = "!!bad".to_string();
        store.insert_or_replace(&doc).unwrap();

        let err = manager.acquire_and_read("s1", SCOPE, true).unwrap_err();
        assert!(matches!(
            err,
            Error::StoreUnavailable {
                operation: Operation::AcquireAndRead
            }
        ));

        let after = store.find_one(&Filter::session("s1", SCOPE)).unwrap().unwrap();
        assert!(!after.is_locked);
        assert_eq!(after.lock_token, 0);
    }
}
