//! In-process document store.
//!
//! Holds documents in a map behind a single mutex, so every operation is
//! atomic with respect to other threads of the same process. Nothing is shared
//! across processes; use the SQLite store for that.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{DocumentStore, Filter, Update};
use crate::error::{StoreError, StoreResult};
use crate::types::SessionDocument;

type Key = (String, String);

/// Map-backed [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<BTreeMap<Key, SessionDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, live or not.
    pub fn len(&self) -> usize {
        self.docs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn find_one(&self, filter: &Filter) -> StoreResult<Option<SessionDocument>> {
        let docs = self.docs.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(docs.values().find(|d| filter.matches(d)).cloned())
    }

    fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<SessionDocument>> {
        let docs = self.docs.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut found: Vec<SessionDocument> =
            docs.values().filter(|d| filter.matches(d)).cloned().collect();
        found.sort_by_key(|d| d.expires_at);
        found.truncate(limit);
        Ok(found)
    }

    fn update(&self, filter: &Filter, updates: &[Update]) -> StoreResult<u64> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut matched = 0;
        for doc in docs.values_mut().filter(|d| filter.matches(d)) {
            for update in updates {
                update.apply(doc);
            }
            matched += 1;
        }
        Ok(matched)
    }

    fn insert_or_replace(&self, doc: &SessionDocument) -> StoreResult<()> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::LockPoisoned)?;
        docs.insert(
            (doc.id.clone(), doc.application_scope.clone()),
            doc.clone(),
        );
        Ok(())
    }

    fn delete(&self, filter: &Filter) -> StoreResult<u64> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::LockPoisoned)?;
        let before = docs.len();
        docs.retain(|_, d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }
}
