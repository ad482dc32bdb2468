//! SQLite-backed document store.
//!
//! Session documents live in one table per collection inside a database file
//! attached under the configured database name:
//!
//! ```text
//! "<database>"."<collection>"        session documents, keyed by (id, application_scope)
//! "<database>"."<collection>_audit"  audit events (when used as an AuditSink)
//! ```
//!
//! Each conditional update is a single `UPDATE … WHERE …` statement, so the
//! filter check and the write are atomic. Several processes may open the same
//! file; SQLite's file locking serializes their writes and the busy timeout
//! bounds how long a writer waits.

mod query;

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::audit::{AuditEvent, AuditSink};
use crate::config::{ConnectionTarget, StoreConfig, WriteConcern};
use crate::error::{AuditError, Error, Result, StoreError, StoreResult};
use crate::store::{DocumentStore, Filter, Update};
use crate::types::{ActionFlags, SessionDocument};
use query::{COLUMNS, Params};

/// Database connection wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct Database {
    conn: Mutex<Connection>,
    target: ConnectionTarget,
    write_concern: WriteConcern,
    /// Quoted, schema-qualified session table
    table: String,
    /// Quoted, schema-qualified audit table
    audit_table: String,
}

impl Database {
    /// Open the store described by `config`, creating the collection if needed.
    ///
    /// A missing connection string or an invalid name is a configuration error;
    /// any SQLite failure here is returned as [`Error::Open`].
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let target = config.target()?;

        let db = Self::connect(config, target).map_err(Error::Open)?;
        db.ensure_schema(&config.database, &config.collection)
            .map_err(Error::Open)?;

        tracing::debug!(
            database = %config.database,
            collection = %config.collection,
            write_concern = %config.write_concern,
            "session store opened"
        );
        Ok(db)
    }

    fn connect(config: &StoreConfig, target: ConnectionTarget) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        let schema = quote_ident(&config.database);
        match &target {
            ConnectionTarget::Memory => {
                conn.execute(&format!("ATTACH DATABASE ':memory:' AS {schema}"), [])?;
            }
            ConnectionTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                conn.execute(
                    &format!("ATTACH DATABASE ?1 AS {schema}"),
                    params![path.to_string_lossy()],
                )?;
                conn.execute_batch(&format!("PRAGMA {schema}.journal_mode=WAL;"))?;
            }
        }
        conn.execute_batch(&format!(
            "PRAGMA {schema}.synchronous={};",
            synchronous_level(config.write_concern)
        ))?;

        Ok(Self {
            conn: Mutex::new(conn),
            target,
            write_concern: config.write_concern,
            table: format!("{schema}.{}", quote_ident(&config.collection)),
            audit_table: format!(
                "{schema}.{}",
                quote_ident(&format!("{}_audit", config.collection))
            ),
        })
    }

    fn ensure_schema(&self, database: &str, collection: &str) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let index = format!(
            "{}.{}",
            quote_ident(database),
            quote_ident(&format!("{collection}_expires_at"))
        );
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT NOT NULL,
                application_scope TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                locked_at INTEGER NOT NULL,
                lock_token INTEGER NOT NULL DEFAULT 0,
                timeout_minutes INTEGER NOT NULL,
                is_locked INTEGER NOT NULL DEFAULT 0,
                payload TEXT NOT NULL DEFAULT '',
                action_flags INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (id, application_scope)
             );
             CREATE INDEX IF NOT EXISTS {index} ON {collection_name} (expires_at);
             CREATE TABLE IF NOT EXISTS {audit} (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                operation TEXT NOT NULL,
                message TEXT NOT NULL,
                host TEXT NOT NULL,
                occurred_at INTEGER NOT NULL
             );",
            table = self.table,
            collection_name = quote_ident(collection),
            audit = self.audit_table,
        ))?;
        Ok(())
    }

    /// Check database connectivity
    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.query_row(&format!("SELECT COUNT(*) FROM {} LIMIT 1", self.table), [], |_| Ok(()))?;
        Ok(())
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn write_concern(&self) -> WriteConcern {
        self.write_concern
    }

    /// Count matching documents
    pub fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut params = Params::default();
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.table,
            params.where_clause(filter)
        );
        let count: i64 = conn.query_row(&sql, params_from_iter(params.values()), |row| row.get(0))?;
        Ok(count as u64)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Log Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Most recent audit events, newest first
    pub fn recent_audit_events(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, source, operation, message, host, occurred_at
             FROM {} ORDER BY occurred_at DESC LIMIT ?1",
            self.audit_table
        ))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, source, operation, message, host, occurred_at)| -> StoreResult<AuditEvent> {
                let occurred_at = from_millis(occurred_at).ok_or_else(|| {
                    StoreError::corrupt(&id, "occurred_at out of range")
                })?;
                Ok(AuditEvent {
                    id,
                    source,
                    operation,
                    message,
                    host,
                    occurred_at,
                })
            })
            .collect()
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<RawDocument> {
        Ok(RawDocument {
            id: row.get(0)?,
            application_scope: row.get(1)?,
            created_at: row.get(2)?,
            expires_at: row.get(3)?,
            locked_at: row.get(4)?,
            lock_token: row.get(5)?,
            timeout_minutes: row.get(6)?,
            is_locked: row.get(7)?,
            payload: row.get(8)?,
            action_flags: row.get(9)?,
        })
    }
}

impl DocumentStore for Database {
    fn find_one(&self, filter: &Filter) -> StoreResult<Option<SessionDocument>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut params = Params::default();
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE {} LIMIT 1",
            self.table,
            params.where_clause(filter)
        );
        let mut stmt = conn.prepare(&sql)?;

        stmt.query_row(params_from_iter(params.values()), Self::map_row)
            .optional()?
            .map(RawDocument::into_document)
            .transpose()
    }

    fn find(&self, filter: &Filter, limit: usize) -> StoreResult<Vec<SessionDocument>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut params = Params::default();
        let where_clause = params.where_clause(filter);
        let limit = params.bind(Value::Integer(limit as i64));
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE {where_clause} ORDER BY expires_at LIMIT {limit}",
            self.table
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params_from_iter(params.values()), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawDocument::into_document).collect()
    }

    fn update(&self, filter: &Filter, updates: &[Update]) -> StoreResult<u64> {
        if updates.is_empty() {
            return self.count(filter);
        }

        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut params = Params::default();
        let set_clause = params.set_clause(updates);
        let where_clause = params.where_clause(filter);
        let changed = conn.execute(
            &format!("UPDATE {} SET {set_clause} WHERE {where_clause}", self.table),
            params_from_iter(params.values()),
        )?;
        Ok(changed as u64)
    }

    fn insert_or_replace(&self, doc: &SessionDocument) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                self.table
            ),
            params![
                doc.id,
                doc.application_scope,
                doc.created_at.timestamp_millis(),
                doc.expires_at.timestamp_millis(),
                doc.locked_at.timestamp_millis(),
                doc.lock_token,
                doc.timeout_minutes,
                doc.is_locked,
                doc.payload,
                doc.action_flags.bits(),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, filter: &Filter) -> StoreResult<u64> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut params = Params::default();
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.table,
            params.where_clause(filter)
        );
        let removed = conn.execute(&sql, params_from_iter(params.values()))?;
        Ok(removed as u64)
    }
}

impl AuditSink for Database {
    fn record(&self, event: &AuditEvent) -> std::result::Result<(), AuditError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, source, operation, message, host, occurred_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                self.audit_table
            ),
            params![
                event.id,
                event.source,
                event.operation,
                event.message,
                event.host,
                event.occurred_at.timestamp_millis(),
            ],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }
}

/// Row as read from SQLite, before range checks.
struct RawDocument {
    id: String,
    application_scope: String,
    created_at: i64,
    expires_at: i64,
    locked_at: i64,
    lock_token: i64,
    timeout_minutes: i64,
    is_locked: bool,
    payload: String,
    action_flags: i32,
}

impl RawDocument {
    fn into_document(self) -> StoreResult<SessionDocument> {
        let timestamp = |field: &str, ms: i64| {
            from_millis(ms).ok_or_else(|| StoreError::corrupt(&self.id, format!("{field} out of range")))
        };
        let created_at = timestamp("created_at", self.created_at)?;
        let expires_at = timestamp("expires_at", self.expires_at)?;
        let locked_at = timestamp("locked_at", self.locked_at)?;
        let timeout_minutes = u32::try_from(self.timeout_minutes)
            .map_err(|_| StoreError::corrupt(&self.id, "timeout_minutes out of range"))?;

        Ok(SessionDocument {
            id: self.id,
            application_scope: self.application_scope,
            created_at,
            expires_at,
            locked_at,
            lock_token: self.lock_token,
            timeout_minutes,
            is_locked: self.is_locked,
            payload: self.payload,
            action_flags: ActionFlags::from_bits(self.action_flags),
        })
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn synchronous_level(write_concern: WriteConcern) -> &'static str {
    match write_concern {
        WriteConcern::Unacknowledged => "OFF",
        WriteConcern::Acknowledged(0 | 1) => "NORMAL",
        WriteConcern::Acknowledged(_) => "FULL",
    }
}
