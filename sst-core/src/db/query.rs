//! SQL rendering for document filters and updates.

use rusqlite::types::Value;

use crate::store::{Filter, Predicate, Update};

/// Column list shared by every SELECT and INSERT.
pub(crate) const COLUMNS: &str = "id, application_scope, created_at, expires_at, locked_at, \
     lock_token, timeout_minutes, is_locked, payload, action_flags";

/// Accumulates positional parameters while SQL fragments are rendered.
#[derive(Debug, Default)]
pub(crate) struct Params {
    values: Vec<Value>,
}

impl Params {
    pub fn bind(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("?{}", self.values.len())
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `WHERE`-clause body for a filter; `1 = 1` when it has no conditions.
    pub fn where_clause(&mut self, filter: &Filter) -> String {
        let mut clauses = Vec::new();

        if let Some(id) = &filter.id {
            clauses.push(format!("id = {}", self.bind(Value::Text(id.clone()))));
        }
        if let Some(scope) = &filter.application_scope {
            clauses.push(format!(
                "application_scope = {}",
                self.bind(Value::Text(scope.clone()))
            ));
        }
        for predicate in &filter.predicates {
            let clause = match predicate {
                Predicate::IsLocked(v) => {
                    format!("is_locked = {}", self.bind(Value::Integer(i64::from(*v))))
                }
                Predicate::LockToken(v) => format!("lock_token = {}", self.bind(Value::Integer(*v))),
                Predicate::ExpiresAfter(t) => format!(
                    "expires_at > {}",
                    self.bind(Value::Integer(t.timestamp_millis()))
                ),
                Predicate::ExpiresBefore(t) => format!(
                    "expires_at < {}",
                    self.bind(Value::Integer(t.timestamp_millis()))
                ),
                Predicate::ExpiredAsOf(t) => format!(
                    "expires_at <= {}",
                    self.bind(Value::Integer(t.timestamp_millis()))
                ),
            };
            clauses.push(clause);
        }

        if clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            clauses.join(" AND ")
        }
    }

    /// `SET`-clause body for a list of updates.
    pub fn set_clause(&mut self, updates: &[Update]) -> String {
        updates
            .iter()
            .map(|update| match update {
                Update::IsLocked(v) => {
                    format!("is_locked = {}", self.bind(Value::Integer(i64::from(*v))))
                }
                Update::LockedAt(t) => format!(
                    "locked_at = {}",
                    self.bind(Value::Integer(t.timestamp_millis()))
                ),
                Update::ExpiresAt(t) => format!(
                    "expires_at = {}",
                    self.bind(Value::Integer(t.timestamp_millis()))
                ),
                Update::LockToken(v) => format!("lock_token = {}", self.bind(Value::Integer(*v))),
                Update::TimeoutMinutes(v) => format!(
                    "timeout_minutes = {}",
                    self.bind(Value::Integer(i64::from(*v)))
                ),
                Update::Payload(v) => format!("payload = {}", self.bind(Value::Text(v.clone()))),
                Update::ActionFlags(v) => format!(
                    "action_flags = {}",
                    self.bind(Value::Integer(i64::from(v.bits())))
                ),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_where_clause_numbering() {
        let t = DateTime::from_timestamp_millis(42).unwrap();
        let filter = Filter::session("s1", "/app").locked(false).expires_after(t);

        let mut params = Params::default();
        let sql = params.where_clause(&filter);

        assert_eq!(
            sql,
            "id = ?1 AND application_scope = ?2 AND is_locked = ?3 AND expires_at > ?4"
        );
        assert_eq!(params.values().len(), 4);
        assert_eq!(params.values()[3], Value::Integer(42));
    }

    #[test]
    fn test_empty_filter() {
        let mut params = Params::default();
        assert_eq!(params.where_clause(&Filter::all()), "1 = 1");
        assert!(params.values().is_empty());
    }

    #[test]
    fn test_set_then_where_share_numbering() {
        let mut params = Params::default();
        let set = params.set_clause(&[Update::IsLocked(false), Update::LockToken(3)]);
        let filter = params.where_clause(&Filter::session("s1", "/app").lock_token(2));

        assert_eq!(set, "is_locked = ?1, lock_token = ?2");
        assert_eq!(
            filter,
            "id = ?3 AND application_scope = ?4 AND lock_token = ?5"
        );
    }
}
