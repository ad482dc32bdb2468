//! Audit sink for store failures.
//!
//! When `write_exceptions_to_event_log` is enabled, the session manager
//! reports every store failure here before returning its opaque error. The
//! event carries the backend detail that the returned error hides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuditError, Operation};

pub const EVENT_SOURCE: &str = "sst";

/// A store failure as recorded in the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub source: String,
    pub operation: String,
    pub message: String,
    pub host: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(operation: Operation, message: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: EVENT_SOURCE.to_string(),
            operation: operation.to_string(),
            message: message.into(),
            host: local_host(),
            occurred_at,
        }
    }
}

fn local_host() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Destination for audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Emits audit events as structured `tracing` events on the `sst::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        tracing::error!(
            target: "sst::audit",
            event_id = %event.id,
            source = %event.source,
            operation = %event.operation,
            host = %event.host,
            occurred_at = %event.occurred_at,
            "An exception occurred communicating with the data source: {}",
            event.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_fields() {
        let now = Utc::now();
        let event = AuditEvent::new(Operation::Release, "disk I/O error", now);

        assert_eq!(event.source, "sst");
        assert_eq!(event.operation, "release");
        assert_eq!(event.message, "disk I/O error");
        assert_eq!(event.occurred_at, now);
        assert!(Uuid::parse_str(&event.id).is_ok());
        assert!(!event.host.is_empty());
    }

    #[test]
    fn test_tracing_sink_never_fails() {
        let event = AuditEvent::new(Operation::Delete, "boom", Utc::now());
        assert!(TracingAuditSink.record(&event).is_ok());
    }

    #[test]
    fn test_audit_event_serializes() {
        let event = AuditEvent::new(Operation::Sweep, "boom", Utc::now());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"operation\":\"sweep\""));
    }
}
