//! Port for the structured decision log.
//!
//! Defines the [`AuditLog`] trait for recording committed decisions
//! (relationships formed or dissolved, submissions decided, level roles
//! synced) in a machine-readable format (JSONL).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port keeps the durable record of
//! who decided what.

use serde_json::Value;

/// A structured audit record.
pub struct AuditEntry {
    /// Record type identifier (e.g., "relationship_formed", "submission_decided").
    pub event_type: &'static str,
    /// JSON payload with record-specific data.
    pub payload: Value,
}

impl AuditEntry {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording committed decisions.
///
/// The `record` method is synchronous and non-fallible so it never disrupts
/// a workflow; write failures are the adapter's to report.
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl AuditLog for NoAuditLog {
    fn record(&self, _entry: AuditEntry) {}
}
