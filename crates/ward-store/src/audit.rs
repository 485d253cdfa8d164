//! Access audit logging
//!
//! Records permission decisions taken by a store. Stores log to a
//! [`NullAuditLogger`] unless one is attached, so auditing costs nothing by
//! default.

use crate::permission::{Capability, Permission};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Audit event types
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// A read or write was allowed
    AccessGranted {
        path: String,
        capability: Capability,
        permission: Permission,
    },
    /// A read or write was refused
    AccessDenied {
        path: String,
        capability: Capability,
        permission: Permission,
    },
    /// An explicit path permission was added or replaced
    PolicyGranted { path: String, permission: Permission },
    /// The fallback permission was replaced
    DefaultPolicyChanged { permission: Permission },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::AccessGranted {
                path,
                capability,
                permission,
            } => write!(f, "GRANTED {} {} ({})", capability, path, permission),
            AuditEvent::AccessDenied {
                path,
                capability,
                permission,
            } => write!(f, "DENIED {} {} ({})", capability, path, permission),
            AuditEvent::PolicyGranted { path, permission } => {
                write!(f, "Policy: {} = {}", path, permission)
            }
            AuditEvent::DefaultPolicyChanged { permission } => {
                write!(f, "Policy: default = {}", permission)
            }
        }
    }
}

/// Audit log entry with timestamp
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

impl AuditEntry {
    /// Create a new audit entry stamped with the current time
    pub fn new(event: AuditEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Format as log line
    pub fn to_log_line(&self) -> String {
        format!("[{}] {}", self.timestamp.to_rfc3339(), self.event)
    }
}

/// Audit logger trait for customizable logging backends
pub trait AuditLogger: Send + Sync {
    /// Log an audit event
    fn log(&self, event: AuditEvent);

    /// Get all logged entries
    fn entries(&self) -> Vec<AuditEntry>;

    /// Clear all logged entries
    fn clear(&self);
}

/// In-memory audit logger
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLogger {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuditLogger for MemoryAuditLogger {
    fn log(&self, event: AuditEvent) {
        self.lock().push(AuditEntry::new(event));
    }

    fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// Null audit logger (no-op)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLogger;

impl NullAuditLogger {
    pub fn new() -> Self {
        Self
    }
}

impl AuditLogger for NullAuditLogger {
    fn log(&self, _event: AuditEvent) {}

    fn entries(&self) -> Vec<AuditEntry> {
        Vec::new()
    }

    fn clear(&self) {}
}
