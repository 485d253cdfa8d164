pub mod check;
pub mod entries;
pub mod read;
pub mod write;

use anyhow::Result;
use colored::*;
use ward_store::{AuditEvent, AuditLogger};

/// Pretty-print JSON to stdout
pub fn print_json(json: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(json)?);
    Ok(())
}

/// Print every recorded audit entry to stderr
pub fn print_audit_trail(logger: &dyn AuditLogger) {
    for entry in logger.entries() {
        let line = entry.to_log_line();
        match entry.event {
            AuditEvent::AccessDenied { .. } => eprintln!("{}", line.red()),
            AuditEvent::AccessGranted { .. } => eprintln!("{}", line.dimmed()),
            _ => eprintln!("{}", line),
        }
    }
}
