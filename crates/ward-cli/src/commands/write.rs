//! Write command - write a value and print the resulting entries

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use ward_config::Config;
use ward_store::{AuditLogger, Value};

use crate::mount;

pub fn run(
    config: &Config,
    data: Option<&Path>,
    audit: Option<Arc<dyn AuditLogger>>,
    path: &str,
    raw_value: &str,
) -> Result<()> {
    let mut store = mount::open_store(config, data, audit)?;

    store.write(path, parse_value(raw_value))?;
    tracing::debug!(path, "write applied");

    super::print_json(&serde_json::Value::Object(store.entries().to_json()))
}

/// Parse a command-line value as JSON, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::string(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("37"), Value::from(37));
        assert_eq!(parse_value("\"ada\""), Value::from("ada"));
        assert_eq!(parse_value("ada"), Value::from("ada"));
        assert_eq!(parse_value("[1]"), Value::array(vec![Value::from(1)]));
        assert_eq!(parse_value("null"), Value::Null);
    }
}
