//! Store assembly
//!
//! Builds the root store from a JSON document and the loaded configuration.
//! Top-level keys named by a `[stores.<key>]` table are mounted as nested
//! stores carrying that table's policy; a mount with no data starts empty.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use ward_config::{Config, PolicyConfig};
use ward_store::{AuditLogger, Policy, Record, Store, Value};

/// Build the store described by `config`, filled from `data`
pub fn open_store(
    config: &Config,
    data: Option<&Path>,
    audit: Option<Arc<dyn AuditLogger>>,
) -> Result<Store> {
    let document = match data {
        Some(path) => read_document(path)?,
        None => Record::new(),
    };

    let mut store = Store::with_policy(root_policy(config)?);
    if let Some(logger) = &audit {
        store.set_audit_logger(Arc::clone(logger));
    }

    let mounts: BTreeMap<&str, &PolicyConfig> = config.nested_policies().collect();
    let empty_mounts: Vec<(&str, &PolicyConfig)> = mounts
        .iter()
        .filter(|(key, _)| !document.contains_key(key))
        .map(|(key, policy)| (*key, *policy))
        .collect();

    for (key, value) in document {
        let value = match mounts.get(key.as_str()) {
            Some(policy) => Value::Store(nested_store(&key, policy, value, audit.as_ref())?),
            None => value,
        };
        store = store.with_field(key, value);
    }

    for (key, policy) in empty_mounts {
        let nested = nested_store(key, policy, Value::Null, audit.as_ref())?;
        store = store.with_field(key, nested);
    }

    tracing::debug!(
        fields = store.len(),
        mounts = mounts.len(),
        default_policy = %store.default_policy(),
        "store assembled"
    );

    Ok(store)
}

/// Root policy from the merged configuration
pub fn root_policy(config: &Config) -> Result<Policy> {
    Policy::from_config(&config.root_policy()).context("Invalid root store policy")
}

/// Policy of the nested store mounted at `key`, if any
pub fn mount_policy(config: &Config, key: &str) -> Result<Option<Policy>> {
    config
        .nested_policies()
        .find(|(mount, _)| *mount == key)
        .map(|(_, policy)| {
            Policy::from_config(policy)
                .with_context(|| format!("Invalid policy for store '{}'", key))
        })
        .transpose()
}

fn nested_store(
    key: &str,
    policy: &PolicyConfig,
    value: Value,
    audit: Option<&Arc<dyn AuditLogger>>,
) -> Result<Store> {
    let policy = Policy::from_config(policy)
        .with_context(|| format!("Invalid policy for store '{}'", key))?;

    let fields = match value {
        Value::Record(record) => record,
        Value::Null => Record::new(),
        other => bail!(
            "Store '{}' must be a JSON object, found {}",
            key,
            other.type_name()
        ),
    };

    let mut store = Store::with_policy(policy).with_fields(fields);
    if let Some(logger) = audit {
        store.set_audit_logger(Arc::clone(logger));
    }
    Ok(store)
}

fn read_document(path: &Path) -> Result<Record> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;

    let json: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("Invalid JSON in data file: {}", path.display()))?;

    match json {
        serde_json::Value::Object(map) => Ok(Record::from(map)),
        _ => bail!("Data file {} must contain a JSON object", path.display()),
    }
}
