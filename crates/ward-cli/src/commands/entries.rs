//! Entries command - print every readable entry

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use ward_config::Config;
use ward_store::AuditLogger;

use crate::mount;

pub fn run(config: &Config, data: Option<&Path>, audit: Option<Arc<dyn AuditLogger>>) -> Result<()> {
    let store = mount::open_store(config, data, audit)?;
    super::print_json(&serde_json::Value::Object(store.entries().to_json()))
}
