//! Read command - print the value stored at a path

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use ward_config::Config;
use ward_store::AuditLogger;

use crate::mount;

pub fn run(
    config: &Config,
    data: Option<&Path>,
    audit: Option<Arc<dyn AuditLogger>>,
    path: &str,
) -> Result<()> {
    let store = mount::open_store(config, data, audit)?;

    match store.read(path)? {
        Some(value) => super::print_json(&value.to_json())?,
        None => println!("undefined"),
    }

    Ok(())
}
