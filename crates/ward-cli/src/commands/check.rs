//! Check command - report the effective permission of a path

use anyhow::Result;
use colored::*;
use ward_config::Config;
use ward_store::{path, Permission, Store};

use crate::mount;

/// Print the level each store on the path grants and the combined access
pub fn run(config: &Config, raw_path: &str) -> Result<()> {
    let path = path::normalize(raw_path).into_owned();
    let levels = effective_levels(config, &path)?;

    let readable = levels.iter().all(|(_, p)| p.can_read());
    let writable = levels.iter().all(|(_, p)| p.can_write());

    println!("{}", path.bold());
    for (scope, permission) in &levels {
        println!("  {:<12} {}", format!("{}:", scope), permission);
    }
    println!("  {:<12} {}", "read:", yes_no(readable));
    println!("  {:<12} {}", "write:", yes_no(writable));

    Ok(())
}

/// Levels from the root store and, below a mount, from the nested store
fn effective_levels(config: &Config, path: &str) -> Result<Vec<(String, Permission)>> {
    let root = Store::with_policy(mount::root_policy(config)?);
    let mut levels = vec![("store".to_string(), root.permission_for(path))];

    if let Some((mount_key, rest)) = path.split_once(path::SEPARATOR) {
        if let Some(policy) = mount::mount_policy(config, mount_key)? {
            let nested = Store::with_policy(policy);
            levels.push((mount_key.to_string(), nested.permission_for(rest)));
        }
    }

    Ok(levels)
}

fn yes_no(allowed: bool) -> ColoredString {
    if allowed {
        "yes".green()
    } else {
        "no".red()
    }
}
