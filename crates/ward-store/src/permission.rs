//! Permission levels and most-specific-prefix resolution
//!
//! A store keeps a sparse map of dotted paths to permission levels. The
//! effective level of any path is the level of the longest declared prefix
//! of that path (on segment boundaries), or the store's default policy when
//! no prefix is declared.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Capability requested by an access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Read => write!(f, "read"),
            Capability::Write => write!(f, "write"),
        }
    }
}

/// Access level for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Permission {
    /// `"r"`
    #[serde(rename = "r")]
    ReadOnly,
    /// `"w"`
    #[serde(rename = "w")]
    WriteOnly,
    /// `"rw"`
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,
    /// `"none"`
    #[serde(rename = "none")]
    None,
}

impl Permission {
    /// Check if this level grants the requested capability
    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Read => matches!(self, Permission::ReadOnly | Permission::ReadWrite),
            Capability::Write => matches!(self, Permission::WriteOnly | Permission::ReadWrite),
        }
    }

    pub fn can_read(self) -> bool {
        self.allows(Capability::Read)
    }

    pub fn can_write(self) -> bool {
        self.allows(Capability::Write)
    }

    /// Short form used in declarations and configuration
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ReadOnly => "r",
            Permission::WriteOnly => "w",
            Permission::ReadWrite => "rw",
            Permission::None => "none",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Permission::ReadOnly),
            "w" => Ok(Permission::WriteOnly),
            "rw" => Ok(Permission::ReadWrite),
            "none" => Ok(Permission::None),
            other => Err(StoreError::InvalidPermission {
                value: other.to_string(),
            }),
        }
    }
}

/// Sparse dotted-path -> permission overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap {
    entries: HashMap<String, Permission>,
}

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare or overwrite the level for an exact path
    pub fn insert(&mut self, path: impl Into<String>, permission: Permission) {
        self.entries.insert(path.into(), permission);
    }

    pub fn get(&self, path: &str) -> Option<Permission> {
        self.entries.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Permission)> {
        self.entries.iter().map(|(path, p)| (path.as_str(), *p))
    }

    /// Effective permission for `path` (see [`resolve`])
    pub fn resolve(&self, path: &str, default_policy: Permission) -> Permission {
        resolve(path, self, default_policy)
    }
}

impl<K: Into<String>> FromIterator<(K, Permission)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (K, Permission)>>(iter: I) -> Self {
        let mut map = PermissionMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>> Extend<(K, Permission)> for PermissionMap {
    fn extend<I: IntoIterator<Item = (K, Permission)>>(&mut self, iter: I) {
        for (path, permission) in iter {
            self.insert(path, permission);
        }
    }
}

/// Resolve the effective permission of a dotted path
///
/// Tries `path` itself, then every shorter prefix ending on a `.` boundary,
/// longest first. The first declared prefix wins; if none is declared the
/// default policy applies. For `a.b.c` the candidates are `a.b.c`, `a.b`, `a`.
pub fn resolve(path: &str, permissions: &PermissionMap, default_policy: Permission) -> Permission {
    if permissions.is_empty() {
        return default_policy;
    }

    let prefixes =
        std::iter::once(path).chain(path.rmatch_indices('.').map(|(idx, _)| &path[..idx]));

    for prefix in prefixes {
        if let Some(permission) = permissions.get(prefix) {
            tracing::trace!(path, prefix, %permission, "resolved declared permission");
            return permission;
        }
    }

    default_policy
}
