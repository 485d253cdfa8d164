//! Project Configuration (ward.toml)
//!
//! Handles the policy declared for a store tree in `ward.toml`.

use crate::{validate_permission_value, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Project configuration from ward.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Root store settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    /// Explicit dotted-path permissions for the root store
    #[serde(default)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub permissions: HashMap<String, String>,

    /// Nested stores mounted at top-level keys, each with its own policy
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub stores: BTreeMap<String, PolicyConfig>,

    /// Access audit settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditConfig>,
}

/// Root store settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Fallback permission when no path prefix is declared (default: "rw")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_policy: Option<String>,
}

/// A complete policy declaration: default level plus explicit path levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Fallback permission (default: "rw")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_policy: Option<String>,

    /// Dotted path -> permission level
    #[serde(default)]
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub permissions: HashMap<String, String>,
}

/// Access audit settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Record every permission decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(policy) = self.default_policy() {
            validate_permission_value("store.default_policy", policy)?;
        }

        for (path, value) in &self.permissions {
            validate_permission_value(&format!("permissions.\"{}\"", path), value)?;
        }

        for (key, policy) in &self.stores {
            if key.contains('.') || key.contains(':') {
                return Err(ConfigError::InvalidValue {
                    field: format!("stores.{}", key),
                    reason: "nested stores mount at a single top-level key".to_string(),
                });
            }
            policy.validate(&format!("stores.{}", key))?;
        }

        Ok(())
    }

    /// Get the root default policy, if declared
    pub fn default_policy(&self) -> Option<&str> {
        self.store
            .as_ref()
            .and_then(|s| s.default_policy.as_deref())
    }

    /// Whether access auditing is requested, if declared
    pub fn audit_enabled(&self) -> Option<bool> {
        self.audit.as_ref().and_then(|a| a.enabled)
    }

    /// The root store policy as a single declaration
    pub fn root_policy(&self) -> PolicyConfig {
        PolicyConfig {
            default_policy: self.default_policy().map(str::to_string),
            permissions: self.permissions.clone(),
        }
    }
}

impl PolicyConfig {
    /// Validate every permission level in this declaration
    pub fn validate(&self, section: &str) -> ConfigResult<()> {
        if let Some(policy) = &self.default_policy {
            validate_permission_value(&format!("{}.default_policy", section), policy)?;
        }
        for (path, value) in &self.permissions {
            validate_permission_value(&format!("{}.permissions.\"{}\"", section, path), value)?;
        }
        Ok(())
    }
}
