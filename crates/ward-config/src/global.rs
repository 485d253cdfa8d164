//! Global Configuration (~/.ward/config.toml)
//!
//! Handles user-level configuration stored in `~/.ward/config.toml`.

use crate::project::AuditConfig;
use crate::{validate_permission_value, ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.ward/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Audit defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditConfig>,
}

/// Default settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Default policy for stores whose project does not declare one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_policy: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from a file
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

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(policy) = self.default_policy() {
            validate_permission_value("defaults.default_policy", policy)?;
        }
        Ok(())
    }

    /// Get the global config file path (~/.ward/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ward").join("config.toml"))
    }

    /// Get the default policy
    pub fn default_policy(&self) -> Option<&str> {
        self.defaults
            .as_ref()
            .and_then(|d| d.default_policy.as_deref())
    }

    /// Get the audit default
    pub fn audit_enabled(&self) -> Option<bool> {
        self.audit.as_ref().and_then(|a| a.enabled)
    }
}
