//! Ward Configuration System
//!
//! Provides configuration management for ward stores:
//! - Project configuration (ward.toml): root policy, nested store policies, audit
//! - Global user configuration (~/.ward/config.toml)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.ward/config.toml)
//! 2. Project config (./ward.toml)
//! 3. Environment variables (WARD_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use ward_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! let policy = config.root_policy();
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Permission strings accepted anywhere a policy level is configured
pub const PERMISSION_VALUES: [&str; 4] = ["r", "w", "rw", "none"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Validate a permission level string ("r", "w", "rw" or "none")
pub(crate) fn validate_permission_value(field: &str, value: &str) -> ConfigResult<()> {
    if !PERMISSION_VALUES.contains(&value) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be 'r', 'w', 'rw', or 'none', got '{}'", value),
        });
    }
    Ok(())
}

/// Interpret a boolean-ish environment value
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{AuditConfig, PolicyConfig, ProjectConfig, StoreConfig};
