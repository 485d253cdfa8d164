//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{PolicyConfig, ProjectConfig, StoreConfig};
use crate::{parse_flag, validate_permission_value, ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "ward.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.ward/config.toml) - lowest priority
/// 2. Project config (./ward.toml) - overrides global
/// 3. Environment variables (WARD_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where ward.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader that reads global configuration from `path`
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ward.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        let global_config = self.load_global_config()?;

        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config), or the default config with no
    /// root when the filesystem root is reached without a ward.toml
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration from ~/.ward/config.toml
    ///
    /// A missing file (or home directory) yields the defaults; a file that
    /// exists must parse and validate.
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => {
                let path = match GlobalConfig::global_config_path() {
                    Ok(path) => path,
                    Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                    Err(e) => return Err(e),
                };
                self.global_config_path = Some(path.clone());
                path
            }
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    /// Apply environment variable overrides to project config
    ///
    /// - WARD_DEFAULT_POLICY=r|w|rw|none
    /// - WARD_AUDIT=true|false
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(policy) = env::var("WARD_DEFAULT_POLICY") {
            validate_permission_value("WARD_DEFAULT_POLICY", &policy)?;
            config
                .store
                .get_or_insert_with(StoreConfig::default)
                .default_policy = Some(policy);
        }

        if let Ok(audit) = env::var("WARD_AUDIT") {
            config.audit.get_or_insert_with(Default::default).enabled = Some(parse_flag(&audit));
        }

        Ok(config)
    }

    /// Get the global configuration directory (~/.ward)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ward"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective root policy (project > global > unset)
    pub fn root_policy(&self) -> PolicyConfig {
        let mut policy = self.project.root_policy();
        if policy.default_policy.is_none() {
            policy.default_policy = self.global.default_policy().map(str::to_string);
        }
        policy
    }

    /// Policies for nested stores, keyed by the top-level field they mount at
    pub fn nested_policies(&self) -> impl Iterator<Item = (&str, &PolicyConfig)> {
        self.project
            .stores
            .iter()
            .map(|(key, policy)| (key.as_str(), policy))
    }

    /// Whether access auditing is enabled (project > global > off)
    pub fn audit_enabled(&self) -> bool {
        self.project
            .audit_enabled()
            .or_else(|| self.global.audit_enabled())
            .unwrap_or(false)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a ward.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
