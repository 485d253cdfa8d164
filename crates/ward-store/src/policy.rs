//! Policy declaration
//!
//! A [`Policy`] is the pair a store is constructed with: a default level and
//! the explicit path levels. Types that describe a store shape declare one
//! through [`StoreSchema`]; a schema that extends another merges the parent's
//! declarations with [`Policy::inherit`] before the store exists.

use crate::error::StoreResult;
use crate::permission::{Permission, PermissionMap};
use crate::value::Record;
use serde::{Deserialize, Serialize};
use ward_config::PolicyConfig;

/// Default level plus explicit path levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub default_policy: Permission,
    #[serde(default)]
    pub permissions: PermissionMap,
}

impl Policy {
    pub fn new(default_policy: Permission) -> Self {
        Self {
            default_policy,
            permissions: PermissionMap::new(),
        }
    }

    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Merge a parent's declarations underneath this policy
    ///
    /// Paths declared here win over the same paths in `parent`. The default
    /// policy of `self` is kept.
    pub fn inherit(mut self, parent: &Policy) -> Self {
        for (path, permission) in parent.permissions.iter() {
            if !self.permissions.contains(path) {
                self.permissions.insert(path, permission);
            }
        }
        self
    }

    /// Effective permission of a normalized path
    pub fn resolve(&self, path: &str) -> Permission {
        self.permissions.resolve(path, self.default_policy)
    }

    /// Build a policy from a configuration table
    pub fn from_config(config: &PolicyConfig) -> StoreResult<Self> {
        let default_policy = match &config.default_policy {
            Some(value) => value.parse()?,
            None => Permission::default(),
        };

        let mut permissions = PermissionMap::new();
        for (path, value) in &config.permissions {
            permissions.insert(crate::path::normalize(path), value.parse()?);
        }

        Ok(Self {
            default_policy,
            permissions,
        })
    }
}

/// Builder for [`Policy`]
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    policy: Policy,
}

impl PolicyBuilder {
    pub fn default_policy(mut self, permission: Permission) -> Self {
        self.policy.default_policy = permission;
        self
    }

    /// Declare `path` with the declaration default, `none`
    pub fn restrict(self, path: &str) -> Self {
        self.restrict_with(path, Permission::None)
    }

    /// Declare `path` with an explicit level
    pub fn restrict_with(mut self, path: &str, permission: Permission) -> Self {
        self.policy
            .permissions
            .insert(crate::path::normalize(path), permission);
        self
    }

    /// Fill in undeclared paths from `parent`
    pub fn inherit(mut self, parent: &Policy) -> Self {
        self.policy = self.policy.inherit(parent);
        self
    }

    pub fn build(self) -> Policy {
        self.policy
    }
}

/// A type that describes the policy and initial fields of a store
///
/// ```
/// use ward_store::{Permission, Policy, Record, Store, StoreSchema, Value};
///
/// struct Account;
///
/// impl StoreSchema for Account {
///     fn policy() -> Policy {
///         Policy::builder()
///             .restrict("password")
///             .restrict_with("id", Permission::ReadOnly)
///             .build()
///     }
///
///     fn fields() -> Record {
///         [("id", Value::from(7)), ("password", Value::from("pw"))]
///             .into_iter()
///             .collect()
///     }
/// }
///
/// let store = Store::from_schema::<Account>();
/// assert!(store.read("password").is_err());
/// assert_eq!(store.read("id").unwrap(), Some(Value::from(7)));
/// ```
pub trait StoreSchema {
    fn policy() -> Policy;

    fn fields() -> Record {
        Record::new()
    }
}
