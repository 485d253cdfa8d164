//! Store errors

use crate::permission::Capability;
use thiserror::Error;

/// Errors produced by store operations
///
/// `PermissionDenied` is the only error an access operation can return.
/// A permitted path that holds no value is `Ok(None)`, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Permission denied: cannot {capability} {path}")]
    PermissionDenied { path: String, capability: Capability },

    #[error("Invalid permission '{value}': expected 'r', 'w', 'rw', or 'none'")]
    InvalidPermission { value: String },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// The offending path, for access errors
    pub fn path(&self) -> Option<&str> {
        match self {
            StoreError::PermissionDenied { path, .. } => Some(path),
            StoreError::InvalidPermission { .. } => None,
        }
    }

    /// The capability that was refused, for access errors
    pub fn capability(&self) -> Option<Capability> {
        match self {
            StoreError::PermissionDenied { capability, .. } => Some(*capability),
            StoreError::InvalidPermission { .. } => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied { .. })
    }

    /// Re-root an error raised by a nested store under the path it is mounted at
    pub(crate) fn nested_under(self, prefix: &str) -> Self {
        match self {
            StoreError::PermissionDenied { path, capability } if !prefix.is_empty() => {
                StoreError::PermissionDenied {
                    path: format!("{}.{}", prefix, path),
                    capability,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_display() {
        let err = StoreError::PermissionDenied {
            path: "profile.secret".to_string(),
            capability: Capability::Read,
        };
        insta::assert_snapshot!(err.to_string(), @"Permission denied: cannot read profile.secret");

        let err = StoreError::PermissionDenied {
            path: "name".to_string(),
            capability: Capability::Write,
        };
        insta::assert_snapshot!(err.to_string(), @"Permission denied: cannot write name");
    }

    #[test]
    fn test_nested_under_prefixes_path() {
        let err = StoreError::PermissionDenied {
            path: "email".to_string(),
            capability: Capability::Read,
        }
        .nested_under("account.profile");

        assert_eq!(err.path(), Some("account.profile.email"));
        assert_eq!(err.capability(), Some(Capability::Read));
    }

    #[test]
    fn test_invalid_permission_has_no_path() {
        let err = StoreError::InvalidPermission {
            value: "x".to_string(),
        };
        assert!(!err.is_permission_denied());
        assert_eq!(err.path(), None);
        assert_eq!(err.clone().nested_under("a"), err);
    }
}
