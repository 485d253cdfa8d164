//! Permission-gated store
//!
//! A [`Store`] is a tree of named [`Value`]s guarded by a [`Policy`]. Every
//! read and write is checked against the effective permission of its whole
//! path before any data is touched. Nested stores are checked again against
//! their own policy once an access crosses into them.

use crate::audit::{AuditEvent, AuditLogger, NullAuditLogger};
use crate::error::{StoreError, StoreResult};
use crate::path;
use crate::permission::{Capability, Permission, PermissionMap};
use crate::policy::{Policy, StoreSchema};
use crate::value::{Producer, Record, Value};
use std::fmt;
use std::sync::Arc;

/// Most null slots a single write may pad an array with. An index further
/// past the end addresses a record field instead.
const MAX_INDEX_GAP: usize = 1024;

/// Hierarchical key/value store with per-path permissions
///
/// Cloning is cheap: fields are shared copy-on-write, so a clone diverges
/// from the original on its first write.
#[derive(Clone)]
pub struct Store {
    default_policy: Permission,
    permissions: PermissionMap,
    fields: Record,
    audit_logger: Arc<dyn AuditLogger>,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_policy(Policy::default())
    }
}

impl Store {
    /// Create an empty store with the `rw` default policy and no explicit paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store governed by `policy`
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            default_policy: policy.default_policy,
            permissions: policy.permissions,
            fields: Record::new(),
            audit_logger: Arc::new(NullAuditLogger::new()),
        }
    }

    /// Create a store from a type's declared policy and initial fields
    pub fn from_schema<S: StoreSchema>() -> Self {
        Self::with_policy(S::policy()).with_fields(S::fields())
    }

    /// Set an initial field. Construction is not permission-checked.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    /// Set several initial fields. Construction is not permission-checked.
    pub fn with_fields(mut self, fields: Record) -> Self {
        for (name, value) in fields {
            self.fields.insert(name, value);
        }
        self
    }

    /// Attach an audit logger
    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = logger;
        self
    }

    pub fn set_audit_logger(&mut self, logger: Arc<dyn AuditLogger>) {
        self.audit_logger = logger;
    }

    pub fn audit_logger(&self) -> Arc<dyn AuditLogger> {
        Arc::clone(&self.audit_logger)
    }

    // Policy

    pub fn default_policy(&self) -> Permission {
        self.default_policy
    }

    /// Replace the fallback permission
    pub fn set_default_policy(&mut self, permission: Permission) {
        self.default_policy = permission;
        self.audit_logger
            .log(AuditEvent::DefaultPolicyChanged { permission });
    }

    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    /// Current policy (default plus explicit paths)
    pub fn policy(&self) -> Policy {
        Policy {
            default_policy: self.default_policy,
            permissions: self.permissions.clone(),
        }
    }

    /// Declare the permission of an exact path, replacing any previous
    /// declaration for it. Declarations are never removed.
    pub fn grant(&mut self, path: &str, permission: Permission) {
        let path = path::normalize(path).into_owned();
        self.audit_logger.log(AuditEvent::PolicyGranted {
            path: path.clone(),
            permission,
        });
        self.permissions.insert(path, permission);
    }

    /// Declare several path permissions at once
    pub fn extend_permissions<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, Permission)>,
        K: AsRef<str>,
    {
        for (path, permission) in entries {
            self.grant(path.as_ref(), permission);
        }
    }

    /// Effective permission of `path` under this store's policy
    ///
    /// Paths starting at a metadata field name resolve to `none`.
    pub fn permission_for(&self, path: &str) -> Permission {
        let path = path::normalize(path);
        if path::targets_metadata(&path) {
            return Permission::None;
        }
        self.permissions.resolve(&path, self.default_policy)
    }

    pub fn allowed_to_read(&self, path: &str) -> bool {
        self.permission_for(path).can_read()
    }

    pub fn allowed_to_write(&self, path: &str) -> bool {
        self.permission_for(path).can_write()
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Unchecked field access for enumeration
    pub(crate) fn fields(&self) -> &Record {
        &self.fields
    }

    // Access

    /// Read the value at `path`
    ///
    /// The permission check covers the whole path in a single decision.
    /// Descending, a producer met before the final segment is invoked and
    /// its result indexed; a producer at the final segment is returned as
    /// is. Descending into a nested store hands the rest of the path to that
    /// store's own `read`.
    ///
    /// Returns `Ok(None)` when nothing is stored at a readable path.
    pub fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        let path = path::normalize(path);
        self.check(&path, Capability::Read)?;
        self.lookup(&path::segments(&path))
    }

    fn lookup(&self, segments: &[&str]) -> StoreResult<Option<Value>> {
        let Some(mut current) = self.fields.get(segments[0]).cloned() else {
            return Ok(None);
        };

        for depth in 1..segments.len() {
            if let Some(produced) = current.as_producer().map(Producer::produce) {
                current = produced;
            }

            let next = match &current {
                Value::Store(nested) => {
                    let remainder = segments[depth..].join(".");
                    tracing::trace!(at = %segments[..depth].join("."), %remainder, "descending into nested store");
                    return nested
                        .read(&remainder)
                        .map_err(|err| err.nested_under(&segments[..depth].join(".")));
                }
                other => other.child(segments[depth]).cloned(),
            };

            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// Write `value` at `path`, returning the value written
    ///
    /// Missing intermediates are created (an array when the next segment is
    /// a decimal index, a record otherwise); intermediates that cannot hold
    /// fields, producers included, are replaced. Producers are never invoked.
    /// Writing across a nested store goes through that store's own `write`,
    /// which checks before anything is modified.
    pub fn write(&mut self, path: &str, value: impl Into<Value>) -> StoreResult<Value> {
        let path = path::normalize(path);
        self.check(&path, Capability::Write)?;

        let value = value.into();
        assign_in_record(&mut self.fields, &path::segments(&path), 0, value.clone())?;
        Ok(value)
    }

    /// Write several entries in order
    ///
    /// Stops at the first refused key and returns its error. Entries written
    /// before it stay written.
    pub fn write_entries<I, K, V>(&mut self, entries: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.write(key.as_ref(), value)?;
        }
        Ok(())
    }

    fn check(&self, path: &str, capability: Capability) -> StoreResult<()> {
        let permission = self.permission_for(path);

        if permission.allows(capability) {
            tracing::trace!(path, %capability, %permission, "access granted");
            self.audit_logger.log(AuditEvent::AccessGranted {
                path: path.to_string(),
                capability,
                permission,
            });
            Ok(())
        } else {
            tracing::debug!(path, %capability, %permission, "access denied");
            self.audit_logger.log(AuditEvent::AccessDenied {
                path: path.to_string(),
                capability,
                permission,
            });
            Err(StoreError::PermissionDenied {
                path: path.to_string(),
                capability,
            })
        }
    }
}

/// Array position `segment` addresses in an array of `len` elements
fn array_slot(segment: &str, len: usize) -> Option<usize> {
    path::index(segment).filter(|&index| index <= len.saturating_add(MAX_INDEX_GAP))
}

/// Fresh intermediate able to hold `next_segment`
fn container_for(next_segment: &str) -> Value {
    if array_slot(next_segment, 0).is_some() {
        Value::array(Vec::new())
    } else {
        Value::Record(Record::new())
    }
}

fn assign_in_record(
    record: &mut Record,
    segments: &[&str],
    depth: usize,
    value: Value,
) -> StoreResult<()> {
    let key = segments[depth];
    if depth + 1 == segments.len() {
        record.insert(key, value);
        return Ok(());
    }

    let next = segments[depth + 1];
    let slot = record.get_or_insert_with(key, || container_for(next));
    assign_in_value(slot, segments, depth + 1, value)
}

fn assign_in_value(
    slot: &mut Value,
    segments: &[&str],
    depth: usize,
    value: Value,
) -> StoreResult<()> {
    let segment = segments[depth];

    if let Value::Array(items) = slot {
        if let Some(index) = array_slot(segment, items.len()) {
            return assign_in_array(Arc::make_mut(items), index, segments, depth, value);
        }
    }

    match slot {
        Value::Record(record) => assign_in_record(record, segments, depth, value),
        Value::Store(nested) => {
            let remainder = segments[depth..].join(".");
            nested
                .write(&remainder, value)
                .map(|_| ())
                .map_err(|err| err.nested_under(&segments[..depth].join(".")))
        }
        slot => {
            *slot = container_for(segment);
            assign_in_value(slot, segments, depth, value)
        }
    }
}

fn assign_in_array(
    items: &mut Vec<Value>,
    index: usize,
    segments: &[&str],
    depth: usize,
    value: Value,
) -> StoreResult<()> {
    if items.len() <= index {
        items.resize(index + 1, Value::Null);
    }

    if depth + 1 == segments.len() {
        items[index] = value;
        return Ok(());
    }

    assign_in_value(&mut items[index], segments, depth + 1, value)
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.default_policy == other.default_policy
            && self.permissions == other.permissions
            && self.fields == other.fields
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("default_policy", &self.default_policy)
            .field("permissions", &self.permissions)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
