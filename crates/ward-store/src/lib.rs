//! Ward Store - Permission-gated hierarchical key/value store
//!
//! This library provides:
//! - Dotted-path reads and writes checked against per-path permissions
//! - Most-specific-prefix permission resolution with a default policy
//! - Nested stores that carry and enforce their own policy
//! - Readable-entries projection of a whole store tree
//!
//! ```
//! use ward_store::{Permission, Policy, Store, Value};
//!
//! let policy = Policy::builder()
//!     .restrict_with("profile", Permission::ReadOnly)
//!     .restrict("secret")
//!     .build();
//!
//! let mut store = Store::with_policy(policy)
//!     .with_field("profile", Value::record([("name", "Ada")]))
//!     .with_field("secret", "hunter2");
//!
//! assert_eq!(store.read("profile:name").unwrap(), Some(Value::from("Ada")));
//! assert!(store.read("secret").is_err());
//! assert!(store.write("profile.name", "Grace").is_err());
//! assert!(store.entries().get("secret").is_none());
//! ```

/// Ward store version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod audit;
pub mod error;
pub mod json;
pub mod path;
pub mod permission;
pub mod policy;
pub mod snapshot;
pub mod store;
pub mod value;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, MemoryAuditLogger, NullAuditLogger};
pub use error::{StoreError, StoreResult};
pub use permission::{resolve, Capability, Permission, PermissionMap};
pub use policy::{Policy, PolicyBuilder, StoreSchema};
pub use store::Store;
pub use value::{Producer, Record, Value};
