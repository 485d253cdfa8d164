//! Store access tests
//!
//! Exercises reads, writes, enumeration and nested-store scoping through the
//! public API only.

use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use ward_store::{
    AuditLogger, Capability, MemoryAuditLogger, Permission, Policy, Record, Store,
    StoreError, Value,
};

fn denied(path: &str, capability: Capability) -> StoreError {
    StoreError::PermissionDenied {
        path: path.to_string(),
        capability,
    }
}

// ============================================================================
// Permission Resolution
// ============================================================================

fn layered_store() -> Store {
    Store::with_policy(
        Policy::builder()
            .restrict_with("a", Permission::ReadOnly)
            .restrict_with("a.b", Permission::ReadWrite)
            .restrict_with("w", Permission::WriteOnly)
            .restrict("hidden")
            .build(),
    )
}

#[rstest]
#[case("a", true, false)]
#[case("a.c", true, false)]
#[case("a.b", true, true)]
#[case("a.b.c", true, true)]
#[case("a:b:c", true, true)]
#[case("ab", true, true)]
#[case("w", false, true)]
#[case("w.x", false, true)]
#[case("hidden", false, false)]
#[case("hidden.deeper", false, false)]
#[case("unlisted.path", true, true)]
fn test_allowed(#[case] path: &str, #[case] readable: bool, #[case] writable: bool) {
    let store = layered_store();
    assert_eq!(store.allowed_to_read(path), readable, "read {}", path);
    assert_eq!(store.allowed_to_write(path), writable, "write {}", path);
}

#[rstest]
#[case(Permission::ReadWrite, true, true)]
#[case(Permission::ReadOnly, true, false)]
#[case(Permission::WriteOnly, false, true)]
#[case(Permission::None, false, false)]
fn test_default_policy_applies_to_undeclared_paths(
    #[case] default_policy: Permission,
    #[case] readable: bool,
    #[case] writable: bool,
) {
    let store = Store::with_policy(Policy::new(default_policy));
    assert_eq!(store.allowed_to_read("x.y"), readable);
    assert_eq!(store.allowed_to_write("x.y"), writable);
}

#[rstest]
#[case("permissions")]
#[case("permissions.a")]
#[case("defaultPolicy")]
#[case("defaultPolicy:x")]
fn test_metadata_paths_are_refused(#[case] path: &str) {
    let mut store = Store::new();
    assert!(!store.allowed_to_read(path));
    assert!(!store.allowed_to_write(path));
    assert!(store.read(path).unwrap_err().is_permission_denied());
    assert!(store.write(path, 1).unwrap_err().is_permission_denied());
}

// ============================================================================
// Read / Write
// ============================================================================

#[test]
fn test_write_then_read_round_trip() {
    let mut store = Store::new();

    let written = store.write("user.name", "Ada").unwrap();
    assert_eq!(written, Value::from("Ada"));
    assert_eq!(store.read("user.name").unwrap(), Some(Value::from("Ada")));
    assert_eq!(store.read("user:name").unwrap(), Some(Value::from("Ada")));
}

#[test]
fn test_read_of_unreadable_path_fails_even_with_data() {
    let store = Store::with_policy(Policy::builder().restrict("secret").build())
        .with_field("secret", Value::record([("key", "k")]));

    assert_eq!(store.read("secret").unwrap_err(), denied("secret", Capability::Read));
    assert_eq!(
        store.read("secret.key").unwrap_err(),
        denied("secret.key", Capability::Read)
    );
}

#[test]
fn test_write_only_field() {
    let mut store = Store::with_policy(
        Policy::builder()
            .restrict_with("inbox", Permission::WriteOnly)
            .build(),
    );

    store.write("inbox", "message").unwrap();
    assert!(store.read("inbox").is_err());
    assert_eq!(store.entries(), Record::new());
}

#[test]
fn test_denied_write_leaves_store_untouched() {
    let mut store = Store::with_policy(
        Policy::builder()
            .restrict_with("config", Permission::ReadOnly)
            .build(),
    )
    .with_field("config", Value::record([("mode", "fast")]));

    let before = store.clone();
    assert_eq!(
        store.write("config.mode", "slow").unwrap_err(),
        denied("config.mode", Capability::Write)
    );
    assert_eq!(store, before);
}

#[test]
fn test_write_into_array_element() {
    let mut store = Store::new().with_field(
        "items",
        Value::array(vec![Value::record([("n", 1)]), Value::record([("n", 2)])]),
    );

    store.write("items.1.n", 20).unwrap();

    assert_eq!(store.read("items.1.n").unwrap(), Some(Value::from(20)));
    assert_eq!(store.read("items.0.n").unwrap(), Some(Value::from(1)));
}

#[rstest]
#[case("items.18446744073709551615")]
#[case("items.4611686018427387903")]
#[case("items.1000000000")]
fn test_write_far_out_of_range_index_does_not_pad(#[case] path: &str) {
    let mut store = Store::new().with_field("items", Value::array(vec![Value::from(1)]));

    store.write(path, "x").unwrap();

    assert_eq!(store.read(path).unwrap(), Some(Value::from("x")));
    let items = store.read("items").unwrap().unwrap();
    assert_eq!(items.as_record().map(Record::len), Some(1));
}

#[test]
fn test_write_entries_with_huge_index_key() {
    let mut store = Store::new();

    store
        .write_entries([("grid.99999999999999999999", 1), ("grid:x", 2)])
        .unwrap();

    assert_eq!(store.read("grid.x").unwrap(), Some(Value::from(2)));
    assert_eq!(
        store.read("grid.99999999999999999999").unwrap(),
        Some(Value::from(1))
    );
}

#[test]
fn test_null_intermediate_reads_as_absent() {
    let store = Store::new().with_field("empty", Value::Null);
    assert_eq!(store.read("empty.anything").unwrap(), None);
}

// ============================================================================
// Producers
// ============================================================================

#[test]
fn test_producer_invoked_only_when_read_descends_through_it() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let producer = Value::producer(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::record([("inner", 42)])
    });
    let store = Store::new().with_field("field", producer.clone());

    assert_eq!(store.read("field.inner").unwrap(), Some(Value::from(42)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(store.read("field").unwrap(), Some(producer.clone()));
    assert_eq!(store.entries().get("field"), Some(&producer));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_write_through_producer_replaces_it() {
    let mut store = Store::new().with_field("lazy", Value::producer(|| Value::record([("a", 1)])));

    store.write("lazy.b", 2).unwrap();

    let expected = Value::record([("b", 2)]);
    assert_eq!(store.read("lazy").unwrap(), Some(expected));
}

// ============================================================================
// write_entries
// ============================================================================

#[test]
fn test_write_entries_writes_in_order() {
    let mut store = Store::new();
    store
        .write_entries([("a", Value::from(1)), ("b:c", Value::from(2))])
        .unwrap();

    assert_eq!(store.read("a").unwrap(), Some(Value::from(1)));
    assert_eq!(store.read("b.c").unwrap(), Some(Value::from(2)));
}

#[test]
fn test_write_entries_stops_at_first_refusal_without_rollback() {
    let mut store = Store::with_policy(Policy::builder().restrict("b").build());

    let err = store
        .write_entries([("a", 1), ("b", 2), ("c", 3)])
        .unwrap_err();

    assert_eq!(err, denied("b", Capability::Write));
    assert_eq!(store.read("a").unwrap(), Some(Value::from(1)));
    assert_eq!(store.read("c").unwrap(), None);
}

// ============================================================================
// Entries
// ============================================================================

#[test]
fn test_entries_filters_by_policy() {
    let store = Store::with_policy(
        Policy::builder()
            .restrict("profile.ssn")
            .restrict_with("profile.name", Permission::ReadOnly)
            .build(),
    )
    .with_field(
        "profile",
        Value::record([("name", "Ada"), ("ssn", "000"), ("city", "London")]),
    )
    .with_field("visits", 3);

    let expected: Record = [
        (
            "profile",
            Value::record([("name", "Ada"), ("city", "London")]),
        ),
        ("visits", Value::from(3)),
    ]
    .into_iter()
    .collect();

    assert_eq!(store.entries(), expected);
}

#[test]
fn test_entries_skips_metadata_named_fields_at_any_depth() {
    let store = Store::new()
        .with_field("permissions", "top")
        .with_field(
            "nested",
            Value::record([("defaultPolicy", "x"), ("kept", "y")]),
        );

    let expected: Record = [("nested", Value::record([("kept", "y")]))]
        .into_iter()
        .collect();
    assert_eq!(store.entries(), expected);
}

#[test]
fn test_entries_keeps_arrays_whole() {
    let list = Value::array(vec![Value::from(1), Value::record([("x", 2)])]);
    let store = Store::with_policy(Policy::builder().restrict("list.1").build())
        .with_field("list", list.clone());

    assert_eq!(store.entries().get("list"), Some(&list));
}

// ============================================================================
// Nested Stores
// ============================================================================

fn vault() -> Store {
    Store::with_policy(
        Policy::builder()
            .default_policy(Permission::None)
            .restrict_with("label", Permission::ReadOnly)
            .restrict_with("notes", Permission::ReadWrite)
            .build(),
    )
    .with_field("label", "personal")
    .with_field("pin", "1234")
}

#[test]
fn test_nested_store_with_none_default_projects_empty() {
    let nested = Store::with_policy(Policy::new(Permission::None)).with_field("x", 1);
    let store = Store::new().with_field("inner", nested);

    let expected: Record = [("inner", Value::Record(Record::new()))]
        .into_iter()
        .collect();
    assert_eq!(store.entries(), expected);
}

#[test]
fn test_nested_store_enforces_its_own_policy_on_read() {
    let store = Store::new().with_field("vault", vault());

    assert_eq!(store.read("vault.label").unwrap(), Some(Value::from("personal")));
    assert_eq!(
        store.read("vault.pin").unwrap_err(),
        denied("vault.pin", Capability::Read)
    );
}

#[test]
fn test_nested_store_enforces_its_own_policy_on_write() {
    let mut store = Store::new().with_field("vault", vault());

    store.write("vault:notes", "remember").unwrap();
    assert_eq!(store.read("vault.notes").unwrap(), Some(Value::from("remember")));

    assert_eq!(
        store.write("vault.label", "work").unwrap_err(),
        denied("vault.label", Capability::Write)
    );
    assert_eq!(store.read("vault.label").unwrap(), Some(Value::from("personal")));
}

#[test]
fn test_parent_policy_still_gates_nested_store() {
    let store = Store::with_policy(Policy::builder().restrict("vault").build())
        .with_field("vault", vault());

    assert_eq!(
        store.read("vault.label").unwrap_err(),
        denied("vault.label", Capability::Read)
    );
    assert_eq!(store.entries(), Record::new());
}

#[test]
fn test_nested_store_entries() {
    let store = Store::new().with_field("vault", vault()).with_field("n", 1);

    let expected: Record = [
        ("vault", Value::record([("label", "personal")])),
        ("n", Value::from(1)),
    ]
    .into_iter()
    .collect();
    assert_eq!(store.entries(), expected);
}

#[test]
fn test_replacing_nested_store_is_a_parent_write() {
    let mut store = Store::new().with_field("vault", vault());

    store.write("vault", Value::record([("pin", "0000")])).unwrap();

    assert_eq!(store.read("vault.pin").unwrap(), Some(Value::from("0000")));
}

// ============================================================================
// Audit
// ============================================================================

#[test]
fn test_audit_trail_records_decisions() {
    let logger = Arc::new(MemoryAuditLogger::new());
    let mut store = Store::with_policy(Policy::builder().restrict("secret").build())
        .with_audit_logger(logger.clone());

    store.write("name", "Ada").unwrap();
    store.read("secret").unwrap_err();
    store.grant("secret", Permission::ReadOnly);
    store.read("secret").unwrap();

    let lines: Vec<String> = logger
        .entries()
        .iter()
        .map(|entry| entry.event.to_string())
        .collect();
    assert_eq!(
        lines,
        vec![
            "GRANTED write name (rw)",
            "DENIED read secret (none)",
            "Policy: secret = r",
            "GRANTED read secret (r)",
        ]
    );

    logger.clear();
    assert!(logger.entries().is_empty());
}

#[test]
fn test_extend_permissions_only_grows_policy() {
    let mut store = Store::new();
    store.extend_permissions([("a", Permission::ReadOnly), ("b", Permission::None)]);
    store.extend_permissions([("a", Permission::WriteOnly)]);

    assert_eq!(store.permissions().len(), 2);
    assert_eq!(store.permission_for("a.x"), Permission::WriteOnly);
    assert_eq!(store.permission_for("b"), Permission::None);
}
