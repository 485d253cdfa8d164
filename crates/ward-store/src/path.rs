//! Dotted path handling
//!
//! Paths address fields by joining names with `.`. Input may also use `:`
//! as the separator; it is rewritten to `.` before anything else happens.
//! There is no escaping: a segment can never contain `.` or `:`.

use std::borrow::Cow;

/// Separator used by every path after normalization
pub const SEPARATOR: char = '.';

/// Alternate separator accepted on input
pub const ALT_SEPARATOR: char = ':';

/// Field names that hold store metadata rather than data
pub const METADATA_FIELDS: [&str; 2] = ["permissions", "defaultPolicy"];

/// Rewrite colon-delimited input to the dotted form
pub fn normalize(path: &str) -> Cow<'_, str> {
    if path.contains(ALT_SEPARATOR) {
        Cow::Owned(path.replace(ALT_SEPARATOR, "."))
    } else {
        Cow::Borrowed(path)
    }
}

/// Split a normalized path into its segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).collect()
}

/// Append `key` to `prefix`; an empty prefix denotes the store root
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, SEPARATOR, key)
    }
}

pub fn is_metadata(key: &str) -> bool {
    METADATA_FIELDS.contains(&key)
}

/// Whether a normalized path starts at a metadata field
pub(crate) fn targets_metadata(path: &str) -> bool {
    path.split(SEPARATOR).next().is_some_and(is_metadata)
}

/// Parse a segment as an array index (plain decimal digits only)
pub(crate) fn index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
