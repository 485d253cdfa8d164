//! Readable-entries projection
//!
//! Builds a plain [`Record`] containing only what the store's policy lets a
//! reader see. Nested stores are projected under their own policy and appear
//! in the result as plain records.

use crate::path;
use crate::store::Store;
use crate::value::{Record, Value};

impl Store {
    /// Project every readable field into a plain record
    ///
    /// - metadata names are skipped at every level
    /// - an unreadable path is omitted along with everything below it
    /// - nested stores contribute their own `entries()`
    /// - plain records are walked; arrays and producers are copied as they are
    ///
    /// Producers are never invoked. A readable record whose children are all
    /// unreadable projects to an empty record.
    pub fn entries(&self) -> Record {
        let mut projection = Record::new();
        self.project(self.fields(), "", &mut projection);
        projection
    }

    fn project(&self, node: &Record, prefix: &str, target: &mut Record) {
        for (key, value) in node {
            if path::is_metadata(key) {
                continue;
            }

            let full = path::join(prefix, key);
            if !self.allowed_to_read(&full) {
                tracing::trace!(path = %full, "omitted from entries");
                continue;
            }

            let projected = match value {
                Value::Store(nested) => Value::Record(nested.entries()),
                Value::Record(record) => {
                    let mut child = Record::new();
                    self.project(record, &full, &mut child);
                    Value::Record(child)
                }
                other => other.clone(),
            };
            target.insert(key.as_str(), projected);
        }
    }
}
