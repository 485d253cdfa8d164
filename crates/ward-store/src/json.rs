//! JSON interop
//!
//! Converts `serde_json` documents into store values and renders values back
//! to JSON. Rendering follows the usual JSON text rules: producers have no
//! representation, so they are dropped from objects and become `null` in
//! arrays, and non-finite numbers become `null`.

use crate::value::{Record, Value};
use serde_json::{Map, Number};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Record(Record::from(map)),
        }
    }
}

impl From<Map<String, serde_json::Value>> for Record {
    fn from(map: Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl Value {
    /// Render as JSON
    ///
    /// Nested stores render their raw fields; project with
    /// [`Store::entries`](crate::Store::entries) first for a filtered view.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Producer(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.as_str().to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Record(record) => serde_json::Value::Object(record.to_json()),
            Value::Store(store) => serde_json::Value::Object(store.fields().to_json()),
        }
    }
}

impl Record {
    /// Render as a JSON object, dropping producer fields
    pub fn to_json(&self) -> Map<String, serde_json::Value> {
        self.iter()
            .filter(|(_, value)| !value.is_producer())
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}
