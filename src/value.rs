//! Extraction result values.
//!
//! `collect()` produces a tree of [`Value`]s shaped by the layout: scalar
//! text at leaf fields, nested maps where the shape recurses, lists where a
//! field's arity allows multiple matches. Map fields keep insertion order
//! because extraction (and the node removal it performs) is order-dependent
//! and debug artifacts should read in layout order.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// One node of an extraction result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Declared field with nothing extracted (kept only in full mode).
    Null,
    /// Scalar content of a leaf field.
    Text(String),
    /// Ordered multi-match field.
    List(Vec<Value>),
    /// Nested entry structure, fields in layout order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// True if the value carries no content.
    ///
    /// Mirrors the truthiness test used when pruning optional fields:
    /// empty text, empty lists, and maps whose members are all empty
    /// count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.iter().all(Value::is_empty),
            Value::Map(fields) => fields.iter().all(|(_, v)| v.is_empty()),
        }
    }

    /// Drop empty members from a list value. Other values pass through.
    #[must_use]
    pub fn pruned(self) -> Value {
        match self {
            Value::List(items) => {
                Value::List(items.into_iter().filter(|v| !v.is_empty()).collect())
            }
            other => other,
        }
    }

    /// Borrow a named field of a map value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Map(fields) => fields.iter().find(|(k, _)| k == field).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Borrow the scalar text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
