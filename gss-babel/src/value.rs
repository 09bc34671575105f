//! Intermediate Representation (IR) for structured data.
//!
//! Every decoder produces [`Value`] trees and every encoder consumes them, so
//! formats never talk to each other directly. The model keeps integers and
//! floats apart, keeps map keys in insertion order, and carries raw binary
//! data for formats that have a native blob type (BSON, YAML `!!binary`).

use base64::Engine as _;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Ordered mapping with unique keys.
pub type Map = IndexMap<String, Value>;

/// A node of the intermediate representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Opaque binary data
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(Map),
}

/// Direction used by [`Value::sort_keys`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl Value {
    /// Builds a `Map` value from key/value pairs. Later duplicates replace
    /// earlier values but keep the first position.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Nesting depth of the tree. Scalars have depth 0, `[1]` has depth 1.
    ///
    /// Computed with an explicit stack so arbitrarily deep trees cannot
    /// overflow the call stack.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((value, level)) = stack.pop() {
            match value {
                Value::Array(items) => {
                    max = max.max(level + 1);
                    stack.extend(items.iter().map(|v| (v, level + 1)));
                }
                Value::Map(map) => {
                    max = max.max(level + 1);
                    stack.extend(map.values().map(|v| (v, level + 1)));
                }
                _ => {}
            }
        }
        max
    }

    /// Sorts the keys of every map in the tree by byte value.
    pub fn sort_keys(&mut self, order: SortOrder) {
        match self {
            Value::Map(map) => {
                match order {
                    SortOrder::Ascending => map.sort_keys(),
                    SortOrder::Descending => map.sort_by(|k1, _, k2, _| k2.cmp(k1)),
                }
                for value in map.values_mut() {
                    value.sort_keys(order);
                }
            }
            Value::Array(items) => {
                for value in items {
                    value.sort_keys(order);
                }
            }
            _ => {}
        }
    }

    /// Drives `visitor` over the tree in document order.
    pub fn walk<V: ValueVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self {
            Value::Array(items) => {
                visitor.enter_array(items.len())?;
                for (index, item) in items.iter().enumerate() {
                    visitor.visit_index(index)?;
                    item.walk(visitor)?;
                }
                visitor.exit_array()
            }
            Value::Map(map) => {
                visitor.enter_map(map.len())?;
                for (index, (key, item)) in map.iter().enumerate() {
                    visitor.visit_key(index, key)?;
                    item.walk(visitor)?;
                }
                visitor.exit_map()
            }
            scalar => visitor.visit_scalar(scalar),
        }
    }
}

/// Event-style traversal of a [`Value`] tree.
///
/// Containers are reported with `enter_*`/`exit_*` pairs; each child is
/// preceded by `visit_index` (arrays) or `visit_key` (maps). Only the scalar
/// callback is required.
pub trait ValueVisitor {
    type Error;

    fn visit_scalar(&mut self, value: &Value) -> Result<(), Self::Error>;

    fn enter_array(&mut self, _len: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_index(&mut self, _index: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    fn exit_array(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn enter_map(&mut self, _len: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_key(&mut self, _index: usize, _key: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn exit_map(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(data) => {
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
