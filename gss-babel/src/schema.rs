//! Best-effort type hints for record fields
//!
//! A [`Schema`] names fields and the scalar type each should have. Untyped
//! decoders (CSV, TSV, Properties, Tags) consult it before inference so that
//! a `string` field keeps its source text verbatim. After decoding it is
//! applied to every format: present fields are coerced, missing fields are
//! left alone, and `Null` stays `Null`. A value that cannot be coerced
//! without losing information is a [`FormatError::Schema`].
//!
//! ```ignore
//! let schema: Schema = "age=int,score=float".parse()?;
//! ```

use crate::coerce;
use crate::error::FormatError;
use crate::formats::common::format_float;
use crate::payload::Payload;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
}

impl FromStr for FieldType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(FieldType::String),
            "int" | "integer" => Ok(FieldType::Int),
            "float" | "number" => Ok(FieldType::Float),
            "bool" | "boolean" => Ok(FieldType::Bool),
            other => Err(FormatError::Schema {
                field: String::new(),
                message: format!("unknown field type '{other}'"),
            }),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
        })
    }
}

/// Ordered field → type hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Coerces the records of a payload in place.
    ///
    /// Records are the stream values, the elements of a document array, or
    /// the document itself when it is a map.
    pub fn apply(&self, payload: &mut Payload) -> Result<(), FormatError> {
        let stream = payload.is_stream();
        for value in payload.values_mut() {
            match value {
                Value::Map(map) => self.apply_to_record(map)?,
                Value::Array(items) if !stream => {
                    for item in items {
                        if let Value::Map(map) = item {
                            self.apply_to_record(map)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_to_record(&self, record: &mut Map) -> Result<(), FormatError> {
        for (field, field_type) in &self.fields {
            if let Some(value) = record.get_mut(field) {
                let coerced = coerce(value, *field_type).map_err(|message| FormatError::Schema {
                    field: field.clone(),
                    message,
                })?;
                *value = coerced;
            }
        }
        Ok(())
    }
}

impl FromStr for Schema {
    type Err = FormatError;

    /// Parses `name=type` pairs separated by commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut schema = Schema::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, ty) = entry.split_once('=').ok_or_else(|| FormatError::Schema {
                field: entry.to_string(),
                message: "expected name=type".to_string(),
            })?;
            let field_type = ty.parse::<FieldType>().map_err(|_| FormatError::Schema {
                field: name.trim().to_string(),
                message: format!("unknown field type '{}'", ty.trim()),
            })?;
            schema = schema.field(name.trim(), field_type);
        }
        Ok(schema)
    }
}

fn coerce(value: &Value, target: FieldType) -> Result<Value, String> {
    let fail = || format!("cannot convert {} {} to {target}", value.type_name(), describe(value));
    match (target, value) {
        (_, Value::Null) => Ok(Value::Null),

        (FieldType::String, Value::String(_)) => Ok(value.clone()),
        (FieldType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (FieldType::String, Value::Int(i)) => Ok(Value::String(i.to_string())),
        (FieldType::String, Value::Float(f)) => Ok(Value::String(format_float(*f))),

        (FieldType::Int, Value::Int(_)) => Ok(value.clone()),
        (FieldType::Int, Value::Float(f)) => float_to_int(*f).map(Value::Int).ok_or_else(fail),
        (FieldType::Int, Value::String(s)) => match coerce::infer_scalar(s.trim()) {
            Value::Int(i) => Ok(Value::Int(i)),
            Value::Float(f) => float_to_int(f).map(Value::Int).ok_or_else(fail),
            _ => Err(fail()),
        },

        (FieldType::Float, Value::Float(_)) => Ok(value.clone()),
        (FieldType::Float, Value::Int(i)) => int_to_float(*i).map(Value::Float).ok_or_else(fail),
        (FieldType::Float, Value::String(s)) => match coerce::infer_scalar(s.trim()) {
            Value::Float(f) => Ok(Value::Float(f)),
            Value::Int(i) => int_to_float(i).map(Value::Float).ok_or_else(fail),
            _ => Err(fail()),
        },

        (FieldType::Bool, Value::Bool(_)) => Ok(value.clone()),
        (FieldType::Bool, Value::Int(0)) => Ok(Value::Bool(false)),
        (FieldType::Bool, Value::Int(1)) => Ok(Value::Bool(true)),
        (FieldType::Bool, Value::String(s)) => match coerce::infer_scalar(s.trim()) {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            _ => Err(fail()),
        },

        _ => Err(fail()),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Exact conversion only: no fraction, within range.
fn float_to_int(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

/// Exact conversion only: integers beyond 2^53 may not survive.
fn int_to_float(i: i64) -> Option<f64> {
    let f = i as f64;
    if f < 9_223_372_036_854_775_808.0 && f as i64 == i {
        Some(f)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema() {
        let schema: Schema = "age=int, name = string,ok=bool,score=float".parse().unwrap();
        let fields: Vec<_> = schema.fields().collect();
        assert_eq!(
            fields,
            vec![
                ("age", FieldType::Int),
                ("name", FieldType::String),
                ("ok", FieldType::Bool),
                ("score", FieldType::Float),
            ]
        );
    }

    #[test]
    fn test_parse_schema_errors() {
        assert!("age".parse::<Schema>().is_err());
        let err = "age=decimal".parse::<Schema>().unwrap_err();
        assert_eq!(
            err,
            FormatError::Schema {
                field: "age".to_string(),
                message: "unknown field type 'decimal'".to_string(),
            }
        );
    }

    #[test]
    fn test_deserialize_schema() {
        let schema: Schema = serde_json::from_str(r#"{"id":"int","tag":"string"}"#).unwrap();
        assert_eq!(
            schema,
            Schema::new()
                .field("id", FieldType::Int)
                .field("tag", FieldType::String)
        );
    }

    #[test]
    fn test_apply_to_stream_records() {
        let schema = Schema::new()
            .field("zip", FieldType::String)
            .field("n", FieldType::Int)
            .field("r", FieldType::Float)
            .field("flag", FieldType::Bool)
            .field("missing", FieldType::Int);
        let mut payload = Payload::stream(vec![Value::from_pairs([
            ("zip", Value::Int(1234)),
            ("n", Value::from("42")),
            ("r", Value::Int(2)),
            ("flag", Value::from("TRUE")),
        ])]);
        schema.apply(&mut payload).unwrap();
        assert_eq!(
            payload.values(),
            &[Value::from_pairs([
                ("zip", Value::from("1234")),
                ("n", Value::Int(42)),
                ("r", Value::Float(2.0)),
                ("flag", Value::Bool(true)),
            ])]
        );
    }

    #[test]
    fn test_apply_to_document_array() {
        let schema = Schema::new().field("n", FieldType::Int);
        let mut payload = Payload::document(Value::Array(vec![
            Value::from_pairs([("n", Value::Float(3.0))]),
            Value::from_pairs([("n", Value::Null)]),
            Value::Int(7),
        ]));
        schema.apply(&mut payload).unwrap();
        assert_eq!(
            payload.to_document(),
            Value::Array(vec![
                Value::from_pairs([("n", Value::Int(3))]),
                Value::from_pairs([("n", Value::Null)]),
                Value::Int(7),
            ])
        );
    }

    #[test]
    fn test_lossy_coercion_fails() {
        let schema = Schema::new().field("n", FieldType::Int);
        let mut payload = Payload::document(Value::from_pairs([("n", Value::Float(1.5))]));
        let err = schema.apply(&mut payload).unwrap_err();
        assert_eq!(err.kind(), "SchemaError");
        assert!(err.to_string().contains("'n'"));

        let mut payload = Payload::document(Value::from_pairs([("n", Value::from("abc"))]));
        assert!(schema.apply(&mut payload).is_err());
    }

    #[test]
    fn test_exact_numeric_conversions() {
        assert_eq!(float_to_int(-3.0), Some(-3));
        assert_eq!(float_to_int(f64::NAN), None);
        assert_eq!(float_to_int(1e19), None);
        assert_eq!(int_to_float(1 << 53), Some(9007199254740992.0));
        assert_eq!(int_to_float((1 << 53) + 1), None);
        assert_eq!(int_to_float(i64::MAX), None);
    }
}
