//! TOML format
//!
//! A TOML document is always a table, so only map documents can be encoded.
//! TOML has no null; encoding a `Null` anywhere in the tree fails.

use crate::error::{FormatError, Position};
use crate::format::{input_text, Capabilities, Format, SerializedDocument};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::{Map, Value};
use base64::Engine as _;

#[derive(Debug, Default, Clone, Copy)]
pub struct TomlFormat;

impl Format for TomlFormat {
    fn name(&self) -> &str {
        "toml"
    }

    fn description(&self) -> &str {
        "Tom's Obvious Minimal Language"
    }

    fn file_extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            ordered_keys: true,
            comments: true,
            ..Capabilities::default()
        }
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, input: &[u8], _options: &DecodeOptions) -> Result<Payload, FormatError> {
        let source = input_text(self.name(), input)?;
        let table: toml::Table = toml::from_str(source).map_err(|err| {
            let message = err.message().to_string();
            if message.contains("recursion limit exceeded") {
                return FormatError::LimitExceeded("toml input nests too deeply".to_string());
            }
            match err.span() {
                Some(span) => {
                    FormatError::decode_at("toml", message, Position::from_offset(source, span.start))
                }
                None => FormatError::decode("toml", message),
            }
        })?;
        Ok(Payload::document(from_toml(toml::Value::Table(table))))
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let document = payload.to_document();
        let Value::Map(map) = &document else {
            return Err(FormatError::encode(
                "toml",
                format!("top-level value must be a map, got {}", document.type_name()),
            ));
        };
        let table = to_table(map, "")?;
        let text = if options.pretty {
            toml::to_string_pretty(&table)
        } else {
            toml::to_string(&table)
        }
        .map_err(|err| FormatError::encode("toml", err.to_string()))?;
        Ok(SerializedDocument::Text(text))
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Int(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(k, v)| (k, from_toml(v)))
                .collect::<Map>(),
        ),
    }
}

fn to_table(map: &Map, path: &str) -> Result<toml::Table, FormatError> {
    let mut table = toml::Table::new();
    for (key, value) in map {
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        table.insert(key.clone(), to_toml(value, &child)?);
    }
    Ok(table)
}

fn to_toml(value: &Value, path: &str) -> Result<toml::Value, FormatError> {
    Ok(match value {
        Value::Null => {
            return Err(FormatError::encode(
                "toml",
                format!("'{path}' is null, which TOML cannot represent"),
            ));
        }
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Bytes(data) => {
            toml::Value::String(base64::engine::general_purpose::STANDARD.encode(data))
        }
        Value::Array(items) => toml::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| to_toml(item, &format!("{path}[{idx}]")))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(map) => toml::Value::Table(to_table(map, path)?),
    })
}
