//! JSON and JSON Lines formats
//!
//! Both go through `serde_json::Value` (built with `preserve_order`, so object
//! keys keep their document order) and are converted into the IR from there.
//! Encoding serializes the IR directly.

use crate::error::{FormatError, Position};
use crate::format::{Capabilities, Format, SerializedDocument};
use crate::formats::common;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::{Map, Value};
use serde::Serialize;

/// A single JSON document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat;

/// Newline-delimited JSON: one document per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "JavaScript Object Notation"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            ordered_keys: true,
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
        let json: serde_json::Value =
            serde_json::from_slice(input).map_err(|err| map_error(self.name(), err, None))?;
        Ok(Payload::document(from_json(json)))
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let document = payload.to_document();
        let text = if options.pretty {
            to_string_pretty(&document, options.indent)
        } else {
            serde_json::to_string(&document)
        }
        .map_err(|err| FormatError::encode(self.name(), err.to_string()))?;
        Ok(SerializedDocument::Text(text))
    }
}

impl Format for JsonlFormat {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn description(&self) -> &str {
        "JSON Lines, one document per line"
    }

    fn file_extensions(&self) -> &[&str] {
        &["jsonl", "ndjson"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: true,
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

    fn decode(&self, input: &[u8], options: &DecodeOptions) -> Result<Payload, FormatError> {
        let source = crate::format::input_text(self.name(), input)?;
        let mut records = Vec::new();
        for line in common::lines(source, options) {
            if options.limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }
            if line.text.trim().is_empty() {
                continue;
            }
            let json: serde_json::Value = serde_json::from_str(line.text)
                .map_err(|err| map_error(self.name(), err, Some(line.number)))?;
            records.push(from_json(json));
        }
        Ok(Payload::stream(records))
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let mut records = payload.records();
        common::apply_limit(&mut records, options.limit);

        let mut out = String::new();
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|err| FormatError::encode(self.name(), err.to_string()))?;
            out.push_str(&line);
            out.push_str(&options.line_separator);
        }
        Ok(SerializedDocument::Text(out))
    }
}

/// Converts a `serde_json::Value` into the IR.
///
/// Integers outside the `i64` range become floats.
pub fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(num) => match num.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(num.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(obj) => Value::Map(
            obj.into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect::<Map>(),
        ),
    }
}

fn to_string_pretty(value: &Value, indent: usize) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn map_error(format: &str, err: serde_json::Error, line: Option<usize>) -> FormatError {
    let message = err.to_string();
    if message.contains("recursion limit exceeded") {
        return FormatError::LimitExceeded(format!("{format} input nests too deeply"));
    }
    let position = match line {
        Some(line) => Position::new(line, err.column()),
        None => Position::new(err.line(), err.column()),
    };
    // Strip serde_json's own " at line X column Y" suffix; the position is
    // reported separately.
    let message = match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    };
    FormatError::decode_at(format, message, position)
}
