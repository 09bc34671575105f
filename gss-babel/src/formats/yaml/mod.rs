//! YAML format
//!
//! Decoding goes through `serde_yaml` and understands multi-document
//! streams. Encoding uses the hand-written [`emitter`] so that string
//! quoting follows YAML 1.1 resolution rules.

mod emitter;

use crate::error::{FormatError, Position};
use crate::format::{Capabilities, Format, SerializedDocument};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::{Map, Value};
use base64::Engine as _;
use serde::Deserialize;

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFormat;

impl Format for YamlFormat {
    fn name(&self) -> &str {
        "yaml"
    }

    fn description(&self) -> &str {
        "YAML Ain't Markup Language"
    }

    fn file_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: true,
            ordered_keys: true,
            comments: true,
            binary: true,
        }
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, input: &[u8], _options: &DecodeOptions) -> Result<Payload, FormatError> {
        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_slice(input) {
            let yaml = serde_yaml::Value::deserialize(document).map_err(map_error)?;
            documents.push(from_yaml(yaml)?);
        }

        Ok(match documents.len() {
            0 => Payload::document(Value::Null),
            1 => Payload::document(documents.remove(0)),
            _ => Payload::stream(documents),
        })
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let document = payload.to_document();
        let text = emitter::Emitter::new(options.indent).emit(&document);
        Ok(SerializedDocument::Text(text))
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value, FormatError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(num) => match num.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(num.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(key_text(key)?, from_yaml(value)?);
            }
            Value::Map(map)
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tagged = *tagged;
            if tagged.tag.to_string().ends_with("binary") {
                decode_binary(tagged.value)?
            } else {
                from_yaml(tagged.value)?
            }
        }
    })
}

fn decode_binary(value: serde_yaml::Value) -> Result<Value, FormatError> {
    let serde_yaml::Value::String(text) = value else {
        return Err(FormatError::decode("yaml", "!!binary value must be a string"));
    };
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map(Value::Bytes)
        .map_err(|err| FormatError::decode("yaml", format!("invalid !!binary data: {err}")))
}

/// Mapping keys become strings; non-string keys use their scalar text.
fn key_text(key: serde_yaml::Value) -> Result<String, FormatError> {
    Ok(match from_yaml(key)? {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => crate::formats::common::format_float(f),
        other => serde_json::to_string(&other)
            .map_err(|err| FormatError::decode("yaml", err.to_string()))?,
    })
}

fn map_error(err: serde_yaml::Error) -> FormatError {
    let message = err.to_string();
    if message.contains("recursion limit exceeded") {
        return FormatError::LimitExceeded("yaml input nests too deeply".to_string());
    }
    match err.location() {
        Some(location) => FormatError::decode_at(
            "yaml",
            message,
            Position::new(location.line(), location.column()),
        ),
        None => FormatError::decode("yaml", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Payload {
        YamlFormat
            .decode(input.as_bytes(), &DecodeOptions::default())
            .unwrap()
    }

    fn encode(value: Value) -> String {
        YamlFormat
            .encode(&Payload::document(value), &EncodeOptions::default())
            .unwrap()
            .as_text()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_decode_single_document() {
        let payload = decode("a: x\nb: \"y\"\nc: 3\n");
        assert!(!payload.is_stream());
        assert_eq!(
            payload.to_document(),
            Value::from_pairs([
                ("a", Value::from("x")),
                ("b", Value::from("y")),
                ("c", Value::Int(3)),
            ])
        );
    }

    #[test]
    fn test_decode_multi_document_stream() {
        let payload = decode("a: 1\n---\na: 2\n");
        assert!(payload.is_stream());
        assert_eq!(payload.values().len(), 2);
    }

    #[test]
    fn test_decode_binary_tag() {
        let payload = decode("data: !binary aGk=\n");
        assert_eq!(
            payload.to_document(),
            Value::from_pairs([("data", Value::bytes(b"hi".to_vec()))])
        );
    }

    #[test]
    fn test_decode_non_string_keys() {
        let payload = decode("1: one\ntrue: yes\n");
        let doc = payload.to_document();
        let keys: Vec<&String> = doc.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["1", "true"]);
    }

    #[test]
    fn test_decode_error_is_positioned() {
        let err = YamlFormat
            .decode(b"a: [1, 2\nb: 3\n", &DecodeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
    }

    #[test]
    fn test_quoted_strings_read_back_as_strings() {
        let value = Value::from_pairs([
            ("flag", "yes"),
            ("num", "12"),
            ("date", "2020-01-01"),
            ("empty", ""),
        ]);
        let text = encode(value.clone());
        assert_eq!(decode(&text).to_document(), value);
    }

    #[test]
    fn test_stream_encodes_as_sequence() {
        let payload = Payload::stream(vec![Value::Int(1), Value::Int(2)]);
        let out = YamlFormat.encode(&payload, &EncodeOptions::default()).unwrap();
        assert_eq!(out.as_text(), Some("- 1\n- 2\n"));
    }
}
