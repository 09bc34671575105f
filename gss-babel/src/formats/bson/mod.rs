//! BSON format
//!
//! Input may hold several concatenated documents: one decodes to a document
//! payload, more than one to a stream. Every top-level value written must be
//! a map.
//!
//! Integers are written as int32 when they fit and int64 otherwise. Types
//! without an IR counterpart decode lossily: ObjectId becomes its hex
//! string, regex becomes `/pattern/flags`, datetime and timestamp become
//! integers, and min/max keys become null.

mod decoder;
mod encoder;

use crate::error::FormatError;
use crate::format::{Capabilities, Format, SerializedDocument};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::Value;
use decoder::Decoder;
use encoder::Encoder;

#[derive(Debug, Default, Clone, Copy)]
pub struct BsonFormat;

impl Format for BsonFormat {
    fn name(&self) -> &str {
        "bson"
    }

    fn description(&self) -> &str {
        "Binary JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["bson"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: true,
            ordered_keys: true,
            comments: false,
            binary: true,
        }
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, input: &[u8], options: &DecodeOptions) -> Result<Payload, FormatError> {
        let mut documents = Decoder::new(input, options.max_depth).read_all()?;
        Ok(match documents.len() {
            0 => Payload::stream(Vec::new()),
            1 => Payload::document(documents.remove(0)),
            _ => Payload::stream(documents),
        })
    }

    fn encode(
        &self,
        payload: &Payload,
        _options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let mut encoder = Encoder::new();
        for (idx, value) in payload.values().iter().enumerate() {
            let Value::Map(map) = value else {
                return Err(FormatError::encode(
                    self.name(),
                    format!(
                        "top-level value {idx} is a {}, only maps can be written",
                        value.type_name()
                    ),
                ));
            };
            encoder.write_document(map)?;
        }
        Ok(SerializedDocument::Binary(encoder.finish()))
    }
}
