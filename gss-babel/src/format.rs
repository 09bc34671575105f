//! Format trait definition
//!
//! This module defines the core Format trait that all format adapters
//! implement. The trait provides a uniform interface for decoding raw bytes
//! into the IR and encoding the IR back into bytes.

use crate::error::FormatError;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g., JSON, YAML, CSV)
    Text(String),
    /// Binary output (e.g., BSON)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            SerializedDocument::Text(text) => text.as_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }

    /// The text output, if the format produced text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SerializedDocument::Text(text) => Some(text),
            SerializedDocument::Binary(_) => None,
        }
    }
}

/// What a format can represent natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Holds a stream of independent records
    pub streaming: bool,
    /// Preserves the order of map keys
    pub ordered_keys: bool,
    /// Has a comment syntax (skipped when decoding)
    pub comments: bool,
    /// Has a native binary type
    pub binary: bool,
}

/// Trait for structured-data formats
///
/// Implementors provide conversion between raw bytes and the IR. Formats can
/// support decoding, encoding, or both; the defaults report
/// [`FormatError::NotSupported`].
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_decoding(&self) -> bool {
///         true
///     }
///
///     fn decode(&self, input: &[u8], options: &DecodeOptions) -> Result<Payload, FormatError> {
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The registry name of this format (e.g., "json", "yaml")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Whether this format supports decoding (bytes → IR)
    fn supports_decoding(&self) -> bool {
        false
    }

    /// Whether this format supports encoding (IR → bytes)
    fn supports_encoding(&self) -> bool {
        false
    }

    /// Decode raw input into IR values
    fn decode(&self, _input: &[u8], _options: &DecodeOptions) -> Result<Payload, FormatError> {
        Err(FormatError::NotSupported {
            format: self.name().to_string(),
            operation: "decoding",
        })
    }

    /// Encode IR values into raw output
    fn encode(
        &self,
        _payload: &Payload,
        _options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        Err(FormatError::NotSupported {
            format: self.name().to_string(),
            operation: "encoding",
        })
    }
}

/// Interprets decoder input as UTF-8 text.
pub(crate) fn input_text<'a>(format: &str, input: &'a [u8]) -> Result<&'a str, FormatError> {
    std::str::from_utf8(input).map_err(|err| {
        FormatError::decode(format, format!("input is not valid UTF-8: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DecodeOnly;

    impl Format for DecodeOnly {
        fn name(&self) -> &str {
            "decode-only"
        }
    }

    #[test]
    fn test_default_methods_report_not_supported() {
        let format = DecodeOnly;
        assert!(!format.supports_decoding());
        assert!(!format.supports_encoding());
        let err = format.decode(b"", &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FormatError::NotSupported {
                format: "decode-only".to_string(),
                operation: "decoding",
            }
        );
        let payload = Payload::stream(vec![]);
        assert!(format.encode(&payload, &EncodeOptions::default()).is_err());
    }

    #[test]
    fn test_serialized_document_into_bytes() {
        assert_eq!(
            SerializedDocument::Text("a".into()).into_bytes(),
            b"a".to_vec()
        );
        assert_eq!(SerializedDocument::Binary(vec![1]).as_text(), None);
    }

    #[test]
    fn test_input_text_rejects_invalid_utf8() {
        let err = input_text("json", &[0xff, 0xfe]).unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
    }
}
