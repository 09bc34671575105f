//! Error types for format operations

use std::fmt;
use thiserror::Error;

/// A 1-based line/column location inside textual input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Computes the position of a byte offset within `source`.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut end = offset.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let prefix = &source[..end];
        let line = prefix.matches('\n').count() + 1;
        let column = match prefix.rfind('\n') {
            Some(idx) => prefix[idx + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors that can occur during a conversion
///
/// Every failure of the engine is reported through this type; nothing panics
/// across the public boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    UnknownFormat(String),
    /// The format exists but cannot perform the requested direction
    #[error("Operation not supported: format '{format}' does not support {operation}")]
    NotSupported {
        format: String,
        operation: &'static str,
    },
    /// Malformed input for the source format
    #[error("Decode error ({format}): {message}{}", fmt_position(.position))]
    Decode {
        format: String,
        message: String,
        position: Option<Position>,
    },
    /// The decoded values cannot be represented in the target format
    #[error("Encode error ({format}): {message}")]
    Encode { format: String, message: String },
    /// A schema hint could not be applied to a field
    #[error("Schema error for field '{field}': {message}")]
    Schema { field: String, message: String },
    /// Input exceeded one of the configured safety bounds
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
}

fn fmt_position(position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!(" at {pos}"),
        None => String::new(),
    }
}

impl FormatError {
    pub fn decode(format: impl Into<String>, message: impl Into<String>) -> Self {
        FormatError::Decode {
            format: format.into(),
            message: message.into(),
            position: None,
        }
    }

    pub fn decode_at(
        format: impl Into<String>,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        FormatError::Decode {
            format: format.into(),
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn encode(format: impl Into<String>, message: impl Into<String>) -> Self {
        FormatError::Encode {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Short machine-friendly name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            FormatError::UnknownFormat(_) => "UnknownFormat",
            FormatError::NotSupported { .. } => "NotSupported",
            FormatError::Decode { .. } => "DecodeError",
            FormatError::Encode { .. } => "EncodeError",
            FormatError::Schema { .. } => "SchemaError",
            FormatError::LimitExceeded(_) => "LimitExceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_from_offset_counts_lines_and_columns() {
        let source = "a,b\nx,\"y\n";
        assert_eq!(Position::from_offset(source, 0), Position::new(1, 1));
        assert_eq!(Position::from_offset(source, 4), Position::new(2, 1));
        assert_eq!(Position::from_offset(source, 6), Position::new(2, 3));
    }

    #[test]
    fn decode_error_display_includes_position() {
        let err = FormatError::decode_at("csv", "wrong number of fields", Position::new(3, 1));
        assert_eq!(
            err.to_string(),
            "Decode error (csv): wrong number of fields at line 3, column 1"
        );
        assert_eq!(err.kind(), "DecodeError");
    }

    #[test]
    fn unknown_format_display() {
        let err = FormatError::UnknownFormat("xml".to_string());
        assert_eq!(err.to_string(), "Format 'xml' not found");
    }
}
