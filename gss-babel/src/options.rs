//! Conversion options
//!
//! Options are split by direction: [`DecodeOptions`] reach the source
//! format's decoder, [`EncodeOptions`] the target format's encoder, and
//! [`ConvertOptions`] wraps both together with the orchestrator's own knobs
//! (key sorting and [`Limits`]). Adapters ignore options that do not apply to
//! them.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Default bound on nesting depth of a decoded tree.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on the raw input size (64 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;

/// Options for the orchestrator and both sides of a conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Sort map keys before encoding
    pub sorted: bool,

    /// When sorting, sort in descending order
    pub reversed: bool,

    pub input: DecodeOptions,
    pub output: EncodeOptions,
    pub limits: Limits,
}

impl ConvertOptions {
    /// Options with only the `sorted` flag set.
    pub fn sorted() -> Self {
        Self {
            sorted: true,
            ..Self::default()
        }
    }
}

/// Options understood by decoders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Explicit header for CSV/TSV input. When set, the first row is data.
    pub header: Vec<String>,

    /// Field delimiter override for CSV/TSV
    pub delimiter: Option<char>,

    /// Lines starting with this prefix are skipped
    pub comment: Option<String>,

    /// Accept stray or unterminated quotes in CSV/TSV
    pub lazy_quotes: bool,

    /// Trim whitespace around CSV/TSV fields and record lines
    pub trim: bool,

    /// Number of leading lines to skip before parsing
    pub skip_lines: usize,

    /// Drop carriage returns that precede a line separator
    pub drop_cr: bool,

    /// Maximum number of records to decode from record-oriented formats
    pub limit: Option<usize>,

    /// Record separator for JSONL, Tags and Properties
    pub line_separator: String,

    /// Separator between keys and values in Tags
    pub key_value_separator: String,

    /// Maximum nesting depth hand-written decoders will descend into
    pub max_depth: usize,

    /// Field type hints consulted by untyped decoders before inference
    pub schema: Option<Schema>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            header: Vec::new(),
            delimiter: None,
            comment: None,
            lazy_quotes: false,
            trim: false,
            skip_lines: 0,
            drop_cr: true,
            limit: None,
            line_separator: "\n".to_string(),
            key_value_separator: "=".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            schema: None,
        }
    }
}

/// Options understood by encoders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Pretty-print JSON and TOML output
    pub pretty: bool,

    /// Indentation width for pretty JSON and YAML mappings
    pub indent: usize,

    /// Explicit CSV/TSV columns
    pub header: Vec<String>,

    /// Grow the CSV/TSV header with keys first seen in later records
    pub expand_header: bool,

    /// Field delimiter override for CSV/TSV
    pub delimiter: Option<char>,

    /// Maximum number of records to encode into record-oriented formats
    pub limit: Option<usize>,

    /// Separator written between records/lines
    pub line_separator: String,

    /// Separator between keys and values in Properties and Tags
    pub key_value_separator: String,

    /// Text written for null and missing values in text formats
    pub no_data_value: String,

    /// Escape spaces in Properties values
    pub escape_space: bool,

    /// Escape `=` in Properties values
    pub escape_equal: bool,

    /// Escape `:` in Properties values
    pub escape_colon: bool,

    /// Escape line breaks in Properties values
    pub escape_new_line: bool,

    /// Case transform applied to keys in text formats
    pub key_case: Case,

    /// Case transform applied to string values in Tags and Properties
    pub value_case: Case,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
            header: Vec::new(),
            expand_header: false,
            delimiter: None,
            limit: None,
            line_separator: "\n".to_string(),
            key_value_separator: "=".to_string(),
            no_data_value: String::new(),
            escape_space: false,
            escape_equal: false,
            escape_colon: false,
            escape_new_line: true,
            key_case: Case::Preserve,
            value_case: Case::Preserve,
        }
    }
}

/// Case transform for keys and values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    #[default]
    Preserve,
    Lower,
    Upper,
}

impl Case {
    pub fn apply(self, text: &str) -> String {
        match self {
            Case::Preserve => text.to_string(),
            Case::Lower => text.to_lowercase(),
            Case::Upper => text.to_uppercase(),
        }
    }
}

/// Safety bounds enforced by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_depth: usize,
    pub max_input_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert!(!options.sorted);
        assert_eq!(options.output.indent, 2);
        assert_eq!(options.output.line_separator, "\n");
        assert_eq!(options.output.key_value_separator, "=");
        assert_eq!(options.limits.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.input.drop_cr);
        assert_eq!(options.input.key_value_separator, "=");
        assert!(options.input.schema.is_none());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"sorted":true,"output":{"pretty":true,"key_case":"upper"}}"#)
                .unwrap();
        assert!(options.sorted);
        assert!(options.output.pretty);
        assert_eq!(options.output.key_case, Case::Upper);
        assert_eq!(options.output.indent, 2);
        assert_eq!(options.input, DecodeOptions::default());
    }

    #[test]
    fn test_case_apply() {
        assert_eq!(Case::Lower.apply("AbC"), "abc");
        assert_eq!(Case::Upper.apply("AbC"), "ABC");
        assert_eq!(Case::Preserve.apply("AbC"), "AbC");
    }
}
