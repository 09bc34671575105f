//! Shared helpers for the line- and text-oriented formats
//!
//! CSV, TSV, Properties, Tags and JSONL all deal with lines and with turning
//! IR scalars into plain text; the pieces they share live here.

use crate::error::FormatError;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::value::Value;

/// A logical input line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Splits `source` into lines according to the decode options.
///
/// Applies `skip_lines`, `drop_cr` and `trim`, and drops comment lines. Blank
/// lines are kept; callers decide what a blank line means for their format.
pub fn lines<'a>(source: &'a str, options: &DecodeOptions) -> Vec<Line<'a>> {
    let separator = if options.line_separator.is_empty() {
        "\n"
    } else {
        options.line_separator.as_str()
    };

    let mut out = Vec::new();
    for (idx, raw) in source.split(separator).enumerate() {
        if idx < options.skip_lines {
            continue;
        }
        let mut text = raw;
        if options.drop_cr {
            text = text.strip_suffix('\r').unwrap_or(text);
        }
        if options.trim {
            text = text.trim();
        }
        if is_comment(text, options) {
            tracing::trace!(line = idx + 1, "skipping comment line");
            continue;
        }
        out.push(Line {
            number: idx + 1,
            text,
        });
    }

    // A trailing separator does not start another line.
    if matches!(out.last(), Some(line) if line.text.is_empty()) && source.ends_with(separator) {
        out.pop();
    }
    out
}

pub fn is_comment(text: &str, options: &DecodeOptions) -> bool {
    match options.comment.as_deref() {
        Some(prefix) if !prefix.is_empty() => text.starts_with(prefix),
        _ => false,
    }
}

/// Renders a value as a plain-text cell.
///
/// Nested values are embedded as compact JSON; binary data has no text form
/// and is rejected.
pub fn scalar_text(
    format: &str,
    value: &Value,
    options: &EncodeOptions,
) -> Result<String, FormatError> {
    match value {
        Value::Null => Ok(options.no_data_value.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(format_float(*f)),
        Value::String(s) => Ok(s.clone()),
        Value::Bytes(_) => Err(FormatError::encode(
            format,
            "binary values cannot be represented as text",
        )),
        Value::Array(_) | Value::Map(_) => serde_json::to_string(value)
            .map_err(|err| FormatError::encode(format, err.to_string())),
    }
}

/// Formats a float so that it reads back as a float (`1.0`, not `1`).
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{f:?}")
    }
}

/// Truncates a record list to the configured limit.
pub fn apply_limit<T>(records: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        records.truncate(limit);
    }
}

/// Records of the payload that must be maps, for formats whose records are
/// flat key/value collections.
pub fn map_records<'a>(
    format: &str,
    records: Vec<&'a Value>,
) -> Result<Vec<&'a crate::value::Map>, FormatError> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            record.as_map().ok_or_else(|| {
                FormatError::encode(
                    format,
                    format!("record {idx} is a {}, expected a map", record.type_name()),
                )
            })
        })
        .collect()
}
