//! HashiCorp Configuration Language
//!
//! Both dialects are parsed by `hcl-rs`. The legacy `hcl` dialect is read
//! only; `hcl2` is written back out through the same crate. Blocks decode to
//! nested maps keyed by block type and labels.
//!
//! `hcl-rs` recurses once per nesting level and has no bound of its own, so
//! the input is scanned for bracket depth before it is handed over.

use crate::error::FormatError;
use crate::format::{input_text, Capabilities, Format, SerializedDocument};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    V1,
    V2,
}

#[derive(Debug, Clone, Copy)]
pub struct HclFormat {
    dialect: Dialect,
}

impl HclFormat {
    /// The legacy dialect, decode only.
    pub const fn v1() -> Self {
        Self {
            dialect: Dialect::V1,
        }
    }

    pub const fn v2() -> Self {
        Self {
            dialect: Dialect::V2,
        }
    }
}

impl Format for HclFormat {
    fn name(&self) -> &str {
        match self.dialect {
            Dialect::V1 => "hcl",
            Dialect::V2 => "hcl2",
        }
    }

    fn description(&self) -> &str {
        match self.dialect {
            Dialect::V1 => "HashiCorp Configuration Language (read only)",
            Dialect::V2 => "HashiCorp Configuration Language 2",
        }
    }

    fn file_extensions(&self) -> &[&str] {
        match self.dialect {
            Dialect::V1 => &["hcl"],
            Dialect::V2 => &["tf", "hcl2"],
        }
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
        self.dialect == Dialect::V2
    }

    fn decode(&self, input: &[u8], options: &DecodeOptions) -> Result<Payload, FormatError> {
        let source = input_text(self.name(), input)?;
        check_nesting(self.name(), source, options.max_depth)?;
        let value: hcl::Value = hcl::from_str(source)
            .map_err(|err| FormatError::decode(self.name(), err.to_string()))?;
        Ok(Payload::document(from_hcl(value)))
    }

    fn encode(
        &self,
        payload: &Payload,
        _options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        if self.dialect == Dialect::V1 {
            return Err(FormatError::NotSupported {
                format: self.name().to_string(),
                operation: "encoding",
            });
        }
        let document = payload.to_document();
        if !matches!(document, Value::Map(_)) {
            return Err(FormatError::encode(
                self.name(),
                format!("top-level value must be a map, got {}", document.type_name()),
            ));
        }
        let text = hcl::to_string(&document)
            .map_err(|err| FormatError::encode(self.name(), err.to_string()))?;
        Ok(SerializedDocument::Text(text))
    }
}

/// Deepest nesting ever handed to `hcl-rs`, whatever `max_depth` says.
const PARSER_NESTING_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Bracket,
    Template,
    Quote,
}

/// Counts `[`, `{`, `(` and `${`/`%{` nesting outside string literals,
/// comments and heredocs.
fn check_nesting(format: &str, source: &str, max_depth: usize) -> Result<(), FormatError> {
    let limit = max_depth.min(PARSER_NESTING_LIMIT);
    let bytes = source.as_bytes();
    let mut stack = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        if stack.last() == Some(&Open::Quote) {
            match bytes[i] {
                b'\\' => i += 1,
                b'"' => {
                    stack.pop();
                }
                b'$' | b'%' if next == Some(b'{') => {
                    i += 1;
                    stack.push(Open::Template);
                    depth += 1;
                }
                _ => {}
            }
        } else {
            match bytes[i] {
                b'"' => stack.push(Open::Quote),
                b'[' | b'{' | b'(' => {
                    stack.push(Open::Bracket);
                    depth += 1;
                }
                b']' | b'}' | b')' => {
                    if stack.pop().is_some() {
                        depth = depth.saturating_sub(1);
                    }
                }
                b'#' => i = line_end(bytes, i),
                b'/' if next == Some(b'/') => i = line_end(bytes, i),
                b'/' if next == Some(b'*') => {
                    i = source[i + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |end| i + 2 + end + 1);
                }
                b'<' if next == Some(b'<') => i = heredoc_end(source, i),
                _ => {}
            }
        }

        if depth > limit {
            return Err(FormatError::LimitExceeded(format!(
                "{format} input nests too deeply"
            )));
        }
        i += 1;
    }
    Ok(())
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |idx| from + idx)
}

/// Index of the last byte of a heredoc opened at `start`, or `start` when
/// the `<<` does not open one.
fn heredoc_end(source: &str, start: usize) -> usize {
    let rest = &source[start + 2..];
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let ident_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let (ident, after) = rest.split_at(ident_len);
    let Some(body) = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
    else {
        return start;
    };
    if ident.is_empty() {
        return start;
    }

    let mut offset = source.len() - body.len();
    for line in body.split_inclusive('\n') {
        offset += line.len();
        if line.trim() == ident {
            return offset - 1;
        }
    }
    source.len()
}

fn from_hcl(value: hcl::Value) -> Value {
    match value {
        hcl::Value::Null => Value::Null,
        hcl::Value::Bool(b) => Value::Bool(b),
        hcl::Value::Number(num) => match num.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(num.as_f64().unwrap_or(f64::NAN)),
        },
        hcl::Value::String(s) => Value::String(s),
        hcl::Value::Array(items) => Value::Array(items.into_iter().map(from_hcl).collect()),
        hcl::Value::Object(object) => Value::Map(
            object
                .into_iter()
                .map(|(k, v)| (k, from_hcl(v)))
                .collect::<Map>(),
        ),
    }
}
