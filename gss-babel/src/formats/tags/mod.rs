//! Tags: one record per line of space-separated `key=value` pairs
//!
//! ```text
//! host=web-1 port=8080 note="two words"
//! ```
//!
//! Values may be double-quoted; quoted values keep `\\`, `\"`, `\n`, `\t`
//! and `\r` escapes. The `=` between key and value is configurable on both
//! sides through `key_value_separator`.

use crate::coerce::{infer_field, infer_scalar};
use crate::error::{FormatError, Position};
use crate::format::{input_text, Capabilities, Format, SerializedDocument};
use crate::formats::common::{self, scalar_text};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::schema::Schema;
use crate::value::{Map, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct TagsFormat;

impl Format for TagsFormat {
    fn name(&self) -> &str {
        "tags"
    }

    fn description(&self) -> &str {
        "Space-separated key=value records, one per line"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tags"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            streaming: true,
            ordered_keys: true,
            comments: true,
            binary: false,
        }
    }

    fn supports_decoding(&self) -> bool {
        true
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn decode(&self, input: &[u8], options: &DecodeOptions) -> Result<Payload, FormatError> {
        let source = input_text(self.name(), input)?;
        let separator = key_value_separator(&options.key_value_separator);
        let mut records = Vec::new();
        for line in common::lines(source, options) {
            if options.limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }
            if line.text.trim().is_empty() {
                continue;
            }
            let map = parse_line(line.text, separator, options.schema.as_ref()).map_err(
                |(offset, message)| {
                    let column = Position::from_offset(line.text, offset).column;
                    FormatError::decode_at(self.name(), message, Position::new(line.number, column))
                },
            )?;
            records.push(Value::Map(map));
        }
        Ok(Payload::stream(records))
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let mut records = common::map_records(self.name(), payload.records())?;
        common::apply_limit(&mut records, options.limit);

        let separator = key_value_separator(&options.key_value_separator);
        let mut lines = Vec::with_capacity(records.len());
        for record in records {
            let mut pairs = Vec::with_capacity(record.len());
            for (key, value) in record {
                let key = options.key_case.apply(key);
                if key.is_empty()
                    || key.contains(separator)
                    || key.contains(|c: char| c.is_whitespace() || c == '"')
                {
                    return Err(FormatError::encode(
                        self.name(),
                        format!("key {key:?} cannot be written as a tag"),
                    ));
                }
                let mut text = scalar_text(self.name(), value, options)?;
                let is_string = matches!(value, Value::String(_));
                if is_string {
                    text = options.value_case.apply(&text);
                }
                pairs.push(format!(
                    "{key}{separator}{}",
                    render_value(&text, is_string)
                ));
            }
            lines.push(pairs.join(" "));
        }
        Ok(SerializedDocument::Text(lines.join(&options.line_separator)))
    }
}

fn key_value_separator(configured: &str) -> &str {
    if configured.is_empty() {
        "="
    } else {
        configured
    }
}

/// Parses one line into a map. Errors carry the byte offset they refer to.
fn parse_line(
    line: &str,
    separator: &str,
    schema: Option<&Schema>,
) -> Result<Map, (usize, String)> {
    let mut map = Map::new();
    let mut pos = 0;

    loop {
        pos += line[pos..].len() - line[pos..].trim_start().len();
        if pos == line.len() {
            break;
        }

        let start = pos;
        let rest = &line[start..];
        let key = match rest.find(separator) {
            Some(idx) if !rest[..idx].contains(char::is_whitespace) => &rest[..idx],
            _ => {
                let token = rest.split_whitespace().next().unwrap_or_default();
                return Err((start, format!("expected key{separator}value, got {token:?}")));
            }
        };
        if key.is_empty() {
            return Err((start, "empty key".to_string()));
        }
        pos += key.len() + separator.len();

        let value = match line[pos..].strip_prefix('"') {
            Some(quoted) => {
                let (value, used) =
                    unquote(quoted).map_err(|message| (start, format!("{message} for {key:?}")))?;
                pos += 1 + used;
                Value::String(value)
            }
            None => {
                let raw = line[pos..].split(char::is_whitespace).next().unwrap_or_default();
                pos += raw.len();
                infer_field(schema, key, raw)
            }
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

/// Reads a quoted value up to its closing quote. Returns the value and the
/// bytes consumed, closing quote included.
fn unquote(text: &str) -> Result<(String, usize), String> {
    let mut value = String::new();
    let mut chars = text.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Ok((value, idx + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, other)) => value.push(other),
                None => return Err("dangling escape".to_string()),
            },
            c => value.push(c),
        }
    }
    Err("unterminated quoted value".to_string())
}

/// Quotes values that would otherwise split, run together, or read back
/// as a different type.
fn render_value(text: &str, is_string: bool) -> String {
    let needs_quotes = text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c == '\\')
        || (is_string && !matches!(infer_scalar(text), Value::String(_)));
    if !needs_quotes {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
