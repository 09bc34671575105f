//! Java-style `.properties` files
//!
//! Decoding follows the `java.util.Properties` line grammar: `#` and `!`
//! comments, backslash line continuations, and `=`, `:` or whitespace as
//! the key terminator. The result is a single flat map.
//!
//! Values carry no type markers. A string that reads as a number or a
//! boolean (`"12"`, `"true"`) is written bare and decodes as `Int` or
//! `Bool`, unless a `string` schema hint names the key.

use crate::coerce::infer_field;
use crate::error::{FormatError, Position};
use crate::format::{input_text, Capabilities, Format, SerializedDocument};
use crate::formats::common::{self, scalar_text};
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::{Map, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesFormat;

impl Format for PropertiesFormat {
    fn name(&self) -> &str {
        "properties"
    }

    fn description(&self) -> &str {
        "Java properties file"
    }

    fn file_extensions(&self) -> &[&str] {
        &["properties"]
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

    fn decode(&self, input: &[u8], options: &DecodeOptions) -> Result<Payload, FormatError> {
        let source = input_text(self.name(), input)?;
        let mut map = Map::new();
        for (line, text) in logical_lines(source, options) {
            let (raw_key, raw_value) = split_entry(&text);
            let key = unescape(raw_key).map_err(|msg| error_at(line, msg))?;
            let value = unescape(raw_value).map_err(|msg| error_at(line, msg))?;
            let value = infer_field(options.schema.as_ref(), &key, &value);
            map.insert(key, value);
        }
        Ok(Payload::document(Value::Map(map)))
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let records = common::map_records(self.name(), payload.records())?;
        let [record] = records.as_slice() else {
            return Err(FormatError::encode(
                self.name(),
                format!("expected a single map, got {} records", records.len()),
            ));
        };

        let mut lines = Vec::with_capacity(record.len());
        for (key, value) in record.iter() {
            let mut text = scalar_text(self.name(), value, options)?;
            if matches!(value, Value::String(_)) {
                text = options.value_case.apply(&text);
            }
            lines.push(format!(
                "{}{}{}",
                escape_key(&options.key_case.apply(key)),
                options.key_value_separator,
                escape_value(&text, options)
            ));
        }
        Ok(SerializedDocument::Text(lines.join(&options.line_separator)))
    }
}

fn error_at(line: usize, message: String) -> FormatError {
    FormatError::decode_at("properties", message, Position::new(line, 1))
}

/// Joins continuation lines and drops blanks and comments, yielding each
/// entry with the line it started on.
fn logical_lines(source: &str, options: &DecodeOptions) -> Vec<(usize, String)> {
    let separator = if options.line_separator.is_empty() {
        "\n"
    } else {
        options.line_separator.as_str()
    };

    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;
    for (idx, raw) in source.split(separator).enumerate().skip(options.skip_lines) {
        let raw = if options.drop_cr {
            raw.strip_suffix('\r').unwrap_or(raw)
        } else {
            raw
        };
        let text = raw.trim_start_matches([' ', '\t', '\u{c}']);

        let (start, mut joined) = match pending.take() {
            Some((start, prefix)) => (start, prefix),
            None => {
                if text.is_empty()
                    || text.starts_with(['#', '!'])
                    || common::is_comment(text, options)
                {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if continues(text) {
            joined.push_str(&text[..text.len() - 1]);
            pending = Some((start, joined));
        } else {
            joined.push_str(text);
            out.push((start, joined));
        }
    }
    if let Some(entry) = pending {
        out.push(entry);
    }
    out
}

/// A line continues when it ends in an odd number of backslashes.
fn continues(text: &str) -> bool {
    text.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Splits an entry at the first unescaped `=`, `:` or whitespace.
fn split_entry(text: &str) -> (&str, &str) {
    let mut key_end = text.len();
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = idx;
                break;
            }
            _ => {}
        }
    }

    let key = &text[..key_end];
    let mut rest = text[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\u{c}']);
    }
    (key, rest)
}

fn unescape(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .ok_or_else(|| format!("malformed \\u escape '\\u{hex}'"))?;
                let decoded = char::from_u32(code)
                    .ok_or_else(|| format!("\\u{hex} is not a valid character"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (idx, c) in key.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '=' | ':' | ' ' => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if idx == 0 => {
                out.push('\\');
                out.push(c);
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out
}

fn escape_value(value: &str, options: &EncodeOptions) -> String {
    let mut out = String::with_capacity(value.len());
    for (idx, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if idx == 0 || options.escape_space => out.push_str("\\ "),
            '=' if options.escape_equal => out.push_str("\\="),
            ':' if options.escape_colon => out.push_str("\\:"),
            '\n' if options.escape_new_line => out.push_str("\\n"),
            '\r' if options.escape_new_line => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            c => out.push(c),
        }
    }
    out
}
