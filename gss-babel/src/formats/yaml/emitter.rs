//! Block-style YAML writer
//!
//! Produces the layout most YAML tooling emits by default: block mappings
//! indented by the configured width, sequences under a mapping key at the
//! key's own column, and the first entry of a map inside a sequence item on
//! the `- ` line. Flow style is only used for empty containers.

use crate::formats::common::format_float;
use crate::value::{Map, Value};
use base64::Engine as _;

pub(crate) struct Emitter {
    out: String,
    indent: usize,
}

impl Emitter {
    pub fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            indent: indent.max(1),
        }
    }

    pub fn emit(mut self, value: &Value) -> String {
        match value {
            Value::Map(map) if !map.is_empty() => self.write_map(map, 0, false),
            Value::Array(items) if !items.is_empty() => self.write_seq(items, 0, false),
            other => self.write_inline(other),
        }
        self.out
    }

    fn write_map(&mut self, map: &Map, column: usize, inline_first: bool) {
        for (idx, (key, value)) in map.iter().enumerate() {
            if idx > 0 || !inline_first {
                self.pad(column);
            }
            self.out.push_str(&string_scalar(key));
            self.out.push(':');
            match value {
                Value::Map(nested) if !nested.is_empty() => {
                    self.out.push('\n');
                    self.write_map(nested, column + self.indent, false);
                }
                Value::Array(items) if !items.is_empty() => {
                    self.out.push('\n');
                    self.write_seq(items, column, false);
                }
                other => {
                    self.out.push(' ');
                    self.write_inline(other);
                }
            }
        }
    }

    fn write_seq(&mut self, items: &[Value], column: usize, inline_first: bool) {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 || !inline_first {
                self.pad(column);
            }
            self.out.push_str("- ");
            match item {
                Value::Map(map) if !map.is_empty() => self.write_map(map, column + 2, true),
                Value::Array(nested) if !nested.is_empty() => {
                    self.write_seq(nested, column + 2, true)
                }
                other => self.write_inline(other),
            }
        }
    }

    fn write_inline(&mut self, value: &Value) {
        self.out.push_str(&inline(value));
        self.out.push('\n');
    }

    fn pad(&mut self, column: usize) {
        self.out.extend(std::iter::repeat(' ').take(column));
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => float_scalar(*f),
        Value::String(s) => string_scalar(s),
        Value::Bytes(data) => format!(
            "!!binary {}",
            base64::engine::general_purpose::STANDARD.encode(data)
        ),
        Value::Array(_) => "[]".to_string(),
        Value::Map(_) => "{}".to_string(),
    }
}

fn float_scalar(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { ".inf" } else { "-.inf" }.to_string()
    } else {
        format_float(f)
    }
}

/// Renders a string, double-quoting it when a plain scalar would not read
/// back as the same string.
pub(crate) fn string_scalar(s: &str) -> String {
    if needs_quotes(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

pub(crate) fn needs_quotes(s: &str) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if is_reserved_word(s) || looks_numeric(s) || looks_like_timestamp(s) {
        return true;
    }
    if s.chars().any(|c| c.is_control() || is_special_unicode(c)) {
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    if s.starts_with("---") || s.starts_with("...") {
        return true;
    }

    let mut chars = s.chars();
    match chars.next() {
        Some(
            ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
            | '@' | '`',
        ) => true,
        Some('-' | '?' | ':') => matches!(chars.next(), None | Some(' ')),
        _ => false,
    }
}

fn is_special_unicode(c: char) -> bool {
    matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{feff}')
}

/// Words YAML 1.1 resolves to booleans or null, plus the merge key.
fn is_reserved_word(s: &str) -> bool {
    matches!(
        s,
        "y" | "Y"
            | "yes"
            | "Yes"
            | "YES"
            | "n"
            | "N"
            | "no"
            | "No"
            | "NO"
            | "true"
            | "True"
            | "TRUE"
            | "false"
            | "False"
            | "FALSE"
            | "on"
            | "On"
            | "ON"
            | "off"
            | "Off"
            | "OFF"
            | "null"
            | "Null"
            | "NULL"
            | "~"
            | "<<"
    )
}

/// Integers (decimal, hex, octal, binary, sexagesimal) and floats, including
/// the special float spellings.
fn looks_numeric(s: &str) -> bool {
    let body = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let lower = body.to_ascii_lowercase();
    if matches!(lower.as_str(), ".inf" | ".nan") {
        return true;
    }

    let digits = |t: &str, radix: u32| {
        t.chars().any(|c| c.is_digit(radix)) && t.chars().all(|c| c.is_digit(radix) || c == '_')
    };
    if let Some(hex) = lower.strip_prefix("0x") {
        return digits(hex, 16);
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return digits(oct, 8);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return digits(bin, 2);
    }
    if digits(body, 10) {
        return true;
    }
    if body.contains(':') {
        let mut parts = body.split(':');
        let head_ok = parts.next().is_some_and(|head| digits(head, 10));
        return head_ok
            && parts.all(|part| {
                let part = part.split('.').next().unwrap_or_default();
                !part.is_empty() && part.len() <= 2 && part.chars().all(|c| c.is_ascii_digit())
            });
    }
    looks_float(body)
}

fn looks_float(body: &str) -> bool {
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let digit_or_sep = |c: char| c.is_ascii_digit() || c == '_';
    let mantissa_ok = mantissa.chars().any(|c| c.is_ascii_digit())
        && mantissa.chars().filter(|&c| c == '.').count() <= 1
        && mantissa.chars().all(|c| digit_or_sep(c) || c == '.');
    if !mantissa_ok {
        return false;
    }
    match exponent {
        None => mantissa.contains('.'),
        Some(exp) => {
            let exp = exp
                .strip_prefix('-')
                .or_else(|| exp.strip_prefix('+'))
                .unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    }
}

/// `YYYY-M-D` prefixed strings resolve to timestamps.
fn looks_like_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 6
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5].is_ascii_digit()
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            }
            c if c.is_control() || is_special_unicode(c) => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
