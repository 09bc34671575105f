//! Go literal output
//!
//! Renders the IR as a Go composite literal in the style of `%#v` applied to
//! decoded `interface {}` values:
//!
//! ```text
//! map[string]interface {}{"a":"x", "n":[]interface {}{1, 2.5}}
//! ```
//!
//! Encode only.

use crate::error::FormatError;
use crate::format::{Capabilities, Format, SerializedDocument};
use crate::formats::common::format_float;
use crate::options::EncodeOptions;
use crate::payload::Payload;
use crate::value::{Value, ValueVisitor};
use std::fmt::Write as _;

#[derive(Debug, Default, Clone, Copy)]
pub struct GoFormat;

impl Format for GoFormat {
    fn name(&self) -> &str {
        "go"
    }

    fn description(&self) -> &str {
        "Go composite literal (write only)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["go"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            ordered_keys: true,
            binary: true,
            ..Capabilities::default()
        }
    }

    fn supports_encoding(&self) -> bool {
        true
    }

    fn encode(
        &self,
        payload: &Payload,
        _options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let mut writer = GoWriter::default();
        payload.to_document().walk(&mut writer)?;
        Ok(SerializedDocument::Text(writer.out))
    }
}

#[derive(Default)]
struct GoWriter {
    out: String,
}

impl ValueVisitor for GoWriter {
    type Error = FormatError;

    fn visit_scalar(&mut self, value: &Value) -> Result<(), FormatError> {
        match value {
            Value::Null => self.out.push_str("interface {}(nil)"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => self.out.push_str(&i.to_string()),
            Value::Float(f) => self.out.push_str(&format_float(*f)),
            Value::String(s) => go_quote(&mut self.out, s),
            Value::Bytes(data) => {
                self.out.push_str("[]byte{");
                for (idx, b) in data.iter().enumerate() {
                    if idx > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = write!(self.out, "0x{b:x}");
                }
                self.out.push('}');
            }
            Value::Array(_) | Value::Map(_) => {}
        }
        Ok(())
    }

    fn enter_array(&mut self, _len: usize) -> Result<(), FormatError> {
        self.out.push_str("[]interface {}{");
        Ok(())
    }

    fn visit_index(&mut self, index: usize) -> Result<(), FormatError> {
        if index > 0 {
            self.out.push_str(", ");
        }
        Ok(())
    }

    fn exit_array(&mut self) -> Result<(), FormatError> {
        self.out.push('}');
        Ok(())
    }

    fn enter_map(&mut self, _len: usize) -> Result<(), FormatError> {
        self.out.push_str("map[string]interface {}{");
        Ok(())
    }

    fn visit_key(&mut self, index: usize, key: &str) -> Result<(), FormatError> {
        if index > 0 {
            self.out.push_str(", ");
        }
        go_quote(&mut self.out, key);
        self.out.push(':');
        Ok(())
    }

    fn exit_map(&mut self) -> Result<(), FormatError> {
        self.out.push('}');
        Ok(())
    }
}

/// Writes `s` as a Go interpreted string literal.
fn go_quote(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
