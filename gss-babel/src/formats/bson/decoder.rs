//! BSON document reader
//!
//! BSON is little-endian. Every document starts with its total byte length
//! (including the length itself and the trailing NUL), which is checked
//! against the input before any field is read.

use crate::error::FormatError;
use crate::value::{Map, Value};
use std::fmt::Write as _;

pub(crate) struct Decoder<'a> {
    data: &'a [u8],
    x: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            x: 0,
            max_depth,
        }
    }

    /// Reads concatenated top-level documents until the input is exhausted.
    pub fn read_all(mut self) -> Result<Vec<Value>, FormatError> {
        let mut documents = Vec::new();
        while self.x < self.data.len() {
            documents.push(Value::Map(self.read_document(1)?));
        }
        Ok(documents)
    }

    fn error(&self, message: impl std::fmt::Display) -> FormatError {
        FormatError::decode("bson", format!("{message} at offset {}", self.x))
    }

    fn check(&self, n: usize) -> Result<(), FormatError> {
        if self.x + n > self.data.len() {
            Err(self.error("unexpected end of input"))
        } else {
            Ok(())
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        self.check(n)?;
        let data = self.data;
        let bytes = &data[self.x..self.x + n];
        self.x += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn i32_le(&mut self) -> Result<i32, FormatError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn u32_le(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i64_le(&mut self) -> Result<i64, FormatError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn f64_le(&mut self) -> Result<f64, FormatError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn length(&mut self) -> Result<usize, FormatError> {
        let len = self.i32_le()?;
        usize::try_from(len).map_err(|_| self.error(format!("negative length {len}")))
    }

    fn read_document(&mut self, depth: usize) -> Result<Map, FormatError> {
        if depth > self.max_depth {
            return Err(FormatError::LimitExceeded(format!(
                "bson input nests deeper than {} levels",
                self.max_depth
            )));
        }

        let start = self.x;
        let size = self.length()?;
        if size < 5 {
            return Err(self.error(format!("document size {size} is too small")));
        }
        let end = start + size;
        if end > self.data.len() {
            return Err(self.error(format!("document size {size} exceeds the input")));
        }

        let mut fields = Map::new();
        loop {
            let element_type = self.u8()?;
            if element_type == 0 {
                break;
            }
            let key = self.read_cstring()?;
            let value = self.read_element_value(element_type, depth)?;
            fields.insert(key, value);
        }

        if self.x != end {
            return Err(self.error(format!(
                "document declared {size} bytes but used {}",
                self.x - start
            )));
        }
        Ok(fields)
    }

    fn read_cstring(&mut self) -> Result<String, FormatError> {
        let data = self.data;
        let rest = &data[self.x..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(self.error("unterminated key"));
        };
        let text = std::str::from_utf8(&rest[..len])
            .map_err(|_| self.error("key is not valid UTF-8"))?
            .to_string();
        self.x += len + 1;
        Ok(text)
    }

    fn read_string(&mut self) -> Result<String, FormatError> {
        let length = self.length()?;
        if length == 0 {
            return Err(self.error("string length must include the terminator"));
        }
        let bytes = self.take(length)?;
        let (text, terminator) = bytes.split_at(length - 1);
        if terminator != [0] {
            return Err(self.error("string is not NUL-terminated"));
        }
        std::str::from_utf8(text)
            .map(str::to_string)
            .map_err(|_| self.error("string is not valid UTF-8"))
    }

    fn read_element_value(&mut self, typ: u8, depth: usize) -> Result<Value, FormatError> {
        Ok(match typ {
            0x01 => Value::Float(self.f64_le()?),
            0x02 | 0x0d | 0x0e => Value::String(self.read_string()?),
            0x03 => Value::Map(self.read_document(depth + 1)?),
            0x04 => Value::Array(self.read_document(depth + 1)?.into_values().collect()),
            0x05 => {
                let length = self.length()?;
                let _subtype = self.u8()?;
                Value::Bytes(self.take(length)?.to_vec())
            }
            0x06 | 0x0a | 0x7f | 0xff => Value::Null,
            0x07 => Value::String(self.read_object_id()?),
            0x08 => match self.u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => return Err(self.error(format!("invalid boolean byte {other}"))),
            },
            0x09 | 0x12 => Value::Int(self.i64_le()?),
            0x0b => {
                let pattern = self.read_cstring()?;
                let flags = self.read_cstring()?;
                Value::String(format!("/{pattern}/{flags}"))
            }
            0x0c => {
                let namespace = self.read_string()?;
                let id = self.read_object_id()?;
                Value::String(format!("{namespace}.{id}"))
            }
            0x0f => {
                let _total = self.i32_le()?;
                let code = self.read_string()?;
                let scope = self.read_document(depth + 1)?;
                if !scope.is_empty() {
                    tracing::warn!(fields = scope.len(), "javascript scope dropped");
                }
                Value::String(code)
            }
            0x10 => Value::Int(i64::from(self.i32_le()?)),
            0x11 => {
                let increment = self.u32_le()?;
                let timestamp = self.u32_le()?;
                Value::Int((i64::from(timestamp) << 32) | i64::from(increment))
            }
            0x13 => Value::Bytes(self.take(16)?.to_vec()),
            t => return Err(self.error(format!("unsupported element type 0x{t:02x}"))),
        })
    }

    fn read_object_id(&mut self) -> Result<String, FormatError> {
        let bytes = self.take(12)?;
        let mut hex = String::with_capacity(24);
        for b in bytes {
            let _ = write!(hex, "{b:02x}");
        }
        Ok(hex)
    }
}
