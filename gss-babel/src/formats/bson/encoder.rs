//! BSON document writer
//!
//! Documents are written with a placeholder length that is patched once the
//! body is complete. All multi-byte numbers are little-endian.

use crate::error::FormatError;
use crate::value::{Map, Value};

pub(crate) struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Appends one top-level document.
    pub fn write_document(&mut self, map: &Map) -> Result<(), FormatError> {
        self.document(map.iter().map(|(k, v)| (k.as_str().into(), v)))
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn document<'v, I>(&mut self, fields: I) -> Result<(), FormatError>
    where
        I: Iterator<Item = (std::borrow::Cow<'v, str>, &'v Value)>,
    {
        let start = self.buf.len();
        self.buf.extend_from_slice(&[0; 4]);
        for (key, value) in fields {
            self.element(&key, value)?;
        }
        self.buf.push(0);

        let size = i32::try_from(self.buf.len() - start)
            .map_err(|_| FormatError::encode("bson", "document exceeds the 2 GiB size limit"))?;
        self.buf[start..start + 4].copy_from_slice(&size.to_le_bytes());
        Ok(())
    }

    fn element(&mut self, key: &str, value: &Value) -> Result<(), FormatError> {
        match value {
            Value::Null => self.header(0x0a, key)?,
            Value::Bool(b) => {
                self.header(0x08, key)?;
                self.buf.push(u8::from(*b));
            }
            Value::Int(i) => match i32::try_from(*i) {
                Ok(small) => {
                    self.header(0x10, key)?;
                    self.buf.extend_from_slice(&small.to_le_bytes());
                }
                Err(_) => {
                    self.header(0x12, key)?;
                    self.buf.extend_from_slice(&i.to_le_bytes());
                }
            },
            Value::Float(f) => {
                self.header(0x01, key)?;
                self.buf.extend_from_slice(&f.to_le_bytes());
            }
            Value::String(s) => {
                self.header(0x02, key)?;
                self.write_string(s)?;
            }
            Value::Bytes(data) => {
                self.header(0x05, key)?;
                self.write_len(data.len())?;
                self.buf.push(0x00);
                self.buf.extend_from_slice(data);
            }
            Value::Array(items) => {
                self.header(0x04, key)?;
                self.document(
                    items
                        .iter()
                        .enumerate()
                        .map(|(idx, item)| (idx.to_string().into(), item)),
                )?;
            }
            Value::Map(map) => {
                self.header(0x03, key)?;
                self.document(map.iter().map(|(k, v)| (k.as_str().into(), v)))?;
            }
        }
        Ok(())
    }

    fn header(&mut self, element_type: u8, key: &str) -> Result<(), FormatError> {
        if key.contains('\0') {
            return Err(FormatError::encode(
                "bson",
                format!("key {key:?} contains a NUL byte"),
            ));
        }
        self.buf.push(element_type);
        self.buf.extend_from_slice(key.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> Result<(), FormatError> {
        self.write_len(s.len() + 1)?;
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<(), FormatError> {
        let len = i32::try_from(len)
            .map_err(|_| FormatError::encode("bson", "value exceeds the 2 GiB size limit"))?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        Ok(())
    }
}
