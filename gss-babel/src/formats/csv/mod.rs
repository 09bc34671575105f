//! Delimiter-separated values: CSV and TSV
//!
//! Both formats share one implementation parameterized by the delimiter and
//! built on the `csv` crate. Rows decode to a stream of maps keyed by the
//! header row; every cell goes through
//! [`infer_field`](crate::coerce::infer_field). Empty lines are always
//! skipped.

mod reader;
mod writer;

use crate::coerce::infer_field;
use crate::error::{FormatError, Position};
use crate::format::{input_text, Capabilities, Format, SerializedDocument};
use crate::formats::common;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::payload::Payload;
use crate::value::{Map, Value};
use reader::{Rows, Source};

#[derive(Debug, Clone, Copy)]
pub struct DelimitedFormat {
    name: &'static str,
    description: &'static str,
    extensions: &'static [&'static str],
    delimiter: char,
}

impl DelimitedFormat {
    pub const fn csv() -> Self {
        Self {
            name: "csv",
            description: "Comma-separated values",
            extensions: &["csv"],
            delimiter: ',',
        }
    }

    pub const fn tsv() -> Self {
        Self {
            name: "tsv",
            description: "Tab-separated values",
            extensions: &["tsv"],
            delimiter: '\t',
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl Format for DelimitedFormat {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn file_extensions(&self) -> &[&str] {
        self.extensions
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
        let text = input_text(self.name, input)?;
        let delimiter = options.delimiter.unwrap_or(self.delimiter);
        let source = Source::new(text, options);
        let mut rows = Rows::new(self.name, &source, delimiter, options)?;

        let header = if options.header.is_empty() {
            match rows.next_row()? {
                Some(row) => row.fields,
                None => return Ok(Payload::stream(Vec::new())),
            }
        } else {
            options.header.clone()
        };
        check_header(self.name, &header)?;

        let schema = options.schema.as_ref();
        let mut records = Vec::new();
        while let Some(row) = rows.next_row()? {
            if options.limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }
            if row.fields.len() != header.len() {
                return Err(FormatError::decode_at(
                    self.name,
                    format!(
                        "record has {} fields, header has {}",
                        row.fields.len(),
                        header.len()
                    ),
                    Position::new(row.line, 1),
                ));
            }
            let map: Map = header
                .iter()
                .zip(&row.fields)
                .map(|(key, cell)| (key.clone(), infer_field(schema, key, cell)))
                .collect();
            records.push(Value::Map(map));
        }

        tracing::trace!(format = self.name, records = records.len(), "decoded rows");
        Ok(Payload::stream(records))
    }

    fn encode(
        &self,
        payload: &Payload,
        options: &EncodeOptions,
    ) -> Result<SerializedDocument, FormatError> {
        let delimiter = options.delimiter.unwrap_or(self.delimiter);
        let mut records = common::map_records(self.name, payload.records())?;
        common::apply_limit(&mut records, options.limit);
        let text = writer::write(self.name, delimiter, &records, options)?;
        Ok(SerializedDocument::Text(text))
    }
}

/// The `csv` crate works on bytes, so delimiters must be ASCII.
fn ascii_byte(c: char) -> Result<u8, String> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| format!("must be an ASCII character, got {c:?}"))
}

fn check_header(format: &str, header: &[String]) -> Result<(), FormatError> {
    for (idx, key) in header.iter().enumerate() {
        if header[..idx].contains(key) {
            return Err(FormatError::decode_at(
                format,
                format!("duplicate header field '{key}'"),
                Position::new(1, 1),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(format: DelimitedFormat, input: &str, options: &DecodeOptions) -> Payload {
        format.decode(input.as_bytes(), options).unwrap()
    }

    #[test]
    fn test_decode_rows_with_inference() {
        let payload = decode(
            DelimitedFormat::csv(),
            "name,age,score,ok\nann,31,1.5,TRUE\n",
            &DecodeOptions::default(),
        );
        assert!(payload.is_stream());
        assert_eq!(
            payload.values(),
            &[Value::from_pairs([
                ("name", Value::from("ann")),
                ("age", Value::Int(31)),
                ("score", Value::Float(1.5)),
                ("ok", Value::Bool(true)),
            ])]
        );
    }

    #[test]
    fn test_tsv_uses_tab() {
        let payload = decode(DelimitedFormat::tsv(), "a\tb\nx\ty\n", &DecodeOptions::default());
        assert_eq!(
            payload.values(),
            &[Value::from_pairs([("a", "x"), ("b", "y")])]
        );
    }

    #[test]
    fn test_explicit_header_treats_first_row_as_data() {
        let options = DecodeOptions {
            header: vec!["k".into(), "v".into()],
            ..DecodeOptions::default()
        };
        let payload = decode(DelimitedFormat::csv(), "a,b\n", &options);
        assert_eq!(
            payload.values(),
            &[Value::from_pairs([("k", "a"), ("v", "b")])]
        );
    }

    #[test]
    fn test_field_count_mismatch_reports_line() {
        let err = DelimitedFormat::csv()
            .decode(b"a,b\n1,2\n3\n", &DecodeOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            FormatError::decode_at("csv", "record has 1 fields, header has 2", Position::new(3, 1))
        );
    }

    #[test]
    fn test_string_hint_keeps_cell_text() {
        let options = DecodeOptions {
            schema: Some("v=string,w=string,b=string".parse().unwrap()),
            ..DecodeOptions::default()
        };
        let payload = decode(DelimitedFormat::csv(), "v,w,b,n\n1.50,+7,TRUE,1.50\n", &options);
        assert_eq!(
            payload.values(),
            &[Value::from_pairs([
                ("v", Value::from("1.50")),
                ("w", Value::from("+7")),
                ("b", Value::from("TRUE")),
                ("n", Value::Float(1.5)),
            ])]
        );
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let err = DelimitedFormat::csv()
            .decode(b"a,a\n1,2\n", &DecodeOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate header field 'a'"));
    }

    #[test]
    fn test_decode_limit() {
        let options = DecodeOptions {
            limit: Some(1),
            ..DecodeOptions::default()
        };
        let payload = decode(DelimitedFormat::csv(), "a\n1\n2\n", &options);
        assert_eq!(payload.values().len(), 1);
    }

    #[test]
    fn test_empty_input_is_empty_stream() {
        let payload = decode(DelimitedFormat::csv(), "", &DecodeOptions::default());
        assert_eq!(payload.record_count(), 0);
    }

    #[test]
    fn test_encode_nested_cells_as_json() {
        let payload = Payload::document(Value::from_pairs([
            ("a", Value::Array(vec![Value::Int(1), Value::Int(2)])),
            ("b", Value::Null),
        ]));
        let out = DelimitedFormat::csv()
            .encode(&payload, &EncodeOptions::default())
            .unwrap();
        assert_eq!(out.as_text(), Some("a,b\n\"[1,2]\",\n"));
    }

    #[test]
    fn test_encode_rejects_non_map_records() {
        let payload = Payload::document(Value::Array(vec![Value::Int(1)]));
        let err = DelimitedFormat::csv()
            .encode(&payload, &EncodeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "EncodeError");
    }
}
