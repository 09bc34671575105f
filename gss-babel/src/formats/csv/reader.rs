//! Row reader on top of the `csv` crate
//!
//! The crate reads quoted fields that span lines, handles `""` escapes and
//! CRLF, and skips empty lines. What it does not do is refuse a stray or
//! unterminated quote, so unless `lazy_quotes` is set every record's raw
//! span is checked for balanced quotes once the next record has been found.

use crate::error::{FormatError, Position};
use crate::options::DecodeOptions;
use ::csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use std::borrow::Cow;

/// One parsed row and the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Input with `skip_lines` applied. Comment prefixes longer than one byte
/// are not understood by the crate, so their lines are blanked here.
pub(crate) struct Source<'a> {
    text: Cow<'a, str>,
    skipped: usize,
}

impl<'a> Source<'a> {
    pub fn new(source: &'a str, options: &DecodeOptions) -> Self {
        let mut rest = source;
        let mut skipped = 0;
        while skipped < options.skip_lines && !rest.is_empty() {
            rest = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
            skipped += 1;
        }

        let text = match comment_prefix(options) {
            Some(prefix) if comment_byte(prefix).is_none() => Cow::Owned(
                rest.split_inclusive('\n')
                    .map(|line| {
                        if !line.starts_with(prefix) {
                            line
                        } else if line.ends_with('\n') {
                            "\n"
                        } else {
                            ""
                        }
                    })
                    .collect(),
            ),
            _ => Cow::Borrowed(rest),
        };
        Self { text, skipped }
    }
}

pub(crate) struct Rows<'a> {
    format: &'a str,
    text: &'a str,
    skipped: usize,
    comment: Option<&'a str>,
    strict: bool,
    reader: ::csv::Reader<&'a [u8]>,
    record: StringRecord,
    /// Byte offset and line of the last row, whose quotes are not yet checked
    unchecked: Option<(usize, usize)>,
}

impl<'a> Rows<'a> {
    pub fn new(
        format: &'a str,
        source: &'a Source<'_>,
        delimiter: char,
        options: &'a DecodeOptions,
    ) -> Result<Self, FormatError> {
        let delimiter = super::ascii_byte(delimiter)
            .map_err(|message| FormatError::decode(format, format!("delimiter {message}")))?;
        let comment = comment_prefix(options);

        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(if options.trim { Trim::All } else { Trim::None })
            .terminator(if options.drop_cr {
                Terminator::CRLF
            } else {
                Terminator::Any(b'\n')
            })
            .comment(comment.and_then(comment_byte));

        let text: &'a str = &source.text;
        Ok(Self {
            format,
            text,
            skipped: source.skipped,
            comment,
            strict: !options.lazy_quotes,
            reader: builder.from_reader(text.as_bytes()),
            record: StringRecord::new(),
            unchecked: None,
        })
    }

    pub fn next_row(&mut self) -> Result<Option<Row>, FormatError> {
        let found = self
            .reader
            .read_record(&mut self.record)
            .map_err(|err| read_error(self.format, self.skipped, &err))?;

        let offset = match (found, self.record.position()) {
            (true, Some(pos)) => usize::try_from(pos.byte()).unwrap_or(self.text.len()),
            _ => self.text.len(),
        };
        if let Some((start, line)) = self.unchecked.take() {
            self.check_quotes(start, offset, line)?;
        }
        if !found {
            return Ok(None);
        }

        // The crate reports where it started looking, which may be a blank
        // or comment line before the record itself.
        let line = self.record_line(offset);
        self.unchecked = Some((offset, line));
        Ok(Some(Row {
            line: line + self.skipped,
            fields: self.record.iter().map(str::to_string).collect(),
        }))
    }

    fn record_line(&self, offset: usize) -> usize {
        let before = &self.text[..offset.min(self.text.len())];
        let mut line = before.matches('\n').count() + 1;
        for text in self.text[before.len()..].split_inclusive('\n') {
            let body = text.trim_end_matches(['\r', '\n']);
            if !body.is_empty() && !self.is_comment(body) {
                break;
            }
            line += 1;
        }
        line
    }

    fn check_quotes(&self, start: usize, end: usize, line: usize) -> Result<(), FormatError> {
        if !self.strict {
            return Ok(());
        }
        let span = self.text.get(start..end).unwrap_or_default();
        let quotes: usize = span
            .split_inclusive('\n')
            .filter(|text| !self.is_comment(text))
            .map(|text| text.matches('"').count())
            .sum();
        if quotes % 2 == 1 {
            return Err(FormatError::decode_at(
                self.format,
                "unterminated or stray \" in record",
                Position::new(line + self.skipped, 1),
            ));
        }
        Ok(())
    }

    fn is_comment(&self, text: &str) -> bool {
        self.comment.is_some_and(|prefix| text.starts_with(prefix))
    }
}

fn comment_prefix(options: &DecodeOptions) -> Option<&str> {
    options.comment.as_deref().filter(|prefix| !prefix.is_empty())
}

fn comment_byte(prefix: &str) -> Option<u8> {
    match prefix.as_bytes() {
        [byte] if byte.is_ascii() => Some(*byte),
        _ => None,
    }
}

fn read_error(format: &str, skipped: usize, err: &::csv::Error) -> FormatError {
    match err.position() {
        Some(pos) => FormatError::decode_at(
            format,
            err.to_string(),
            Position::new(usize::try_from(pos.line()).unwrap_or(usize::MAX) + skipped, 1),
        ),
        None => FormatError::decode(format, err.to_string()),
    }
}
