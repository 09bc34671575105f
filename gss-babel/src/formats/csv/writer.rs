//! Column policy and row writer on top of the `csv` crate

use crate::error::FormatError;
use crate::formats::common::scalar_text;
use crate::options::EncodeOptions;
use crate::value::Map;
use ::csv::{Terminator, WriterBuilder};

/// Picks the output columns for a set of records.
///
/// An explicit header wins. With `expand_header` the columns are the union
/// of all keys in first-seen order. Otherwise every record must carry the
/// same key set as the first one.
pub(crate) fn columns(
    format: &str,
    records: &[&Map],
    options: &EncodeOptions,
) -> Result<Vec<String>, FormatError> {
    if !options.header.is_empty() {
        let dropped = records
            .iter()
            .flat_map(|record| record.keys())
            .filter(|key| !options.header.contains(key))
            .count();
        if dropped > 0 {
            tracing::warn!(format, dropped, "cells outside the explicit header are dropped");
        }
        return Ok(options.header.clone());
    }

    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let mut columns: Vec<String> = first.keys().cloned().collect();

    for (idx, record) in records.iter().enumerate().skip(1) {
        if options.expand_header {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        } else if record.len() != columns.len()
            || !record.keys().all(|key| first.contains_key(key))
        {
            return Err(FormatError::encode(
                format,
                format!(
                    "record {idx} has keys [{}] but the header is [{}]",
                    record.keys().cloned().collect::<Vec<_>>().join(", "),
                    columns.join(", ")
                ),
            ));
        }
    }
    Ok(columns)
}

/// Writes the header row followed by one row per record.
pub(crate) fn write(
    format: &str,
    delimiter: char,
    records: &[&Map],
    options: &EncodeOptions,
) -> Result<String, FormatError> {
    let columns = columns(format, records, options)?;
    if columns.is_empty() {
        return Ok(String::new());
    }

    let delimiter = super::ascii_byte(delimiter)
        .map_err(|message| FormatError::encode(format, format!("delimiter {message}")))?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(terminator(format, &options.line_separator)?)
        .from_writer(Vec::new());
    let failed = |err: ::csv::Error| FormatError::encode(format, err.to_string());

    writer
        .write_record(columns.iter().map(|column| options.key_case.apply(column)))
        .map_err(failed)?;
    for record in records {
        let cells = columns
            .iter()
            .map(|column| match record.get(column) {
                Some(value) => scalar_text(format, value, options),
                None => Ok(options.no_data_value.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        writer.write_record(&cells).map_err(failed)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| FormatError::encode(format, err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| FormatError::encode(format, err.to_string()))
}

fn terminator(format: &str, line_separator: &str) -> Result<Terminator, FormatError> {
    match line_separator.as_bytes() {
        b"\r\n" => Ok(Terminator::CRLF),
        [] => Ok(Terminator::Any(b'\n')),
        [byte] if byte.is_ascii() => Ok(Terminator::Any(*byte)),
        _ => Err(FormatError::encode(
            format,
            format!("line separator must be one ASCII character or \\r\\n, got {line_separator:?}"),
        )),
    }
}
