//! Document / stream cardinality across formats

use gss_babel::{convert, Cardinality, ConvertOptions, DecodeOptions, FormatRegistry, Value};
use pretty_assertions::assert_eq;

fn text(input: &str, from: &str, to: &str) -> String {
    convert(input.as_bytes(), from, to, None, &ConvertOptions::default())
        .unwrap_or_else(|err| panic!("{from} -> {to} failed: {err}"))
        .as_text()
        .expect("text output")
        .to_string()
}

fn cardinality(input: &[u8], format: &str) -> (Cardinality, usize) {
    let payload = FormatRegistry::global()
        .get(format)
        .unwrap()
        .decode(input, &DecodeOptions::default())
        .unwrap();
    (payload.cardinality(), payload.values().len())
}

#[test]
fn test_record_formats_decode_streams() {
    assert_eq!(cardinality(b"a,b\n1,2\n3,4\n", "csv"), (Cardinality::Stream, 2));
    assert_eq!(cardinality(b"a\tb\n1\t2\n", "tsv"), (Cardinality::Stream, 1));
    assert_eq!(cardinality(b"{\"a\":1}\n{\"a\":2}\n", "jsonl"), (Cardinality::Stream, 2));
    assert_eq!(cardinality(b"a=1\nb=2\n", "tags"), (Cardinality::Stream, 2));
}

#[test]
fn test_document_formats_decode_documents() {
    assert_eq!(cardinality(b"[1,2,3]", "json"), (Cardinality::Document, 1));
    assert_eq!(cardinality(b"a = 1\n", "toml"), (Cardinality::Document, 1));
    assert_eq!(cardinality(b"a=1\nb=2\n", "properties"), (Cardinality::Document, 1));
    assert_eq!(cardinality(b"a: 1\n", "yaml"), (Cardinality::Document, 1));
}

#[test]
fn test_multi_document_yaml_is_a_stream() {
    assert_eq!(cardinality(b"a: 1\n---\na: 2\n", "yaml"), (Cardinality::Stream, 2));
    assert_eq!(text("a: 1\n---\na: 2\n", "yaml", "json"), r#"[{"a":1},{"a":2}]"#);
    assert_eq!(text("a: 1\n---\na: 2\n", "yaml", "jsonl"), "{\"a\":1}\n{\"a\":2}\n");
}

#[test]
fn test_stream_into_document_format_is_an_array() {
    assert_eq!(
        text("{\"a\":1}\n{\"a\":2}\n", "jsonl", "json"),
        r#"[{"a":1},{"a":2}]"#
    );
    assert_eq!(
        text("a=1 b=x\na=2\n", "tags", "yaml"),
        "- a: 1\n  b: x\n- a: 2\n"
    );
}

#[test]
fn test_document_array_explodes_into_records() {
    assert_eq!(
        text(r#"[{"a":1},{"a":2}]"#, "json", "jsonl"),
        "{\"a\":1}\n{\"a\":2}\n"
    );
    assert_eq!(text(r#"[{"a":1},{"a":2}]"#, "json", "csv"), "a\n1\n2\n");
    assert_eq!(text(r#"[{"a":1},{"a":2}]"#, "json", "tags"), "a=1\na=2");
}

#[test]
fn test_single_document_is_one_record() {
    assert_eq!(text(r#"{"a":1,"b":2}"#, "json", "jsonl"), "{\"a\":1,\"b\":2}\n");
    assert_eq!(text(r#"{"a":1,"b":2}"#, "json", "csv"), "a,b\n1,2\n");
}

#[test]
fn test_single_record_stream_stays_an_array() {
    assert_eq!(text("a=1\n", "tags", "json"), r#"[{"a":1}]"#);
    assert_eq!(text("a\n1\n", "csv", "json"), r#"[{"a":1}]"#);
}

#[test]
fn test_empty_streams() {
    assert_eq!(cardinality(b"", "jsonl"), (Cardinality::Stream, 0));
    assert_eq!(cardinality(b"\n\n", "tags"), (Cardinality::Stream, 0));
    assert_eq!(text("", "jsonl", "json"), "[]");
}

#[test]
fn test_bson_document_sequence() {
    let options = ConvertOptions::default();
    let bson = convert(b"{\"a\":1}\n{\"a\":2}\n", "jsonl", "bson", None, &options).unwrap();
    assert_eq!(cardinality(bson.as_bytes(), "bson"), (Cardinality::Stream, 2));
    let back = convert(bson.as_bytes(), "bson", "jsonl", None, &options).unwrap();
    assert_eq!(back.as_text(), Some("{\"a\":1}\n{\"a\":2}\n"));
}

#[test]
fn test_record_limits() {
    let mut options = ConvertOptions::default();
    options.input.limit = Some(2);
    let out = convert(b"a\n1\n2\n3\n", "csv", "json", None, &options).unwrap();
    assert_eq!(out.as_text(), Some(r#"[{"a":1},{"a":2}]"#));

    let mut options = ConvertOptions::default();
    options.output.limit = Some(1);
    let out = convert(b"[{\"a\":1},{\"a\":2}]", "json", "jsonl", None, &options).unwrap();
    assert_eq!(out.as_text(), Some("{\"a\":1}\n"));
}

#[test]
fn test_scalar_document_into_record_format() {
    let payload = FormatRegistry::global()
        .get("jsonl")
        .unwrap()
        .decode(b"1\n\"x\"\n", &DecodeOptions::default())
        .unwrap();
    assert_eq!(payload.values(), &[Value::Int(1), Value::from("x")]);
    assert_eq!(text("1\n\"x\"\n", "jsonl", "json"), r#"[1,"x"]"#);
}
