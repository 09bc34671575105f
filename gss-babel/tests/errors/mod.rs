//! Failure modes
//!
//! Every failure surfaces as a `FormatError`; nothing panics and no partial
//! output is produced.

use gss_babel::{
    convert, ConvertOptions, FormatError, FormatRegistry, Limits, Position, Schema,
};
use pretty_assertions::assert_eq;

fn fail(input: &[u8], from: &str, to: &str) -> FormatError {
    convert(input, from, to, None, &ConvertOptions::default())
        .expect_err("conversion should fail")
}

#[test]
fn test_unknown_format_on_either_side() {
    assert_eq!(
        fail(b"{}", "xml", "json"),
        FormatError::UnknownFormat("xml".to_string())
    );
    assert_eq!(
        fail(b"{}", "json", "ini"),
        FormatError::UnknownFormat("ini".to_string())
    );
    assert_eq!(
        fail(b"{}", "json", "ini").to_string(),
        "Format 'ini' not found"
    );
}

#[test]
fn test_unsupported_directions() {
    assert_eq!(
        fail(b"x", "go", "json"),
        FormatError::NotSupported {
            format: "go".to_string(),
            operation: "decoding",
        }
    );
    assert_eq!(
        fail(b"{}", "json", "hcl"),
        FormatError::NotSupported {
            format: "hcl".to_string(),
            operation: "encoding",
        }
    );
}

#[test]
fn test_decode_errors_carry_positions() {
    match fail(b"{\n  \"a\": tru\n}", "json", "yaml") {
        FormatError::Decode {
            format, position, ..
        } => {
            assert_eq!(format, "json");
            assert_eq!(position.map(|p| p.line), Some(2));
        }
        other => panic!("expected a decode error, got {other:?}"),
    }

    match fail(b"a,b\n1,2,3\n", "csv", "json") {
        FormatError::Decode {
            message, position, ..
        } => {
            assert_eq!(message, "record has 3 fields, header has 2");
            assert_eq!(position, Some(Position::new(2, 1)));
        }
        other => panic!("expected a decode error, got {other:?}"),
    }

    match fail(b"{\"a\":1}\n{oops}\n", "jsonl", "json") {
        FormatError::Decode { position, .. } => {
            assert_eq!(position.map(|p| p.line), Some(2));
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn test_malformed_inputs_per_format() {
    let cases: &[(&[u8], &str)] = &[
        (b"a: [1, 2", "yaml"),
        (b"a = ", "toml"),
        (b"a,\"b\nx,y\n", "csv"),
        (b"a=\"open", "tags"),
        (b"key=\\u12", "properties"),
        (b"block {", "hcl2"),
        (b"\x05\x00\x00", "bson"),
        (b"\xff\xfe", "json"),
    ];
    for (input, from) in cases {
        let err = fail(input, from, "json");
        assert_eq!(err.kind(), "DecodeError", "{from}: {err}");
    }
}

#[test]
fn test_encode_errors() {
    // TOML needs a table at the top
    assert_eq!(fail(b"[1,2]", "json", "toml").kind(), "EncodeError");
    // and has no null
    let err = fail(br#"{"a":{"b":null}}"#, "json", "toml");
    assert_eq!(err.kind(), "EncodeError");
    assert!(err.to_string().contains("a.b"), "{err}");
    // CSV records must agree on their keys unless the header expands
    assert_eq!(fail(br#"[{"a":1},{"b":2}]"#, "json", "csv").kind(), "EncodeError");
    // BSON documents are maps
    assert_eq!(fail(b"[1]", "json", "bson").kind(), "EncodeError");
    // Properties hold exactly one flat map
    assert_eq!(fail(b"[{\"a\":1},{\"a\":2}]", "json", "properties").kind(), "EncodeError");
}

#[test]
fn test_expand_header_accepts_divergent_keys() {
    let mut options = ConvertOptions::default();
    options.output.expand_header = true;
    let out = convert(br#"[{"a":1},{"b":2}]"#, "json", "csv", None, &options).unwrap();
    assert_eq!(out.as_text(), Some("a,b\n1,\n,2\n"));
}

#[test]
fn test_limits() {
    let options = ConvertOptions {
        limits: Limits {
            max_depth: 8,
            max_input_bytes: 1024,
        },
        ..ConvertOptions::default()
    };

    let deep = format!("{}{}", "[".repeat(9), "]".repeat(9));
    let err = convert(deep.as_bytes(), "json", "json", None, &options).unwrap_err();
    assert_eq!(err.kind(), "LimitExceeded");

    let big = vec![b' '; 2048];
    let err = convert(&big, "json", "json", None, &options).unwrap_err();
    assert_eq!(err.kind(), "LimitExceeded");
}

#[test]
fn test_pathological_nesting_does_not_overflow() {
    let options = ConvertOptions::default();
    let deep = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
    for from in ["json", "jsonl", "yaml"] {
        let err = convert(deep.as_bytes(), from, "json", None, &options).unwrap_err();
        assert_eq!(err.kind(), "LimitExceeded", "{from}: {err}");
    }

    let assigned = format!("a = {deep}");
    for from in ["toml", "hcl", "hcl2"] {
        let err = convert(assigned.as_bytes(), from, "json", None, &options).unwrap_err();
        assert_eq!(err.kind(), "LimitExceeded", "{from}: {err}");
    }
}

#[test]
fn test_shallow_hcl_nesting_past_the_limit() {
    let options = ConvertOptions::default();
    let input = format!("a = {}{}", "[".repeat(150), "]".repeat(150));
    for from in ["hcl", "hcl2"] {
        let err = convert(input.as_bytes(), from, "json", None, &options).unwrap_err();
        assert_eq!(
            err,
            FormatError::LimitExceeded(format!("{from} input nests too deeply"))
        );
    }
}

#[test]
fn test_schema_errors_name_the_field() {
    let schema: Schema = "age=int".parse().unwrap();
    let err = convert(
        b"age\nold\n",
        "csv",
        "json",
        Some(&schema),
        &ConvertOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), "SchemaError");
    assert!(err.to_string().starts_with("Schema error for field 'age'"));
}

#[test]
fn test_every_pair_fails_cleanly_on_garbage() {
    let registry = FormatRegistry::global();
    let garbage: &[u8] = b"\x00\x01{[\"=:\n\t\xc3";
    for source in registry.iter().filter(|f| f.supports_decoding()) {
        for target in registry.iter().filter(|f| f.supports_encoding()) {
            let result = convert(
                garbage,
                source.name(),
                target.name(),
                None,
                &ConvertOptions::default(),
            );
            assert!(result.is_err(), "{} -> {}", source.name(), target.name());
        }
    }
}
