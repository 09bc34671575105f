//! Reference conversions
//!
//! Byte-exact outputs for the sample inputs every release must reproduce.

use gss_babel::{convert, ConvertOptions, SerializedDocument};
use pretty_assertions::assert_eq;

const CSV_INPUT: &str = "a,b,c\nx,y,z\n";
const JSON_INPUT: &str = r#"{"a":"x","b":"y","c":"z"}"#;

fn sorted(input: &[u8], from: &str, to: &str) -> SerializedDocument {
    convert(input, from, to, None, &ConvertOptions::sorted())
        .unwrap_or_else(|err| panic!("{from} -> {to} failed: {err}"))
}

fn sorted_text(input: &str, from: &str, to: &str) -> String {
    sorted(input.as_bytes(), from, to)
        .as_text()
        .expect("text output")
        .to_string()
}

#[test]
fn test_csv_to_json() {
    assert_eq!(
        sorted_text(CSV_INPUT, "csv", "json"),
        r#"[{"a":"x","b":"y","c":"z"}]"#
    );
}

#[test]
fn test_csv_to_tsv() {
    assert_eq!(sorted_text(CSV_INPUT, "csv", "tsv"), "a\tb\tc\nx\ty\tz\n");
}

#[test]
fn test_csv_to_yaml() {
    assert_eq!(
        sorted_text(CSV_INPUT, "csv", "yaml"),
        "- a: x\n  b: \"y\"\n  c: z\n"
    );
}

#[test]
fn test_json_to_properties() {
    assert_eq!(
        sorted_text(JSON_INPUT, "json", "properties"),
        "a=x\nb=y\nc=z"
    );
}

#[test]
fn test_json_to_tags_and_back() {
    let tags = sorted_text(JSON_INPUT, "json", "tags");
    assert_eq!(tags, "a=x b=y c=z");
    assert_eq!(
        sorted_text(&tags, "tags", "json"),
        r#"[{"a":"x","b":"y","c":"z"}]"#
    );
}

#[test]
fn test_json_to_toml() {
    assert_eq!(
        sorted_text(JSON_INPUT, "json", "toml"),
        "a = \"x\"\nb = \"y\"\nc = \"z\"\n"
    );
}

#[test]
fn test_json_to_yaml() {
    assert_eq!(sorted_text(JSON_INPUT, "json", "yaml"), "a: x\nb: \"y\"\nc: z\n");
}

#[test]
fn test_json_through_bson() {
    let bson = sorted(JSON_INPUT.as_bytes(), "json", "bson");
    assert!(matches!(bson, SerializedDocument::Binary(_)));
    let back = sorted(bson.as_bytes(), "bson", "json");
    assert_eq!(back.as_text(), Some(JSON_INPUT));
}

#[test]
fn test_properties_toml_yaml_back_to_json() {
    for to in ["properties", "toml", "yaml"] {
        let encoded = sorted_text(JSON_INPUT, "json", to);
        assert_eq!(sorted_text(&encoded, to, "json"), JSON_INPUT, "via {to}");
    }
}

#[test]
fn test_go_literal() {
    insta::assert_snapshot!(
        sorted_text(r#"{"b":[1,2.5,null],"a":{"t":true}}"#, "json", "go"),
        @r#"map[string]interface {}{"a":map[string]interface {}{"t":true}, "b":[]interface {}{1, 2.5, interface {}(nil)}}"#
    );
}

#[test]
fn test_hcl2_block_document() {
    let input = r#"
region = "eu"
server "web" {
  port = 8080
}
"#;
    assert_eq!(
        sorted_text(input, "hcl2", "json"),
        r#"{"region":"eu","server":{"web":{"port":8080}}}"#
    );
}

#[test]
fn test_pretty_json_from_yaml() {
    let options = ConvertOptions {
        output: gss_babel::EncodeOptions {
            pretty: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let out = convert(
        b"name: gss\ntags:\n- a\n- b\nnested:\n  n: 1\n",
        "yaml",
        "json",
        None,
        &options,
    )
    .unwrap();
    insta::assert_snapshot!(out.as_text().unwrap(), @r#"
{
  "name": "gss",
  "tags": [
    "a",
    "b"
  ],
  "nested": {
    "n": 1
  }
}
"#);
}
