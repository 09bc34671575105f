//! Round trips through the bidirectional formats
//!
//! Values are generated within what each format can represent; the lossy
//! spots are exercised by dedicated tests below.

use gss_babel::{
    DecodeOptions, EncodeOptions, Format, FormatRegistry, Map, Payload, SortOrder, Value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn registry() -> &'static FormatRegistry {
    FormatRegistry::global()
}

fn roundtrip(format: &str, payload: &Payload) -> Payload {
    let format: &dyn Format = registry().get(format).unwrap();
    let encoded = format
        .encode(payload, &EncodeOptions::default())
        .unwrap_or_else(|err| panic!("encode {} failed: {err}", format.name()));
    format
        .decode(encoded.as_bytes(), &DecodeOptions::default())
        .unwrap_or_else(|err| panic!("decode {} failed: {err}", format.name()))
}

fn key() -> impl Strategy<Value = String> {
    "[a-z_]{1,6}"
}

/// Strings that stress YAML plain-scalar resolution without leaving ASCII.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .:#,_-]{0,10}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        // quarters are exact in binary and print without rounding
        any::<i32>().prop_map(|n| Value::Float(f64::from(n) / 4.0)),
        text().prop_map(Value::String),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 0..4)
                .prop_map(|pairs| Value::Map(pairs.into_iter().collect::<Map>())),
        ]
    })
}

fn object() -> impl Strategy<Value = Value> {
    prop::collection::vec((key(), tree()), 0..5)
        .prop_map(|pairs| Value::Map(pairs.into_iter().collect::<Map>()))
}

/// Drops nulls recursively; TOML has no null.
fn without_nulls(value: Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(without_nulls)
                .collect(),
        ),
        other => other,
    }
}

proptest! {
    #[test]
    fn prop_json_roundtrip(value in tree()) {
        let payload = Payload::document(value);
        prop_assert_eq!(roundtrip("json", &payload), payload);
    }

    #[test]
    fn prop_yaml_roundtrip(value in object()) {
        let payload = Payload::document(value);
        prop_assert_eq!(roundtrip("yaml", &payload), payload);
    }

    #[test]
    fn prop_bson_roundtrip(value in object()) {
        let payload = Payload::document(value);
        prop_assert_eq!(roundtrip("bson", &payload), payload);
    }

    #[test]
    fn prop_jsonl_roundtrip(records in prop::collection::vec(object(), 0..5)) {
        let payload = Payload::stream(records);
        prop_assert_eq!(roundtrip("jsonl", &payload), payload);
    }

    #[test]
    fn prop_sorting_is_idempotent(value in tree()) {
        let mut once = value.clone();
        once.sort_keys(SortOrder::Ascending);
        let mut twice = once.clone();
        twice.sort_keys(SortOrder::Ascending);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_sorted_keys_ascend(value in object()) {
        let mut sorted = value;
        sorted.sort_keys(SortOrder::Ascending);
        let keys: Vec<_> = sorted.as_map().unwrap().keys().cloned().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn test_toml_roundtrip_without_nulls() {
    let value = without_nulls(Value::from_pairs([
        ("title", Value::from("gss")),
        ("dropped", Value::Null),
        ("ratio", Value::Float(0.25)),
        ("count", Value::Int(-3)),
        (
            "owner",
            Value::from_pairs([("name", Value::from("x")), ("active", Value::Bool(true))]),
        ),
        (
            "ports",
            Value::Array(vec![Value::Int(80), Value::Int(443)]),
        ),
        (
            "servers",
            Value::Array(vec![
                Value::from_pairs([("host", "a")]),
                Value::from_pairs([("host", "b")]),
            ]),
        ),
    ]));
    let payload = Payload::document(value);
    assert_eq!(roundtrip("toml", &payload), payload);
}

#[test]
fn test_hcl2_roundtrip() {
    let payload = Payload::document(Value::from_pairs([
        ("name", Value::from("web")),
        ("replicas", Value::Int(3)),
        ("enabled", Value::Bool(false)),
        ("zones", Value::Array(vec!["a".into(), "b".into()])),
    ]));
    assert_eq!(roundtrip("hcl2", &payload), payload);
}

#[test]
fn test_properties_roundtrip_of_flat_map() {
    let payload = Payload::document(Value::from_pairs([
        ("name", Value::from("a b")),
        ("path", Value::from("c:\\dir")),
        ("port", Value::Int(8080)),
        ("debug", Value::Bool(true)),
    ]));
    assert_eq!(roundtrip("properties", &payload), payload);
}

#[test]
fn test_csv_roundtrip_of_records() {
    let payload = Payload::stream(vec![
        Value::from_pairs([("id", Value::Int(1)), ("note", Value::from("a,b"))]),
        Value::from_pairs([("id", Value::Int(2)), ("note", Value::from("say \"hi\""))]),
    ]);
    assert_eq!(roundtrip("csv", &payload), payload);
    assert_eq!(roundtrip("tsv", &payload), payload);
}

#[test]
fn test_tags_roundtrip_keeps_quoted_strings() {
    let payload = Payload::stream(vec![Value::from_pairs([
        ("level", Value::from("info")),
        ("msg", Value::from("disk full")),
        ("code", Value::from("42")),
        ("n", Value::Int(42)),
    ])]);
    assert_eq!(roundtrip("tags", &payload), payload);
}

#[test]
fn test_bytes_survive_bson_but_not_json() {
    let payload = Payload::document(Value::from_pairs([(
        "blob",
        Value::bytes(vec![0u8, 159, 146, 150]),
    )]));
    assert_eq!(roundtrip("bson", &payload), payload);
    assert_eq!(
        roundtrip("json", &payload),
        Payload::document(Value::from_pairs([("blob", "AJ+Slg==")]))
    );
}
