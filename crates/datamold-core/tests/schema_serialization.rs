use datamold_core::Schema;
use serde_json::{Value, json};

#[test]
fn serializes_schema_in_source_key_order() {
    let text = r#"{"zeta":{"type":"integer","min":1,"max":5},"alpha":{"nested":{"type":"string"}}}"#;
    let schema: Schema = text.parse().expect("parse schema");

    let json = schema.to_json_string().expect("serialize schema");
    assert_eq!(json, text);
}

#[test]
fn round_trip_preserves_structure() {
    let value = json!({
        "user": {
            "name": {"type": "string", "content": "name"},
            "born": {"type": "date", "min_date": "-80y", "max_date": "-18y"}
        },
        "score": {"type": "float", "min": 0.0, "max": 1.0}
    });
    let schema = Schema::from_value(value.clone()).expect("schema from value");

    let text = schema.to_json_string_pretty().expect("serialize schema");
    let reparsed = Schema::from_json_str(&text).expect("reparse schema");

    assert_eq!(schema, reparsed);
    assert_eq!(Value::from(reparsed), value);
}

#[test]
fn shape_replaces_leaves_and_expands_dict_groups() {
    let schema = Schema::from_value(json!({
        "a": {"type": "string"},
        "b": {"c": {"type": "integer"}},
        "d": {"type": "dict", "e": {"type": "float"}}
    }))
    .expect("schema");

    assert_eq!(
        schema.shape(),
        json!({"a": null, "b": {"c": null}, "d": {"e": null}})
    );
}

#[test]
fn deserializes_through_serde() {
    let schema: Schema =
        serde_json::from_str(r#"{"x": {"type": "string"}}"#).expect("deserialize schema");
    assert!(schema.root().contains_key("x"));

    let invalid: Result<Schema, _> = serde_json::from_str("[1]");
    assert!(invalid.is_err());
}
