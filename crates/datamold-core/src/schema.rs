use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Key that marks a mapping as a typed leaf.
pub const TYPE_KEY: &str = "type";

/// Type tag reserved for explicit group nodes.
pub const GROUP_TAG: &str = "dict";

/// Normalized schema: a JSON object whose values are schema nodes.
///
/// Key order of the source document is preserved and drives the key order of
/// generated records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Schema {
    root: Map<String, Value>,
}

impl Schema {
    /// Normalize an in-memory value.
    ///
    /// A `Value::String` is treated as serialized schema text, so callers can
    /// hand over either form without knowing which one they hold.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            Value::String(text) => Self::from_json_str(&text),
            other => Err(Error::MalformedSchema(format!(
                "schema root must be an object, found {}",
                kind_name(&other)
            ))),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(Error::MalformedSchema(format!(
                "schema root must be an object, found {}",
                kind_name(&other)
            ))),
        }
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Structure of the schema with every leaf replaced by `null`.
    ///
    /// Nodes that cannot be classified are kept as `null` as well; shape is a
    /// comparison aid, not a validator.
    pub fn shape(&self) -> Value {
        group_shape(GroupFields::new(&self.root, false))
    }
}

impl FromStr for Schema {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_json_str(text)
    }
}

impl TryFrom<Value> for Schema {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Schema> for Value {
    fn from(schema: Schema) -> Self {
        Value::Object(schema.root)
    }
}

/// Classified view of one schema node.
#[derive(Debug, Clone, Copy)]
pub enum SchemaNode<'a> {
    /// Mapping with a string `type` key; the whole mapping is the constraint set.
    Typed {
        tag: &'a str,
        spec: &'a Map<String, Value>,
    },
    /// Mapping without a `type` key.
    Untyped(&'a Map<String, Value>),
}

/// Classify a node found at `path`.
pub fn classify<'a>(value: &'a Value, path: &str) -> Result<SchemaNode<'a>> {
    let Value::Object(map) = value else {
        return Err(Error::MalformedSchema(format!(
            "{path}: expected an object, found {}",
            kind_name(value)
        )));
    };

    match map.get(TYPE_KEY) {
        None => Ok(SchemaNode::Untyped(map)),
        Some(Value::String(tag)) => Ok(SchemaNode::Typed { tag, spec: map }),
        Some(other) => Err(Error::MalformedSchema(format!(
            "{path}: '{TYPE_KEY}' must be a string, found {}",
            kind_name(other)
        ))),
    }
}

/// Child entries of a group, skipping the `type` key of `dict`-tagged groups.
#[derive(Debug, Clone)]
pub struct GroupFields<'a> {
    iter: serde_json::map::Iter<'a>,
    skip_type: bool,
}

impl<'a> GroupFields<'a> {
    pub fn new(map: &'a Map<String, Value>, skip_type: bool) -> Self {
        Self {
            iter: map.iter(),
            skip_type,
        }
    }
}

impl<'a> Iterator for GroupFields<'a> {
    type Item = (&'a String, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let skip_type = self.skip_type;
        self.iter
            .by_ref()
            .find(|(key, _)| !(skip_type && key.as_str() == TYPE_KEY))
    }
}

/// JSON pointer of a child field.
pub fn child_path(parent: &str, key: &str) -> String {
    let escaped = key.replace('~', "~0").replace('/', "~1");
    format!("{parent}/{escaped}")
}

fn group_shape(fields: GroupFields<'_>) -> Value {
    let mut out = Map::new();
    for (key, value) in fields {
        let shape = match classify(value, "") {
            Ok(SchemaNode::Untyped(map)) => group_shape(GroupFields::new(map, false)),
            Ok(SchemaNode::Typed { tag, spec }) if tag == GROUP_TAG => {
                group_shape(GroupFields::new(spec, true))
            }
            _ => Value::Null,
        };
        out.insert(key.clone(), shape);
    }
    Value::Object(out)
}

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_value_is_parsed_as_schema_text() {
        let schema = Schema::from_value(json!(r#"{"a": {"type": "integer"}}"#))
            .expect("schema from text value");
        assert!(schema.root().contains_key("a"));
    }

    #[test]
    fn non_object_root_is_malformed() {
        let result = Schema::from_value(json!([1, 2]));
        assert!(matches!(result, Err(Error::MalformedSchema(_))));
    }

    #[test]
    fn non_string_type_is_malformed() {
        let value = json!({"type": null});
        assert!(matches!(
            classify(&value, "/x"),
            Err(Error::MalformedSchema(_))
        ));
    }

    #[test]
    fn dict_group_fields_skip_type_key() {
        let value = json!({"type": "dict", "a": {"type": "string"}, "b": {}});
        let map = value.as_object().expect("object");
        let keys: Vec<&str> = GroupFields::new(map, true)
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn child_path_escapes_pointer_tokens() {
        assert_eq!(child_path("/root", "a/b~c"), "/root/a~1b~0c");
    }
}
