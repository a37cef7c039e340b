use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, SecondsFormat, Utc};
use rand::{Rng, RngCore};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use datamold_core::{GROUP_TAG, IssueSeverity, ValidationIssue};

use crate::content::ContentProvider;
use crate::errors::GenerationError;
use crate::model::GenerationSettings;
use crate::params::{ParamSpec, check_params, constraint_issue};

pub mod primitives;

/// Generated value for a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Text(String),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Object(GeneratedObject),
}

impl GeneratedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeneratedValue::Int(value) => Some(*value as f64),
            GeneratedValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            GeneratedValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&GeneratedObject> {
        match self {
            GeneratedValue::Object(value) => Some(value),
            _ => None,
        }
    }

    /// JSON rendering; timestamps become RFC 3339 strings in UTC.
    pub fn to_json(&self) -> Value {
        match self {
            GeneratedValue::Text(value) => Value::String(value.clone()),
            GeneratedValue::Int(value) => Value::from(*value),
            GeneratedValue::Float(value) => Value::from(*value),
            GeneratedValue::Timestamp(value) => Value::String(format_timestamp(value)),
            GeneratedValue::Object(value) => value.to_json(),
        }
    }

    /// Structure with every scalar replaced by `null`.
    pub fn shape(&self) -> Value {
        match self {
            GeneratedValue::Object(value) => value.shape(),
            _ => Value::Null,
        }
    }
}

impl Serialize for GeneratedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GeneratedValue::Text(value) => serializer.serialize_str(value),
            GeneratedValue::Int(value) => serializer.serialize_i64(*value),
            GeneratedValue::Float(value) => serializer.serialize_f64(*value),
            GeneratedValue::Timestamp(value) => serializer.serialize_str(&format_timestamp(value)),
            GeneratedValue::Object(value) => value.serialize(serializer),
        }
    }
}

/// Generated mapping that keeps the key order of its schema group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedObject {
    fields: Vec<(String, GeneratedValue)>,
}

impl GeneratedObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: GeneratedValue) {
        self.fields.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&GeneratedValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneratedValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json());
        }
        Value::Object(map)
    }

    pub fn shape(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.shape());
        }
        Value::Object(map)
    }
}

impl Serialize for GeneratedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Per-leaf inputs shared by every generator invocation of one record.
pub struct GeneratorContext<'a> {
    /// JSON pointer of the leaf being generated.
    pub path: &'a str,
    /// Reference instant for `now` and relative date bounds.
    pub now: DateTime<Utc>,
    pub content: &'a dyn ContentProvider,
    pub settings: &'a GenerationSettings,
}

/// Per-leaf inputs for checking a spec without generating a value.
pub struct CheckContext<'a> {
    pub path: &'a str,
    pub now: DateTime<Utc>,
    pub settings: &'a GenerationSettings,
}

/// A scalar value generator selected by its type tag.
pub trait Generator: Send + Sync {
    fn id(&self) -> &'static str;

    /// Recognized constraint keys.
    fn params(&self) -> &'static [ParamSpec];

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        spec: &Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError>;

    /// Rejects what `generate` would reject for `spec`, without drawing.
    fn check_constraints(
        &self,
        _ctx: &CheckContext<'_>,
        _spec: &Map<String, Value>,
    ) -> Result<(), GenerationError> {
        Ok(())
    }

    /// Issues reported by `validate` for one leaf: key kinds and unknown keys
    /// first, then the generator's own constraint checks.
    fn check(&self, ctx: &CheckContext<'_>, spec: &Map<String, Value>) -> Vec<ValidationIssue> {
        let mut issues = check_params(spec, self.params(), self.id(), ctx.path);
        if issues
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Error)
        {
            return issues;
        }
        if let Err(err) = self.check_constraints(ctx, spec) {
            issues.push(constraint_issue(&err, ctx.path));
        }
        issues
    }
}

/// What a type tag is bound to.
#[derive(Clone, Copy)]
pub enum RegistryEntry<'a> {
    Scalar(&'a dyn Generator),
    /// The reserved `dict` tag: the leaf's other keys form a group.
    Group,
}

static SHARED_REGISTRY: LazyLock<Arc<GeneratorRegistry>> =
    LazyLock::new(|| Arc::new(GeneratorRegistry::new()));

/// Type-tag registry.
///
/// Registration needs `&mut self` and lookups need `&self`, so a registry that
/// is being read by in-flight generations cannot change underneath them.
pub struct GeneratorRegistry {
    generators: BTreeMap<&'static str, Box<dyn Generator>>,
}

impl GeneratorRegistry {
    /// Registry with the built-in `string`, `integer`, `float` and `date` tags.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for generator in primitives::builtin_generators() {
            registry.generators.insert(generator.id(), generator);
        }
        registry
    }

    /// Registry that only knows the structural `dict` tag.
    pub fn empty() -> Self {
        Self {
            generators: BTreeMap::new(),
        }
    }

    /// Process-wide built-in registry, created on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_REGISTRY)
    }

    pub fn register_generator(
        &mut self,
        generator: Box<dyn Generator>,
    ) -> Result<(), GenerationError> {
        let id = generator.id();
        if id == GROUP_TAG || self.generators.contains_key(id) {
            return Err(GenerationError::DuplicateGenerator(id.to_string()));
        }
        self.generators.insert(id, generator);
        Ok(())
    }

    pub fn lookup(&self, tag: &str) -> Option<RegistryEntry<'_>> {
        if tag == GROUP_TAG {
            return Some(RegistryEntry::Group);
        }
        self.generator(tag).map(RegistryEntry::Scalar)
    }

    pub fn generator(&self, tag: &str) -> Option<&dyn Generator> {
        self.generators.get(tag).map(|generator| generator.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.lookup(tag).is_some()
    }

    /// All registered tags, `dict` included, sorted.
    pub fn generator_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.generators.keys().copied().collect();
        ids.push(GROUP_TAG);
        ids.sort_unstable();
        ids
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.generator_ids())
            .finish()
    }
}

/// Pick one option uniformly at random.
pub fn choose_option<'v>(
    options: &'v [Value],
    rng: &mut dyn RngCore,
    path: &str,
) -> Result<&'v Value, GenerationError> {
    if options.is_empty() {
        return Err(GenerationError::InvalidConstraint(format!(
            "{path}: 'options' must not be empty"
        )));
    }
    Ok(&options[rng.random_range(0..options.len())])
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    use super::*;

    #[test]
    fn choose_option_only_returns_members() {
        let options = vec![json!("a"), json!("b"), json!("c")];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let chosen = choose_option(&options, &mut rng, "/tag").unwrap();
            assert!(options.contains(chosen));
        }
    }

    #[test]
    fn choose_option_rejects_empty_list() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!(matches!(
            choose_option(&[], &mut rng, "/tag"),
            Err(GenerationError::InvalidConstraint(_))
        ));
    }

    #[test]
    fn registry_lists_builtins_and_dict() {
        let registry = GeneratorRegistry::new();
        assert_eq!(
            registry.generator_ids(),
            vec!["date", "dict", "float", "integer", "string"]
        );
        assert!(matches!(registry.lookup("dict"), Some(RegistryEntry::Group)));
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn generated_object_serializes_in_insertion_order() {
        let mut object = GeneratedObject::new();
        object.insert("z".to_string(), GeneratedValue::Int(1));
        object.insert("a".to_string(), GeneratedValue::Text("x".to_string()));
        let json = serde_json::to_string(&object).unwrap();
        assert_eq!(json, r#"{"z":1,"a":"x"}"#);
    }
}
