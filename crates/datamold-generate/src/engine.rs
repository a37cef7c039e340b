use chrono::{DateTime, Utc};
use rand::RngCore;
use serde_json::{Map, Value};
use tracing::warn;

use datamold_core::{GroupFields, SchemaNode, child_path, classify};

use crate::content::ContentProvider;
use crate::errors::GenerationError;
use crate::generators::{
    GeneratedObject, GeneratedValue, GeneratorContext, GeneratorRegistry, RegistryEntry,
};
use crate::model::GenerationSettings;

/// Walks a schema tree and assembles a record of the same shape.
///
/// The walk keeps its own stack of open groups instead of recursing, so depth
/// is bounded by `GenerationSettings::max_depth` rather than the thread stack.
pub struct StructuralGenerator<'a> {
    registry: &'a GeneratorRegistry,
    content: &'a dyn ContentProvider,
    settings: &'a GenerationSettings,
}

struct Frame<'s> {
    fields: GroupFields<'s>,
    key: String,
    path: String,
    out: GeneratedObject,
}

impl<'s> Frame<'s> {
    fn new(fields: GroupFields<'s>, key: String, path: String) -> Self {
        Self {
            fields,
            key,
            path,
            out: GeneratedObject::new(),
        }
    }
}

impl<'a> StructuralGenerator<'a> {
    pub fn new(
        registry: &'a GeneratorRegistry,
        content: &'a dyn ContentProvider,
        settings: &'a GenerationSettings,
    ) -> Self {
        Self {
            registry,
            content,
            settings,
        }
    }

    /// Generate one record for the group `root`.
    pub fn generate(
        &self,
        root: &Map<String, Value>,
        now: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedObject, GenerationError> {
        let mut stack: Vec<Frame<'_>> = Vec::new();
        let mut current = Frame::new(GroupFields::new(root, false), String::new(), String::new());

        loop {
            let Some((key, value)) = current.fields.next() else {
                let Some(parent) = stack.pop() else {
                    return Ok(current.out);
                };
                let finished = std::mem::replace(&mut current, parent);
                current
                    .out
                    .insert(finished.key, GeneratedValue::Object(finished.out));
                continue;
            };

            let path = child_path(&current.path, key);
            let fields = match classify(value, &path)? {
                SchemaNode::Untyped(map) => GroupFields::new(map, false),
                SchemaNode::Typed { tag, spec } => match self.registry.lookup(tag) {
                    Some(RegistryEntry::Group) => GroupFields::new(spec, true),
                    Some(RegistryEntry::Scalar(generator)) => {
                        let ctx = GeneratorContext {
                            path: &path,
                            now,
                            content: self.content,
                            settings: self.settings,
                        };
                        let generated = generator.generate(&ctx, spec, rng)?;
                        current.out.insert(key.clone(), generated);
                        continue;
                    }
                    None => {
                        warn!(path = %path, tag, "unknown generator type");
                        return Err(GenerationError::UnknownGeneratorType(tag.to_string()));
                    }
                },
            };

            let depth = stack.len() + 2;
            if depth > self.settings.max_depth {
                return Err(GenerationError::MalformedSchema(format!(
                    "{path}: nesting exceeds max depth {}",
                    self.settings.max_depth
                )));
            }
            let child = Frame::new(fields, key.clone(), path);
            stack.push(std::mem::replace(&mut current, child));
        }
    }
}
