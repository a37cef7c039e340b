use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use datamold_core::{Schema, ValidationReport};

use crate::content::ContentProvider;
use crate::engine::StructuralGenerator;
use crate::errors::GenerationError;
use crate::faker_rs::FakeRsAdapter;
use crate::generators::{GeneratedObject, GeneratorRegistry};
use crate::model::GenerationSettings;
use crate::validate::{validate_schema, validate_schema_at};

/// Schema handed to `DataGenerator`, parsed or still serialized.
#[derive(Debug, Clone)]
pub enum SchemaInput {
    Parsed(Schema),
    Value(Value),
    Text(String),
}

impl SchemaInput {
    fn normalize(self) -> Result<Schema, GenerationError> {
        let schema = match self {
            SchemaInput::Parsed(schema) => schema,
            SchemaInput::Value(value) => Schema::from_value(value)?,
            SchemaInput::Text(text) => Schema::from_json_str(&text)?,
        };
        Ok(schema)
    }
}

impl From<Schema> for SchemaInput {
    fn from(schema: Schema) -> Self {
        SchemaInput::Parsed(schema)
    }
}

impl From<Value> for SchemaInput {
    fn from(value: Value) -> Self {
        SchemaInput::Value(value)
    }
}

impl From<String> for SchemaInput {
    fn from(text: String) -> Self {
        SchemaInput::Text(text)
    }
}

impl From<&str> for SchemaInput {
    fn from(text: &str) -> Self {
        SchemaInput::Text(text.to_string())
    }
}

/// Entry point: one schema, any number of independent records.
///
/// Shareable across threads; each call draws from its own RNG.
#[derive(Clone)]
pub struct DataGenerator {
    schema: Schema,
    registry: Arc<GeneratorRegistry>,
    content: Arc<dyn ContentProvider>,
    settings: GenerationSettings,
}

impl DataGenerator {
    pub fn new(schema: impl Into<SchemaInput>) -> Result<Self, GenerationError> {
        Self::with_settings(schema, GenerationSettings::default())
    }

    pub fn with_settings(
        schema: impl Into<SchemaInput>,
        settings: GenerationSettings,
    ) -> Result<Self, GenerationError> {
        let schema = schema.into().normalize()?;
        Ok(Self {
            schema,
            registry: GeneratorRegistry::shared(),
            content: Arc::new(FakeRsAdapter::new(settings.locale)),
            settings,
        })
    }

    /// Use a registry carrying extra type tags.
    pub fn with_registry(mut self, registry: Arc<GeneratorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_content_provider(mut self, content: Arc<dyn ContentProvider>) -> Self {
        self.content = content;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generate one record with the thread-local RNG.
    pub fn generate(&self) -> Result<GeneratedObject, GenerationError> {
        let mut rng = rand::rng();
        self.generate_with_rng(&mut rng)
    }

    pub fn generate_with_rng(
        &self,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedObject, GenerationError> {
        self.generate_at(Utc::now(), rng)
    }

    /// Generate one record with an explicit reference instant for `now`.
    pub fn generate_at(
        &self,
        now: DateTime<Utc>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedObject, GenerationError> {
        let engine =
            StructuralGenerator::new(&self.registry, self.content.as_ref(), &self.settings);
        match engine.generate(self.schema.root(), now, rng) {
            Ok(record) => {
                debug!(fields = record.len(), "record generated");
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, "record generation failed");
                Err(err)
            }
        }
    }

    /// Generate `count` records; a seed makes the run reproducible apart
    /// from expressions relative to `now`.
    pub fn generate_batch(
        &self,
        count: usize,
        seed: Option<u64>,
    ) -> Result<Vec<GeneratedObject>, GenerationError> {
        info!(count, seed, "generation started");
        let mut records = Vec::with_capacity(count);
        match seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                for _ in 0..count {
                    records.push(self.generate_with_rng(&mut rng)?);
                }
            }
            None => {
                let mut rng = rand::rng();
                for _ in 0..count {
                    records.push(self.generate_with_rng(&mut rng)?);
                }
            }
        }
        info!(records = records.len(), "generation completed");
        Ok(records)
    }

    /// Report unknown types, malformed nodes and bad constraints.
    pub fn validate(&self) -> ValidationReport {
        validate_schema(&self.schema, &self.registry, &self.settings)
    }

    /// Validate with relative date bounds resolved against `now`.
    pub fn validate_at(&self, now: DateTime<Utc>) -> ValidationReport {
        validate_schema_at(&self.schema, &self.registry, &self.settings, now)
    }
}

impl fmt::Debug for DataGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGenerator")
            .field("schema", &self.schema)
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
