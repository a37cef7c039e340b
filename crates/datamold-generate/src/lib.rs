//! Schema-driven synthetic data generation for Datamold.
//!
//! A schema is a nested JSON object whose leaves name a registered generator
//! `type` plus constraints. `DataGenerator` walks it and returns one record of
//! the same shape per call.

pub mod content;
pub mod data_generator;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod generators;
pub mod model;
pub mod params;
pub mod validate;

pub use content::ContentProvider;
pub use data_generator::{DataGenerator, SchemaInput};
pub use dates::{DateExpression, DateRangeResolver};
pub use engine::StructuralGenerator;
pub use errors::GenerationError;
pub use faker_rs::{FakeRsAdapter, LocaleKey};
pub use generators::{
    CheckContext, GeneratedObject, GeneratedValue, Generator, GeneratorContext,
    GeneratorRegistry, RegistryEntry,
};
pub use model::GenerationSettings;
pub use validate::{validate_schema, validate_schema_at};
