//! Core contracts and helpers for Datamold.
//!
//! This crate defines the declarative schema model, node classification, and
//! the validation report types shared by the generation engine and the CLI.

pub mod error;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use schema::{
    GROUP_TAG, GroupFields, Schema, SchemaNode, TYPE_KEY, child_path, classify, kind_name,
};
pub use validation::{IssueSeverity, ValidationIssue, ValidationReport};
