//! Core contracts and helpers for mockweave.
//!
//! This crate defines the declarative dataset schema, the pattern spec
//! contract, schema validation and the entity dependency graph shared by the
//! generation engine and the CLI.

pub mod error;
pub mod graph;
pub mod pattern;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use graph::{
    DependencyGraph, DependencyReport, GraphSummary, build_dependency_report,
    resolve_generation_order,
};
pub use pattern::{PatternSpec, RangeSpec};
pub use schema::{
    Archetype, COMPANY_FIELDS, Cardinality, DatasetSchema, EntityDefinition, MAX_ENTITY_COUNT,
    MIN_ENTITY_COUNT, PERSON_FIELDS, RESERVED_ID_FIELD, RelationshipDefinition, dataset_json_schema,
};
pub use validation::{ValidationIssue, ValidationReport, validate_schema};
