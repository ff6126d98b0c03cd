use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;
use crate::schema::{
    Archetype, DatasetSchema, EntityDefinition, MAX_ENTITY_COUNT, MIN_ENTITY_COUNT,
    RESERVED_ID_FIELD,
};

/// Structured validation issue with location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.path)
    }
}

/// Every violation found in one validation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// Human readable messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|issue| issue.message.clone()).collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

/// Validate a dataset schema, accumulating every violation.
///
/// This checks:
/// - at least one entity, with non-empty names
/// - counts within `[1, 10000]`
/// - `custom` entities declare fields; field names are non-empty, unique and not `id`
/// - relationship targets exist
/// - pattern keys name an output field that is not a relationship
/// - no dependency cycle
pub fn validate_schema(schema: &DatasetSchema) -> ValidationReport {
    let mut report = ValidationReport::default();

    if schema.entities.is_empty() {
        report.push_error(ValidationIssue::new(
            "empty_schema",
            "/entities",
            "schema must declare at least one entity",
        ));
        return report;
    }

    for (name, entity) in &schema.entities {
        validate_entity(schema, name, entity, &mut report);
    }

    if let Some(cycle) = DependencyGraph::build(schema).find_cycle() {
        report.push_error(ValidationIssue::new(
            "dependency_cycle",
            "/entities",
            format!("dependency cycle detected: {}", cycle.join(" -> ")),
        ));
    }

    report
}

fn validate_entity(
    schema: &DatasetSchema,
    name: &str,
    entity: &EntityDefinition,
    report: &mut ValidationReport,
) {
    let base = format!("/entities/{}", pointer_escape(name));

    if name.trim().is_empty() {
        report.push_error(ValidationIssue::new(
            "empty_entity_name",
            base.clone(),
            "entity names must not be empty",
        ));
    }

    if !(MIN_ENTITY_COUNT..=MAX_ENTITY_COUNT).contains(&entity.count) {
        report.push_error(ValidationIssue::new(
            "invalid_count",
            format!("{base}/count"),
            format!(
                "entity '{name}' count must be between {MIN_ENTITY_COUNT} and {MAX_ENTITY_COUNT}, got {}",
                entity.count
            ),
        ));
    }

    if entity.archetype == Archetype::Custom && entity.declared_fields().is_empty() {
        report.push_error(ValidationIssue::new(
            "missing_fields",
            format!("{base}/fields"),
            format!("custom entity '{name}' must declare at least one field"),
        ));
    }

    let mut seen = BTreeSet::new();
    for (idx, field) in entity.declared_fields().iter().enumerate() {
        let path = format!("{base}/fields/{idx}");
        if field.trim().is_empty() {
            report.push_error(ValidationIssue::new(
                "empty_field_name",
                path,
                format!("entity '{name}' declares an empty field name"),
            ));
            continue;
        }
        if field == RESERVED_ID_FIELD {
            report.push_error(ValidationIssue::new(
                "reserved_field",
                path.clone(),
                format!("entity '{name}' cannot declare reserved field '{RESERVED_ID_FIELD}'"),
            ));
        }
        if !seen.insert(field.as_str()) {
            report.push_error(ValidationIssue::new(
                "duplicate_field",
                path,
                format!("entity '{name}' declares field '{field}' more than once"),
            ));
        }
    }

    for (field, relationship) in &entity.relationships {
        let path = format!("{base}/relationships/{}", pointer_escape(field));
        if field.trim().is_empty() || field == RESERVED_ID_FIELD {
            report.push_error(ValidationIssue::new(
                "reserved_field",
                path.clone(),
                format!("entity '{name}' relationship field '{field}' is not a usable field name"),
            ));
        }
        if !schema.contains(&relationship.references) {
            report.push_error(ValidationIssue::new(
                "unknown_reference",
                format!("{path}/references"),
                format!(
                    "entity '{name}' relationship '{field}' references unknown entity '{}'",
                    relationship.references
                ),
            ));
        }
    }

    let output_fields = entity.output_fields();
    for field in entity.patterns.keys() {
        let path = format!("{base}/patterns/{}", pointer_escape(field));
        if entity.relationships.contains_key(field) {
            report.push_error(ValidationIssue::new(
                "pattern_on_relationship",
                path,
                format!("entity '{name}' field '{field}' is a relationship and cannot take a pattern"),
            ));
        } else if !output_fields.contains(field) {
            report.push_error(ValidationIssue::new(
                "unknown_pattern_field",
                path,
                format!("entity '{name}' has a pattern for field '{field}' it does not output"),
            ));
        }
    }
}

fn pointer_escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
