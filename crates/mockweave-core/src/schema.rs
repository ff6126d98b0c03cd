use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pattern::PatternSpec;

/// Smallest record count an entity may request.
pub const MIN_ENTITY_COUNT: i64 = 1;
/// Largest record count an entity may request.
pub const MAX_ENTITY_COUNT: i64 = 10_000;
/// Field name reserved for the generated record identifier.
pub const RESERVED_ID_FIELD: &str = "id";

/// Declarative description of a multi-entity dataset.
///
/// Entities are keyed by name; the sorted key order is the iteration order
/// every deterministic step (validation, ordering, generation) relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetSchema {
    pub entities: BTreeMap<String, EntityDefinition>,
}

impl DatasetSchema {
    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }
}

/// Generation request for a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityDefinition {
    /// Number of records to generate, within `[1, 10000]`.
    pub count: i64,
    /// Built-in category driving default field generation.
    pub archetype: Archetype,
    /// Ordered field names. Required for `custom` entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Foreign-key fields keyed by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipDefinition>,
    /// Pattern overrides keyed by output field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub patterns: BTreeMap<String, PatternSpec>,
}

impl EntityDefinition {
    pub fn new(count: i64, archetype: Archetype) -> Self {
        Self {
            count,
            archetype,
            fields: None,
            relationships: BTreeMap::new(),
            patterns: BTreeMap::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_relationship(
        mut self,
        field: impl Into<String>,
        relationship: RelationshipDefinition,
    ) -> Self {
        self.relationships.insert(field.into(), relationship);
        self
    }

    pub fn with_pattern(mut self, field: impl Into<String>, pattern: PatternSpec) -> Self {
        self.patterns.insert(field.into(), pattern);
        self
    }

    /// Declared fields, empty when none were given.
    pub fn declared_fields(&self) -> &[String] {
        self.fields.as_deref().unwrap_or(&[])
    }

    /// Fields present on every generated record, excluding `id`.
    ///
    /// Declared fields (or the archetype defaults when none are declared),
    /// followed by relationship fields not already listed.
    pub fn output_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = match &self.fields {
            Some(fields) if !fields.is_empty() => fields.clone(),
            _ => self
                .archetype
                .default_fields()
                .iter()
                .map(|field| field.to_string())
                .collect(),
        };
        for field in self.relationships.keys() {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        fields
    }
}

/// Built-in entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    #[serde(alias = "PERSON", alias = "Person")]
    Person,
    #[serde(alias = "COMPANY", alias = "Company")]
    Company,
    #[serde(alias = "CUSTOM", alias = "Custom")]
    Custom,
}

impl Archetype {
    /// Fields produced when a `person` or `company` entity declares none.
    pub fn default_fields(self) -> &'static [&'static str] {
        match self {
            Archetype::Person => PERSON_FIELDS,
            Archetype::Company => COMPANY_FIELDS,
            Archetype::Custom => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Person => "person",
            Archetype::Company => "company",
            Archetype::Custom => "custom",
        }
    }
}

pub const PERSON_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "full_name",
    "email",
    "phone",
    "street_address",
    "city",
    "country",
    "zip_code",
    "job_title",
    "date_of_birth",
];

pub const COMPANY_FIELDS: &[&str] = &[
    "name",
    "industry",
    "catch_phrase",
    "email",
    "phone",
    "website",
    "street_address",
    "city",
    "country",
    "founded_year",
    "employee_count",
];

/// Foreign-key declaration from an entity field to another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipDefinition {
    /// Name of the referenced entity.
    pub references: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Whether the field may hold `null`.
    #[serde(default)]
    pub nullable: bool,
}

impl RelationshipDefinition {
    pub fn new(references: impl Into<String>) -> Self {
        Self {
            references: references.into(),
            cardinality: Cardinality::OneToMany,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn many_to_many(mut self) -> Self {
        self.cardinality = Cardinality::ManyToMany;
        self
    }

    /// Self references that may be absent impose no ordering constraint.
    pub fn is_exempt_self_reference(&self, owner: &str) -> bool {
        self.nullable && self.references == owner
    }
}

/// Relationship cardinality.
///
/// Both variants store one sampled id per field; junction rows are modelled
/// with a dedicated entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    #[serde(alias = "ONE_TO_MANY")]
    OneToMany,
    #[serde(alias = "MANY_TO_MANY")]
    ManyToMany,
}

/// JSON Schema document for [`DatasetSchema`].
pub fn dataset_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(DatasetSchema)
}
