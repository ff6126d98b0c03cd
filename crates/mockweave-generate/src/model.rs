use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::GenerationError;
use crate::faker_rs::LocaleKey;
use crate::generators::GeneratedValue;
use crate::generators::pattern::DEFAULT_MAX_REPEAT;

/// Options for the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateOptions {
    /// Probability that a nullable foreign key is left null.
    pub null_probability: f64,
    /// Records produced per chunk. Never affects generated values.
    pub chunk_size: usize,
    /// Repetition bound for unbounded regex quantifiers.
    pub max_repeat: u32,
    /// Locale used when no hint, or an unknown hint, is given.
    pub default_locale: String,
    /// Reference date for `{{year}}` and recent-date values. Today (UTC) when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_date: Option<NaiveDate>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            null_probability: 0.2,
            chunk_size: 1000,
            max_repeat: DEFAULT_MAX_REPEAT,
            default_locale: LocaleKey::EnUs.as_str().to_string(),
            base_date: None,
        }
    }
}

impl GenerateOptions {
    /// Check option ranges and return the parsed default locale.
    pub fn validate(&self) -> Result<LocaleKey, GenerationError> {
        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(GenerationError::InvalidOptions(format!(
                "null_probability must be within [0, 1], got {}",
                self.null_probability
            )));
        }
        if self.chunk_size == 0 {
            return Err(GenerationError::InvalidOptions(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.max_repeat == 0 {
            return Err(GenerationError::InvalidOptions(
                "max_repeat must be at least 1".to_string(),
            ));
        }
        LocaleKey::parse(&self.default_locale).ok_or_else(|| {
            GenerationError::InvalidOptions(format!(
                "unsupported default_locale '{}'",
                self.default_locale
            ))
        })
    }
}

/// One generated record. Serialized flat, `{"id": ..., "<field>": ...}`,
/// with fields in the order the entity declares them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRecord {
    pub id: String,
    pub fields: Vec<(String, GeneratedValue)>,
}

impl GeneratedRecord {
    pub fn get(&self, field: &str) -> Option<&GeneratedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for GeneratedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Output of one dataset generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub dataset_by_entity: BTreeMap<String, Vec<GeneratedRecord>>,
    pub entity_counts: BTreeMap<String, usize>,
    pub total_records: usize,
    pub seed: u64,
    /// Entities in the order they were generated.
    pub generation_order: Vec<String>,
}

impl GenerationResult {
    pub fn records(&self, entity: &str) -> &[GeneratedRecord] {
        self.dataset_by_entity
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = GenerateOptions::default();
        assert_eq!(options.validate().unwrap(), LocaleKey::EnUs);
        assert_eq!(options.null_probability, 0.2);
        assert_eq!(options.chunk_size, 1000);
    }

    #[test]
    fn rejects_out_of_range_options() {
        let bad = [
            GenerateOptions {
                null_probability: 1.5,
                ..GenerateOptions::default()
            },
            GenerateOptions {
                null_probability: f64::NAN,
                ..GenerateOptions::default()
            },
            GenerateOptions {
                chunk_size: 0,
                ..GenerateOptions::default()
            },
            GenerateOptions {
                max_repeat: 0,
                ..GenerateOptions::default()
            },
            GenerateOptions {
                default_locale: "xx".to_string(),
                ..GenerateOptions::default()
            },
        ];
        for options in bad {
            assert!(matches!(
                options.validate(),
                Err(GenerationError::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn partial_options_fill_defaults() {
        let options: GenerateOptions =
            serde_json::from_value(serde_json::json!({"chunk_size": 10, "base_date": "2026-02-01"}))
                .unwrap();
        assert_eq!(options.chunk_size, 10);
        assert_eq!(options.null_probability, 0.2);
        assert_eq!(options.base_date, NaiveDate::from_ymd_opt(2026, 2, 1));
    }

    #[test]
    fn record_serializes_flat() {
        let record = GeneratedRecord {
            id: "users_1".to_string(),
            fields: vec![
                ("name".to_string(), GeneratedValue::Text("Ada".to_string())),
                ("manager_id".to_string(), GeneratedValue::Null),
            ],
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"id": "users_1", "name": "Ada", "manager_id": null})
        );
        assert_eq!(record.get("manager_id"), Some(&GeneratedValue::Null));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn record_keeps_declared_field_order() {
        let record = GeneratedRecord {
            id: "orders_1".to_string(),
            fields: vec![
                ("total".to_string(), GeneratedValue::Float(9.5)),
                ("status".to_string(), GeneratedValue::Text("paid".to_string())),
                ("customer_id".to_string(), GeneratedValue::Text("users_2".to_string())),
            ],
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":"orders_1","total":9.5,"status":"paid","customer_id":"users_2"}"#
        );
        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            ["total", "status", "customer_id"]
        );
    }
}
