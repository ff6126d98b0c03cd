use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tagged description of how to synthesize a single field value.
///
/// Serialized as `{"type": "...", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PatternSpec {
    /// Uniform pick from a non-empty list.
    Enum(Vec<String>),
    /// String matching the regular expression.
    Regex(String),
    /// Template with `{{year}}`, `{{random:N}}` and `{{number:N}}` placeholders.
    #[serde(alias = "template")]
    Format(String),
    /// Number within inclusive bounds.
    Range(RangeSpec),
}

impl PatternSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            PatternSpec::Enum(_) => "enum",
            PatternSpec::Regex(_) => "regex",
            PatternSpec::Format(_) => "format",
            PatternSpec::Range(_) => "range",
        }
    }
}

/// Inclusive numeric bounds with optional decimal precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    /// Decimal places; absent or `0` yields integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl RangeSpec {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn precision(&self) -> u32 {
        self.precision.unwrap_or(0)
    }
}
