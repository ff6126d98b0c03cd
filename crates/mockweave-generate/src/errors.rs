use thiserror::Error;

use mockweave_core::ValidationReport;

/// Errors emitted by the generation engine.
///
/// Generation is a pure function of seed and schema, so none of these are
/// retried; callers fix the input and resubmit.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("schema invalid: {0}")]
    SchemaInvalid(ValidationReport),
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
    #[error("reference pool for entity '{entity}' is empty")]
    EmptyReferencePool { entity: String },
    #[error("enum pattern for field '{field}' has no values")]
    EmptyEnum { field: String },
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("internal ordering error: {0}")]
    InternalOrdering(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl From<mockweave_core::Error> for GenerationError {
    fn from(err: mockweave_core::Error) -> Self {
        match err {
            mockweave_core::Error::InvalidSchema(message) => {
                let mut report = ValidationReport::default();
                report.push_error(mockweave_core::ValidationIssue::new(
                    "invalid_schema",
                    "/",
                    message,
                ));
                GenerationError::SchemaInvalid(report)
            }
            mockweave_core::Error::Cycle { path } => {
                let mut report = ValidationReport::default();
                report.push_error(mockweave_core::ValidationIssue::new(
                    "dependency_cycle",
                    "/entities",
                    format!("dependency cycle detected: {}", path.join(" -> ")),
                ));
                GenerationError::SchemaInvalid(report)
            }
            mockweave_core::Error::InternalOrdering(message) => {
                GenerationError::InternalOrdering(message)
            }
        }
    }
}
