use std::path::Path;

use serde::{Deserialize, Serialize};

use mockweave_generate::GenerateOptions;

use crate::CliError;

/// Contents of the `--config` TOML file.
///
/// ```toml
/// [generation]
/// null_probability = 0.1
/// chunk_size = 500
/// default_locale = "pt_BR"
/// base_date = "2026-01-01"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    pub generation: GenerateOptions,
}

/// Load settings from `path`, or defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<CliSettings, CliError> {
    let Some(path) = path else {
        return Ok(CliSettings::default());
    };
    let content = std::fs::read_to_string(path)?;
    let settings = parse_settings(&content)?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

fn parse_settings(content: &str) -> Result<CliSettings, CliError> {
    let settings: CliSettings = toml::from_str(content)?;
    settings.generation.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_generation_table() {
        let settings = parse_settings(
            r#"
            [generation]
            null_probability = 0.5
            chunk_size = 10
            default_locale = "pt_BR"
            base_date = "2026-01-01"
            "#,
        )
        .expect("parse settings");
        assert_eq!(settings.generation.null_probability, 0.5);
        assert_eq!(settings.generation.chunk_size, 10);
        assert_eq!(settings.generation.max_repeat, 32);
        assert_eq!(settings.generation.default_locale, "pt_BR");
        assert_eq!(settings.generation.base_date, NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse_settings("").expect("parse"), CliSettings::default());
    }

    #[test]
    fn rejects_invalid_options() {
        let err = parse_settings("[generation]\nnull_probability = 2.0\n").unwrap_err();
        assert!(matches!(err, CliError::Generation(_)));

        let err = parse_settings("[generation]\nchunk = 5\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
