//! Constrained value generation from pattern specs.
//!
//! A [`PatternSpec`] is compiled once into a [`CompiledPattern`], which
//! surfaces every pattern error up front, and then sampled once per record.
//! All choices draw from the caller's seeded stream.

mod range;
mod regex_gen;
mod template;

use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;

use mockweave_core::PatternSpec;

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

pub use range::{MAX_PRECISION, RangeSampler};
use regex_gen::compile_regex;
pub use template::{MAX_PLACEHOLDER_WIDTH, Template};

/// Repetition bound used for unbounded quantifiers (`*`, `+`, `{n,}`).
pub const DEFAULT_MAX_REPEAT: u32 = 32;

/// Inputs shared by every pattern compiled within one generation call.
#[derive(Debug, Clone, Copy)]
pub struct PatternContext {
    pub max_repeat: u32,
    /// Calendar year substituted for `{{year}}`.
    pub year: i32,
}

/// A validated pattern spec, ready for repeated sampling.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Enum(Vec<String>),
    Regex(RandRegex),
    Format(Template),
    Range(RangeSampler),
}

impl CompiledPattern {
    pub fn compile(
        field: &str,
        spec: &PatternSpec,
        ctx: &PatternContext,
    ) -> Result<Self, GenerationError> {
        match spec {
            PatternSpec::Enum(values) => {
                if values.is_empty() {
                    return Err(GenerationError::EmptyEnum {
                        field: field.to_string(),
                    });
                }
                Ok(CompiledPattern::Enum(values.clone()))
            }
            PatternSpec::Regex(pattern) => {
                let regex = compile_regex(pattern, ctx.max_repeat).map_err(|err| {
                    GenerationError::InvalidPattern(format!(
                        "field '{field}': regex '{pattern}' does not compile: {err}"
                    ))
                })?;
                Ok(CompiledPattern::Regex(regex))
            }
            PatternSpec::Format(template) => {
                Ok(CompiledPattern::Format(Template::parse(template, ctx.year)?))
            }
            PatternSpec::Range(spec) => Ok(CompiledPattern::Range(RangeSampler::compile(spec)?)),
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> GeneratedValue {
        match self {
            CompiledPattern::Enum(values) => {
                GeneratedValue::Text(values[rng.random_range(0..values.len())].clone())
            }
            CompiledPattern::Regex(regex) => GeneratedValue::Text(rng.sample::<String, _>(regex)),
            CompiledPattern::Format(template) => GeneratedValue::Text(template.expand(rng)),
            CompiledPattern::Range(sampler) => sampler.sample(rng),
        }
    }
}

/// Compile and sample a single value.
pub fn generate_pattern(
    field: &str,
    spec: &PatternSpec,
    ctx: &PatternContext,
    rng: &mut dyn RngCore,
) -> Result<GeneratedValue, GenerationError> {
    Ok(CompiledPattern::compile(field, spec, ctx)?.sample(rng))
}
