use rand::{Rng, RngCore};
use regex::Regex;

use crate::errors::GenerationError;

/// Largest `N` accepted in `{{random:N}}` and `{{number:N}}`.
pub const MAX_PLACEHOLDER_WIDTH: usize = 1024;

const PLACEHOLDER: &str = r"\{\{(?:(year)|random:([0-9]+)|number:([0-9]+))\}\}";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DIGITS: &[u8] = b"0123456789";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Random(usize),
    Number(usize),
}

/// Parsed template. Anything that is not one of the three placeholders,
/// including `{{random:0}}`, stays verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(template: &str, year: i32) -> Result<Self, GenerationError> {
        let placeholder = Regex::new(PLACEHOLDER).map_err(|err| {
            GenerationError::InvalidPattern(format!("placeholder scanner failed: {err}"))
        })?;

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in placeholder.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            literal.push_str(&template[last..whole.start()]);
            last = whole.end();

            if caps.get(1).is_some() {
                literal.push_str(&year.to_string());
                continue;
            }

            let (width, is_random) = match (caps.get(2), caps.get(3)) {
                (Some(width), _) => (width.as_str(), true),
                (None, Some(width)) => (width.as_str(), false),
                (None, None) => {
                    literal.push_str(whole.as_str());
                    continue;
                }
            };
            let width = parse_width(width, template)?;
            if width == 0 {
                literal.push_str(whole.as_str());
                continue;
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(if is_random {
                Segment::Random(width)
            } else {
                Segment::Number(width)
            });
        }

        literal.push_str(&template[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Expand the template; each placeholder draws independently.
    pub fn expand(&self, rng: &mut dyn RngCore) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Random(width) => push_random(&mut out, ALPHANUMERIC, *width, rng),
                Segment::Number(width) => push_random(&mut out, DIGITS, *width, rng),
            }
        }
        out
    }
}

fn parse_width(raw: &str, template: &str) -> Result<usize, GenerationError> {
    match raw.parse::<usize>() {
        Ok(width) if width <= MAX_PLACEHOLDER_WIDTH => Ok(width),
        _ => Err(GenerationError::InvalidPattern(format!(
            "placeholder width {raw} in '{template}' exceeds {MAX_PLACEHOLDER_WIDTH}"
        ))),
    }
}

fn push_random(out: &mut String, charset: &[u8], width: usize, rng: &mut dyn RngCore) {
    out.reserve(width);
    for _ in 0..width {
        out.push(charset[rng.random_range(0..charset.len())] as char);
    }
}
