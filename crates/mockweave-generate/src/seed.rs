//! Seed resolution and per-entity seed derivation.
//!
//! Every seed handed out stays within `[0, 2^53 - 1]` so it survives a round
//! trip through JSON numbers unchanged.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::errors::GenerationError;

/// Largest integer exactly representable as an IEEE-754 double.
pub const MAX_SAFE_SEED: u64 = (1 << 53) - 1;
/// Longest accepted seed text, in characters.
pub const MAX_SEED_TEXT_CHARS: usize = 100;

/// Where a resolved seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Explicit,
    Text,
    Clock,
}

/// Resolve the seed for one generation call.
///
/// An explicit seed wins over seed text; with neither, the current time is
/// used and the output is not reproducible.
pub fn resolve_seed(explicit: Option<i64>, seed_text: Option<&str>) -> Result<u64, GenerationError> {
    let (seed, source) = if let Some(seed) = explicit {
        (validate_explicit_seed(seed)?, SeedSource::Explicit)
    } else if let Some(text) = seed_text {
        (hash_seed_text(text)?, SeedSource::Text)
    } else {
        (clock_seed(), SeedSource::Clock)
    };
    debug!(seed, source = ?source, "seed resolved");
    Ok(seed)
}

fn validate_explicit_seed(seed: i64) -> Result<u64, GenerationError> {
    let seed = u64::try_from(seed).map_err(|_| {
        GenerationError::InvalidSeed(format!("seed must be non-negative, got {seed}"))
    })?;
    if seed > MAX_SAFE_SEED {
        return Err(GenerationError::InvalidSeed(format!(
            "seed {seed} exceeds {MAX_SAFE_SEED}"
        )));
    }
    Ok(seed)
}

/// Hash seed text to a stable seed.
pub fn hash_seed_text(text: &str) -> Result<u64, GenerationError> {
    if text.is_empty() {
        return Err(GenerationError::InvalidSeed(
            "seed text must not be empty".to_string(),
        ));
    }
    let chars = text.chars().count();
    if chars > MAX_SEED_TEXT_CHARS {
        return Err(GenerationError::InvalidSeed(format!(
            "seed text must be at most {MAX_SEED_TEXT_CHARS} characters, got {chars}"
        )));
    }
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Ok(truncate_digest(&hasher.finalize()))
}

/// Derive an independent, stable child seed for `label` (usually an entity name).
pub fn derive_child_seed(parent: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(parent.to_be_bytes());
    hasher.update([0_u8]);
    hasher.update(label.as_bytes());
    truncate_digest(&hasher.finalize())
}

fn clock_seed() -> u64 {
    let millis = chrono::Utc::now().timestamp_millis();
    millis.unsigned_abs() & MAX_SAFE_SEED
}

fn truncate_digest(digest: &[u8]) -> u64 {
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes) & MAX_SAFE_SEED
}
