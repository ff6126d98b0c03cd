//! Deterministic dataset synthesis for `mockweave`.
//!
//! This crate turns a validated [`DatasetSchema`](mockweave_core::DatasetSchema)
//! into records with stable identifiers and consistent foreign keys. The same
//! schema and seed always yield the same dataset.

pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod foreign;
pub mod generators;
pub mod model;
pub mod planner;
pub mod seed;

pub use engine::{GenerationEngine, Phase, generate_custom, generate_dataset};
pub use errors::GenerationError;
pub use faker_rs::{FakeLeafGenerator, LeafGenerator, LeafOptions, LeafRecord, LocaleKey};
pub use foreign::IdPools;
pub use generators::GeneratedValue;
pub use generators::pattern::{CompiledPattern, PatternContext, generate_pattern};
pub use model::{GenerateOptions, GeneratedRecord, GenerationResult};
pub use seed::{MAX_SAFE_SEED, derive_child_seed, resolve_seed};
