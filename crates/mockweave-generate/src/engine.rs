use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use mockweave_core::{
    Archetype, DatasetSchema, EntityDefinition, MAX_ENTITY_COUNT, MIN_ENTITY_COUNT, PatternSpec,
    RESERVED_ID_FIELD, ValidationIssue, ValidationReport, validate_schema,
};

use crate::errors::GenerationError;
use crate::faker_rs::{FakeLeafGenerator, LeafGenerator, LeafOptions, LeafRecord, LocaleKey};
use crate::foreign::IdPools;
use crate::generators::GeneratedValue;
use crate::generators::heuristic::generate_for_field;
use crate::generators::pattern::{CompiledPattern, PatternContext};
use crate::model::{GenerateOptions, GeneratedRecord, GenerationResult};
use crate::planner::{GenerationTask, plan_entities};
use crate::seed::{derive_child_seed, resolve_seed};

/// Label for the `generate_custom` stream and record ids.
const CUSTOM_LABEL: &str = "record";

/// Orchestrator state for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validating,
    Ordering,
    Generating,
    Aggregating,
    Done,
    Failed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Validating => "validating",
            Phase::Ordering => "ordering",
            Phase::Generating => "generating",
            Phase::Aggregating => "aggregating",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

/// Entry point for generating datasets from a schema.
///
/// The engine holds configuration only; every call builds its own pools and
/// RNG streams, so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct GenerationEngine<G = FakeLeafGenerator> {
    options: GenerateOptions,
    leaf: G,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            leaf: FakeLeafGenerator,
        }
    }
}

impl Default for GenerationEngine {
    fn default() -> Self {
        Self::new(GenerateOptions::default())
    }
}

/// Generate a dataset with default options.
pub fn generate_dataset(
    schema: &DatasetSchema,
    seed: Option<i64>,
    locale_hint: Option<&str>,
) -> Result<GenerationResult, GenerationError> {
    GenerationEngine::default().generate_dataset(schema, seed, locale_hint)
}

/// Generate pattern-only records with default options.
pub fn generate_custom(
    count: i64,
    patterns: &BTreeMap<String, PatternSpec>,
    seed: Option<i64>,
) -> Result<Vec<GeneratedRecord>, GenerationError> {
    GenerationEngine::default().generate_custom(count, patterns, seed)
}

impl<G: LeafGenerator> GenerationEngine<G> {
    /// Use a custom leaf generator for PERSON and COMPANY values.
    pub fn with_leaf_generator(options: GenerateOptions, leaf: G) -> Self {
        Self { options, leaf }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate every entity in `schema`.
    ///
    /// Without a seed the current time is used and the output is not
    /// reproducible. Any failure aborts the whole call.
    pub fn generate_dataset(
        &self,
        schema: &DatasetSchema,
        seed: Option<i64>,
        locale_hint: Option<&str>,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(schema, seed, None, locale_hint)
    }

    /// Like [`generate_dataset`](Self::generate_dataset), seeded by hashing `seed_text`.
    pub fn generate_dataset_from_text(
        &self,
        schema: &DatasetSchema,
        seed_text: &str,
        locale_hint: Option<&str>,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(schema, None, Some(seed_text), locale_hint)
    }

    /// Generate `count` records whose fields all come from pattern specs.
    pub fn generate_custom(
        &self,
        count: i64,
        patterns: &BTreeMap<String, PatternSpec>,
        seed: Option<i64>,
    ) -> Result<Vec<GeneratedRecord>, GenerationError> {
        let start = Instant::now();
        self.options.validate()?;
        let seed = resolve_seed(seed, None)?;
        let count = validate_custom_request(count, patterns)?;

        let ctx = self.pattern_context(self.base_date());
        let mut compiled = Vec::with_capacity(patterns.len());
        for (field, spec) in patterns {
            compiled.push((field.clone(), CompiledPattern::compile(field, spec, &ctx)?));
        }

        info!(count, fields = compiled.len(), seed, "custom generation started");

        let mut rng = ChaCha8Rng::seed_from_u64(derive_child_seed(seed, CUSTOM_LABEL));
        let mut pools = IdPools::new(self.options.null_probability);
        pools.begin_entity(CUSTOM_LABEL, count);
        let records = generate_chunked(CUSTOM_LABEL, count, self.options.chunk_size, || {
            let id = pools.next_id(CUSTOM_LABEL);
            let fields = compiled
                .iter()
                .map(|(field, pattern)| (field.clone(), pattern.sample(&mut rng)))
                .collect();
            Ok(GeneratedRecord { id, fields })
        })?;

        info!(
            count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "custom generation completed"
        );
        Ok(records)
    }

    fn run(
        &self,
        schema: &DatasetSchema,
        seed: Option<i64>,
        seed_text: Option<&str>,
        locale_hint: Option<&str>,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4();
        let mut phase = Phase::Validating;

        match self.execute(schema, seed, seed_text, locale_hint, &run_id, &mut phase) {
            Ok(result) => {
                info!(
                    run_id = %run_id,
                    entities = result.entity_counts.len(),
                    total_records = result.total_records,
                    seed = result.seed,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "generation completed"
                );
                Ok(result)
            }
            Err(err) => {
                let failed_in = phase;
                transition(&mut phase, Phase::Failed);
                warn!(
                    run_id = %run_id,
                    phase = failed_in.as_str(),
                    error = %err,
                    "generation failed"
                );
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        schema: &DatasetSchema,
        seed: Option<i64>,
        seed_text: Option<&str>,
        locale_hint: Option<&str>,
        run_id: &uuid::Uuid,
        phase: &mut Phase,
    ) -> Result<GenerationResult, GenerationError> {
        let default_locale = self.options.validate()?;
        let seed = resolve_seed(seed, seed_text)?;
        let report = validate_schema(schema);
        if !report.is_valid() {
            return Err(GenerationError::SchemaInvalid(report));
        }
        let ctx = RecordContext {
            locale: resolve_locale(locale_hint, default_locale),
            base_date: self.base_date(),
        };

        info!(
            run_id = %run_id,
            entities = schema.entities.len(),
            seed,
            locale = %ctx.locale,
            "generation started"
        );

        transition(phase, Phase::Ordering);
        let tasks = plan_entities(schema, seed)?;

        transition(phase, Phase::Generating);
        let mut pools = IdPools::new(self.options.null_probability);
        let mut dataset_by_entity = BTreeMap::new();
        for task in &tasks {
            let entity = schema.entity(&task.entity).ok_or_else(|| {
                GenerationError::InternalOrdering(format!(
                    "planned entity '{}' is missing from the schema",
                    task.entity
                ))
            })?;
            let records = self.generate_entity(task, entity, &mut pools, &ctx)?;
            dataset_by_entity.insert(task.entity.clone(), records);
        }

        transition(phase, Phase::Aggregating);
        let entity_counts: BTreeMap<String, usize> = dataset_by_entity
            .iter()
            .map(|(name, records)| (name.clone(), records.len()))
            .collect();
        let total_records = entity_counts.values().sum();
        let result = GenerationResult {
            dataset_by_entity,
            entity_counts,
            total_records,
            seed,
            generation_order: tasks.into_iter().map(|task| task.entity).collect(),
        };

        transition(phase, Phase::Done);
        Ok(result)
    }

    fn generate_entity(
        &self,
        task: &GenerationTask,
        entity: &EntityDefinition,
        pools: &mut IdPools,
        ctx: &RecordContext,
    ) -> Result<Vec<GeneratedRecord>, GenerationError> {
        let entity_start = Instant::now();
        info!(
            entity = %task.entity,
            count = task.count,
            archetype = entity.archetype.as_str(),
            "generating entity"
        );

        let plan =
            EntityPlan::compile(&task.entity, entity, &self.pattern_context(ctx.base_date))?;
        let mut rng = ChaCha8Rng::seed_from_u64(task.seed);
        pools.begin_entity(&task.entity, task.count);

        let records = generate_chunked(&task.entity, task.count, self.options.chunk_size, || {
            self.generate_record(&plan, pools, &mut rng, ctx)
        })?;

        info!(
            entity = %task.entity,
            records = records.len(),
            duration_ms = entity_start.elapsed().as_millis() as u64,
            "entity generated"
        );
        Ok(records)
    }

    fn generate_record(
        &self,
        plan: &EntityPlan<'_>,
        pools: &mut IdPools,
        rng: &mut dyn RngCore,
        ctx: &RecordContext,
    ) -> Result<GeneratedRecord, GenerationError> {
        let id = pools.next_id(plan.name);

        let mut leaf_values = if plan.uses_leaf {
            let options = LeafOptions {
                seed: rng.next_u64(),
                locale: ctx.locale,
                base_date: ctx.base_date,
            };
            self.leaf.generate(plan.archetype, &options)?
        } else {
            LeafRecord::new()
        };

        let mut fields = Vec::with_capacity(plan.fields.len());
        for (field, source) in &plan.fields {
            let value: GeneratedValue = match source {
                FieldSource::SelfReference => pools.sample_self_reference(plan.name, rng).into(),
                FieldSource::ForeignKey { target, nullable } => {
                    pools.sample_foreign_key(target, *nullable, rng)?.into()
                }
                FieldSource::Pattern(pattern) => pattern.sample(rng),
                FieldSource::Leaf => match leaf_values.remove(field.as_str()) {
                    Some(value) => value,
                    None => generate_for_field(field, ctx.base_date, rng),
                },
                FieldSource::Heuristic => generate_for_field(field, ctx.base_date, rng),
            };
            fields.push((field.clone(), value));
        }

        Ok(GeneratedRecord { id, fields })
    }

    fn pattern_context(&self, base_date: NaiveDate) -> PatternContext {
        PatternContext {
            max_repeat: self.options.max_repeat,
            year: base_date.year(),
        }
    }

    fn base_date(&self) -> NaiveDate {
        self.options
            .base_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Per-call values shared by every record.
#[derive(Debug, Clone, Copy)]
struct RecordContext {
    locale: LocaleKey,
    base_date: NaiveDate,
}

/// Where one output field's value comes from, resolved once per entity.
#[derive(Debug)]
enum FieldSource<'a> {
    ForeignKey { target: &'a str, nullable: bool },
    SelfReference,
    Pattern(CompiledPattern),
    Leaf,
    Heuristic,
}

#[derive(Debug)]
struct EntityPlan<'a> {
    name: &'a str,
    archetype: Archetype,
    fields: Vec<(String, FieldSource<'a>)>,
    uses_leaf: bool,
}

impl<'a> EntityPlan<'a> {
    /// Resolve field sources: relationship, then pattern, then archetype
    /// value, then the name heuristic. Patterns are compiled here so their
    /// errors surface before any record exists.
    fn compile(
        name: &'a str,
        entity: &'a EntityDefinition,
        ctx: &PatternContext,
    ) -> Result<Self, GenerationError> {
        let archetype_fields = entity.archetype.default_fields();
        let mut fields = Vec::new();

        for field in entity.output_fields() {
            let source = if let Some(relationship) = entity.relationships.get(&field) {
                if relationship.is_exempt_self_reference(name) {
                    FieldSource::SelfReference
                } else {
                    FieldSource::ForeignKey {
                        target: relationship.references.as_str(),
                        nullable: relationship.nullable,
                    }
                }
            } else if let Some(spec) = entity.patterns.get(&field) {
                FieldSource::Pattern(CompiledPattern::compile(&field, spec, ctx)?)
            } else if archetype_fields.iter().any(|known| *known == field) {
                FieldSource::Leaf
            } else {
                FieldSource::Heuristic
            };
            fields.push((field, source));
        }

        let uses_leaf = fields
            .iter()
            .any(|(_, source)| matches!(source, FieldSource::Leaf));

        Ok(Self {
            name,
            archetype: entity.archetype,
            fields,
            uses_leaf,
        })
    }
}

fn transition(phase: &mut Phase, next: Phase) {
    debug!(from = phase.as_str(), to = next.as_str(), "phase transition");
    *phase = next;
}

/// Produce `count` items in chunks of `chunk_size`. The chunk boundaries only
/// shape the loop and logging; `produce` is called exactly `count` times in order.
fn generate_chunked<T>(
    label: &str,
    count: usize,
    chunk_size: usize,
    mut produce: impl FnMut() -> Result<T, GenerationError>,
) -> Result<Vec<T>, GenerationError> {
    let mut items = Vec::with_capacity(count);
    let mut chunk = 0_usize;
    while items.len() < count {
        let len = chunk_size.min(count - items.len());
        for _ in 0..len {
            items.push(produce()?);
        }
        debug!(
            entity = %label,
            chunk,
            records = len,
            produced = items.len(),
            "chunk generated"
        );
        chunk += 1;
    }
    Ok(items)
}

fn resolve_locale(hint: Option<&str>, default: LocaleKey) -> LocaleKey {
    match hint {
        None => default,
        Some(hint) => LocaleKey::parse(hint).unwrap_or_else(|| {
            warn!(hint, fallback = %default, "unsupported locale hint, using default");
            default
        }),
    }
}

fn validate_custom_request(
    count: i64,
    patterns: &BTreeMap<String, PatternSpec>,
) -> Result<usize, GenerationError> {
    let mut report = ValidationReport::default();
    if !(MIN_ENTITY_COUNT..=MAX_ENTITY_COUNT).contains(&count) {
        report.push_error(ValidationIssue::new(
            "invalid_count",
            "/count",
            format!("count must be between {MIN_ENTITY_COUNT} and {MAX_ENTITY_COUNT}, got {count}"),
        ));
    }
    if patterns.is_empty() {
        report.push_error(ValidationIssue::new(
            "missing_fields",
            "/patterns",
            "at least one field pattern is required",
        ));
    }
    for field in patterns.keys() {
        if field.trim().is_empty() || field == RESERVED_ID_FIELD {
            report.push_error(ValidationIssue::new(
                "reserved_field",
                format!("/patterns/{field}"),
                format!("'{field}' is not a usable field name"),
            ));
        }
    }
    if !report.is_valid() {
        return Err(GenerationError::SchemaInvalid(report));
    }
    usize::try_from(count).map_err(|_| {
        GenerationError::InvalidOptions(format!("count {count} does not fit in memory"))
    })
}
