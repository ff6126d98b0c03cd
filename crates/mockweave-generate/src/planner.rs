use mockweave_core::{DatasetSchema, resolve_generation_order};

use crate::errors::GenerationError;
use crate::seed::derive_child_seed;

/// Planned generation task for an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    pub entity: String,
    pub count: usize,
    /// Child seed derived from the call seed and the entity name.
    pub seed: u64,
}

/// Build the ordered task list for a validated schema.
///
/// Every entity appears after the entities it references.
pub fn plan_entities(
    schema: &DatasetSchema,
    seed: u64,
) -> Result<Vec<GenerationTask>, GenerationError> {
    let order = resolve_generation_order(schema)?;

    let mut tasks = Vec::with_capacity(order.len());
    for name in order {
        let entity = schema.entity(&name).ok_or_else(|| {
            GenerationError::InternalOrdering(format!(
                "resolved entity '{name}' is missing from the schema"
            ))
        })?;
        let count = usize::try_from(entity.count).map_err(|_| {
            mockweave_core::Error::InvalidSchema(format!(
                "entity '{name}' has negative count {}",
                entity.count
            ))
        })?;
        tasks.push(GenerationTask {
            seed: derive_child_seed(seed, &name),
            entity: name,
            count,
        });
    }

    Ok(tasks)
}
