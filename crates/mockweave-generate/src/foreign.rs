use std::collections::BTreeMap;

use rand::{Rng, RngCore};

use crate::errors::GenerationError;

/// Per-entity identifier pools for one generation call.
///
/// Pools are append-only: identifiers are `{entity}_{n}` with `n` starting
/// at 1, and nothing is removed or rewritten until the pools are dropped.
#[derive(Debug, Default)]
pub struct IdPools {
    pools: BTreeMap<String, Vec<String>>,
    null_probability: f64,
}

impl IdPools {
    /// `null_probability` must already be validated to lie in `[0, 1]`.
    pub fn new(null_probability: f64) -> Self {
        Self {
            pools: BTreeMap::new(),
            null_probability,
        }
    }

    /// Create an empty pool for `entity`, reserving room for `count` ids.
    pub fn begin_entity(&mut self, entity: &str, count: usize) {
        self.pools
            .entry(entity.to_string())
            .or_default()
            .reserve(count);
    }

    /// Append and return the next identifier for `entity`.
    pub fn next_id(&mut self, entity: &str) -> String {
        let pool = self.pools.entry(entity.to_string()).or_default();
        let id = format!("{entity}_{}", pool.len() + 1);
        pool.push(id.clone());
        id
    }

    pub fn ids_for(&self, entity: &str) -> &[String] {
        self.pools.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sample a foreign key into `target`.
    ///
    /// The target pool must be populated. For nullable relationships the null
    /// draw comes first, then a uniform pick from the pool.
    pub fn sample_foreign_key(
        &self,
        target: &str,
        nullable: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Option<String>, GenerationError> {
        let pool = self.ids_for(target);
        if pool.is_empty() {
            return Err(GenerationError::EmptyReferencePool {
                entity: target.to_string(),
            });
        }
        if nullable && self.draw_null(rng) {
            return Ok(None);
        }
        Ok(Some(pool[rng.random_range(0..pool.len())].clone()))
    }

    /// Sample a nullable self reference for the record whose id was issued last.
    ///
    /// Only ids issued before that record are candidates, so the first record
    /// always gets `None`.
    pub fn sample_self_reference(&self, entity: &str, rng: &mut dyn RngCore) -> Option<String> {
        if self.draw_null(rng) {
            return None;
        }
        let pool = self.ids_for(entity);
        let earlier = &pool[..pool.len().saturating_sub(1)];
        if earlier.is_empty() {
            return None;
        }
        Some(earlier[rng.random_range(0..earlier.len())].clone())
    }

    fn draw_null(&self, rng: &mut dyn RngCore) -> bool {
        rng.random_bool(self.null_probability)
    }
}
