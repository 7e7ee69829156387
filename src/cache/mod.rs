//! Memoisation of generated tables and trained models
//!
//! Tables are keyed by `(seed, months)`. Models are keyed by a SHA-256
//! fingerprint of the table contents and the training settings, so a model
//! is never served for data it was not fitted on.

mod store;

pub use store::{CacheEntry, CacheStats, KeyedStore};

use crate::config::{GeneratorConfig, TrainingConfig};
use crate::data::{MonthlyTable, SyntheticGenerator};
use crate::error::Result;
use crate::training::{RevenueTrainer, TrainedModel};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 16;

/// Hex SHA-256 over the serialised table
pub fn fingerprint(table: &MonthlyTable) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(table)?);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Shared, explicitly invalidated cache of tables and models
pub struct AnalyticsCache {
    generator: GeneratorConfig,
    training: TrainingConfig,
    tables: KeyedStore<(u64, usize), MonthlyTable>,
    models: KeyedStore<String, TrainedModel>,
}

impl fmt::Debug for AnalyticsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsCache")
            .field("tables", &self.tables.len())
            .field("models", &self.models.len())
            .finish()
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new(GeneratorConfig::default(), TrainingConfig::default())
    }
}

impl AnalyticsCache {
    /// `generator` supplies the start date; seed and months come per call
    pub fn new(generator: GeneratorConfig, training: TrainingConfig) -> Self {
        Self {
            generator,
            training,
            tables: KeyedStore::new(DEFAULT_CAPACITY),
            models: KeyedStore::new(DEFAULT_CAPACITY),
        }
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.training
    }

    pub fn table(&self, seed: u64, months: usize) -> Result<Arc<MonthlyTable>> {
        let mut missed = false;
        let table = self.tables.get_or_try_insert(&(seed, months), || {
            missed = true;
            let config = GeneratorConfig {
                months,
                seed,
                ..self.generator.clone()
            };
            SyntheticGenerator::new(config).generate()
        })?;
        if missed {
            debug!(seed, months, "table cache miss");
        } else {
            debug!(seed, months, "table cache hit");
        }
        Ok(table)
    }

    pub fn model(&self, table: &MonthlyTable) -> Result<Arc<TrainedModel>> {
        let key = self.model_key(table)?;
        let mut missed = false;
        let model = self.models.get_or_try_insert(&key, || {
            missed = true;
            RevenueTrainer::new(self.training.clone()).fit(table)
        })?;
        if missed {
            debug!(key = %&key[..12], "model cache miss");
        } else {
            debug!(key = %&key[..12], "model cache hit");
        }
        Ok(model)
    }

    fn model_key(&self, table: &MonthlyTable) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(fingerprint(table)?.as_bytes());
        hasher.update(serde_json::to_vec(&self.training)?);
        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn invalidate_table(&self, seed: u64, months: usize) -> bool {
        let removed = self.tables.remove(&(seed, months)).is_some();
        debug!(seed, months, removed, "table invalidated");
        removed
    }

    pub fn invalidate_model(&self, table: &MonthlyTable) -> Result<bool> {
        let removed = self.models.remove(&self.model_key(table)?).is_some();
        debug!(removed, "model invalidated");
        Ok(removed)
    }

    pub fn clear(&self) {
        self.tables.clear();
        self.models.clear();
        debug!("analytics cache cleared");
    }

    pub fn table_stats(&self) -> CacheStats {
        self.tables.stats()
    }

    pub fn model_stats(&self) -> CacheStats {
        self.models.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_memoised() {
        let cache = AnalyticsCache::default();
        let a = cache.table(42, 12).unwrap();
        let b = cache.table(42, 12).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = cache.table(7, 12).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));

        let stats = cache.table_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_model_keyed_by_content() {
        let cache = AnalyticsCache::default();
        let table = cache.table(42, 24).unwrap();
        let first = cache.model(&table).unwrap();
        let second = cache.model(&table).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = cache.table(1, 24).unwrap();
        let third = cache.model(&other).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_failed_build_not_cached() {
        let cache = AnalyticsCache::default();
        assert!(cache.table(42, 0).is_err());
        assert!(cache.table(42, 0).is_err());
        let stats = cache.table_stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 0);

        let short = cache.table(42, 2).unwrap();
        assert!(cache.model(&short).is_err());
        assert_eq!(cache.model_stats().entries, 0);
    }

    #[test]
    fn test_model_stats_count_hits() {
        let cache = AnalyticsCache::default();
        let table = cache.table(42, 24).unwrap();
        cache.model(&table).unwrap();
        cache.model(&table).unwrap();
        let stats = cache.model_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_invalidation() {
        let cache = AnalyticsCache::default();
        let table = cache.table(42, 12).unwrap();
        cache.model(&table).unwrap();

        assert!(cache.invalidate_model(&table).unwrap());
        assert!(!cache.invalidate_model(&table).unwrap());
        assert!(cache.invalidate_table(42, 12));
        let regenerated = cache.table(42, 12).unwrap();
        assert!(!Arc::ptr_eq(&table, &regenerated));
        assert_eq!(*table, *regenerated);

        cache.clear();
        assert_eq!(cache.table_stats().entries, 0);
    }

    #[test]
    fn test_fingerprint_stable() {
        let cache = AnalyticsCache::default();
        let a = fingerprint(&cache.table(42, 6).unwrap()).unwrap();
        let b = fingerprint(&cache.table(43, 6).unwrap()).unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        cache.clear();
        assert_eq!(a, fingerprint(&cache.table(42, 6).unwrap()).unwrap());
    }
}
