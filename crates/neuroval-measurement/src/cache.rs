// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Caller-owned cache of assembled measurements.
//!
//! Entries are keyed by everything that determines a batch measurement: the
//! dataset label, the method narrative, the collection strategy, the
//! sampling policy, the replication count and a content hash of the
//! resolved parameter sets. The cache lives exactly as long as its owner;
//! two runs only share entries when they share the cache.

use crate::collector::{Collected, CollectionStrategy};
use crate::types::MeasurementResult;
use ahash::AHashMap;
use neuroval_structures::{ParameterSet, SamplingMethodology, Table};
use std::collections::VecDeque;
use tracing::trace;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum entries kept; the least recently used entry is evicted first
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 64 }
    }
}

/// Statistics for cache use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub evictions: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

/// Identity of one batch measurement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dataset: String,
    pub method: String,
    pub strategy: CollectionStrategy,
    pub sampling: SamplingMethodology,
    pub replication: usize,
    pub parameters: u64,
}

/// What a cached batch measurement holds
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMeasurement {
    pub data: Collected,
    pub parameter_sets: usize,
}

/// Assembled measurements by [`CacheKey`]
#[derive(Debug, Default)]
pub struct MeasurementCache {
    config: CacheConfig,
    entries: AHashMap<CacheKey, CachedMeasurement>,
    access_order: VecDeque<CacheKey>,
    stats: CacheStats,
}

impl MeasurementCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Look up a measurement, counting the hit or miss
    pub fn get(&mut self, key: &CacheKey) -> Option<CachedMeasurement> {
        match self.entries.get(key) {
            Some(entry) => {
                let entry = entry.clone();
                self.touch(key);
                self.stats.cache_hits += 1;
                trace!(target: "neuroval-measurement", "Cache hit for {}", key.dataset);
                Some(entry)
            }
            None => {
                self.stats.cache_misses += 1;
                None
            }
        }
    }

    /// Store a measurement, evicting the least recently used entry when full
    pub fn insert(&mut self, key: CacheKey, measurement: CachedMeasurement) {
        if self.config.max_entries == 0 {
            return;
        }
        if self.entries.insert(key.clone(), measurement).is_some() {
            self.touch(&key);
            return;
        }
        self.access_order.push_back(key);
        while self.entries.len() > self.config.max_entries {
            let Some(oldest) = self.access_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(position) = self.access_order.iter().position(|k| k == key) {
            if let Some(key) = self.access_order.remove(position) {
                self.access_order.push_back(key);
            }
        }
    }
}

/// Content hash of a list of parameter sets
pub fn parameters_fingerprint(sets: &[ParameterSet]) -> MeasurementResult<u64> {
    let rows = sets
        .iter()
        .map(ParameterSet::flatten)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table::from_records(&rows).fingerprint()?)
}
