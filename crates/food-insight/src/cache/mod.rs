//! TTL + LRU cache fronting the rating engine.
//!
//! `AnalysisCache` is a generic keyed store; `RatingCache` specializes it
//! for product content fingerprints with a 24-hour default TTL. Entries
//! expire lazily on `get` and in bulk through `sweep_expired`, which the
//! worker drives on an hourly loop. Two snapshots with identical content
//! always map to the same key, so product edits produce a new key and the
//! stale entry simply ages out.

pub mod key;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::rating::{AnalysisResult, ProductSnapshot};

/// Share of entries dropped when the capacity ceiling is hit.
const EVICTION_SHARE: f64 = 0.2;

/// Counter snapshot for observability; returned with every batch report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    pub expired: u64,
    pub len: usize,
    pub capacity: usize,
}

struct CacheEntry<V> {
    data: V,
    expires_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    sets: u64,
    evictions: u64,
    expired: u64,
}

impl<V> Default for CacheState<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
            sets: 0,
            evictions: 0,
            expired: 0,
        }
    }
}

/// Generic keyed store with per-entry TTL and least-recently-accessed
/// eviction. Time comes from the injected clock so tests can expire
/// entries without sleeping.
pub struct AnalysisCache<V> {
    clock: Arc<dyn Clock>,
    capacity: usize,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> AnalysisCache<V> {
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Fetch a live entry and touch its access time. A past-expiry entry
    /// counts as a miss and is deleted on the spot.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("cache mutex poisoned");

        let expired = match state.entries.get(key) {
            Some(entry) => now >= entry.expires_at,
            None => {
                state.misses += 1;
                return None;
            }
        };

        if expired {
            state.entries.remove(key);
            state.expired += 1;
            state.misses += 1;
            return None;
        }

        state.hits += 1;
        let entry = state.entries.get_mut(key)?;
        entry.last_accessed = now;
        Some(entry.data.clone())
    }

    /// Insert an entry with its own TTL, evicting the least-recently
    /// accessed fifth of the store first when it is full.
    pub fn set(&self, key: String, data: V, ttl: Duration) {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("cache mutex poisoned");

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            let drop_count = ((self.capacity as f64 * EVICTION_SHARE) as usize).max(1);
            let mut by_access: Vec<(String, DateTime<Utc>)> = state
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.last_accessed))
                .collect();
            by_access.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            for (stale_key, _) in by_access.into_iter().take(drop_count) {
                state.entries.remove(&stale_key);
                state.evictions += 1;
            }
            debug!(dropped = drop_count, "cache capacity reached, evicted LRU entries");
        }

        state.sets += 1;
        state.entries.insert(
            key,
            CacheEntry {
                data,
                expires_at: now + ttl,
                last_accessed: now,
            },
        );
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut state = self.state.lock().expect("cache mutex poisoned");
        state.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().expect("cache mutex poisoned");
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock().expect("cache mutex poisoned");
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every past-expiry entry and report how many were cleared.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("cache mutex poisoned");
        let stale: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| now >= entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            state.entries.remove(key);
        }
        state.expired += stale.len() as u64;
        stale.len()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().expect("cache mutex poisoned");
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            sets: state.sets,
            evictions: state.evictions,
            expired: state.expired,
            len: state.entries.len(),
            capacity: self.capacity,
        }
    }
}

/// Rating-specific wrapper keyed by product content fingerprint.
pub struct RatingCache {
    cache: AnalysisCache<AnalysisResult>,
    ttl: Duration,
}

impl RatingCache {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: AnalysisCache::new(config.capacity, clock),
            ttl: config.rating_ttl,
        }
    }

    /// Pure function of the product's rated content, not just its id: any
    /// edit to name, category, nutriments, ingredients, or grade yields a
    /// different key.
    pub fn fingerprint(product: &ProductSnapshot) -> String {
        key::build_key(
            "product_analysis",
            &json!({
                "id": product.id.0,
                "name": product.name,
                "category": product.category,
                "nutriments": product.nutriments,
                "ingredients": product.ingredients,
                "nutriscore_grade": product.nutriscore_grade,
            }),
        )
    }

    pub fn lookup(&self, product: &ProductSnapshot) -> Option<AnalysisResult> {
        self.cache.get(&Self::fingerprint(product))
    }

    pub fn store(&self, product: &ProductSnapshot, result: AnalysisResult) {
        self.cache.set(Self::fingerprint(product), result, self.ttl);
    }

    pub fn sweep_expired(&self) -> usize {
        self.cache.sweep_expired()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
