use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use food_insight::config::SchedulerConfig;
use food_insight::rating::ProductId;
use food_insight::scheduler::store::{
    is_due, HealthAssessment, ProductRecord, ProductStore, RatingUpdate, StoreError,
};

/// In-memory catalog store backing the worker binary and its demos. The
/// production catalog sits behind the same `ProductStore` trait.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProductStore {
    records: Arc<Mutex<HashMap<ProductId, ProductRecord>>>,
    config: SchedulerConfig,
}

impl InMemoryProductStore {
    pub(crate) fn new(config: SchedulerConfig) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    pub(crate) fn insert(&self, record: ProductRecord) {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.snapshot.id.clone(), record);
    }

    pub(crate) fn get(&self, id: &ProductId) -> Option<ProductRecord> {
        let guard = self.records.lock().expect("store mutex poisoned");
        guard.get(id).cloned()
    }

    pub(crate) fn all(&self) -> Vec<ProductRecord> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<ProductRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.snapshot.id.cmp(&b.snapshot.id));
        records
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn due_for_rating(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut due: Vec<ProductRecord> = guard
            .values()
            .filter(|record| is_due(record, now, &self.config))
            .cloned()
            .collect();
        due.sort_by_key(|record| record.last_evaluated);
        due.truncate(limit);
        Ok(due)
    }

    async fn fetch(&self, id: &ProductId) -> Result<Option<ProductRecord>, StoreError> {
        Ok(self.get(id))
    }

    async fn apply_rating(&self, id: &ProductId, update: RatingUpdate) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.health = Some(HealthAssessment {
            health_rating: update.health_rating,
            health_analysis: update.health_analysis,
            health_rating_label: update.health_rating_label,
            health_rating_color: update.health_rating_color,
            confidence: update.confidence,
            data_completeness: update.data_completeness,
        });
        record.last_evaluated = Some(update.last_fetched);
        if let Some(at) = update.last_significant_update {
            record.last_significant_update = Some(at);
        }
        Ok(())
    }
}
