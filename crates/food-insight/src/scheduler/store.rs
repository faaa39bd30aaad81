use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::rating::{ProductId, ProductSnapshot};

/// Persisted health-rating fields on a catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub health_rating: f64,
    pub health_analysis: Vec<String>,
    pub health_rating_label: String,
    pub health_rating_color: String,
    pub confidence: f64,
    pub data_completeness: f64,
}

/// Catalog record as the store returns it: the rated content plus the
/// rating bookkeeping the scheduler maintains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub snapshot: ProductSnapshot,
    pub health: Option<HealthAssessment>,
    pub last_evaluated: Option<DateTime<Utc>>,
    pub last_significant_update: Option<DateTime<Utc>>,
}

/// Fields written back to a record after an evaluation.
/// `last_significant_update` is `None` when the existing timestamp must be
/// left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub health_rating: f64,
    pub health_analysis: Vec<String>,
    pub health_rating_label: String,
    pub health_rating_color: String,
    pub confidence: f64,
    pub data_completeness: f64,
    pub last_fetched: DateTime<Utc>,
    pub rating_changed: bool,
    pub last_significant_update: Option<DateTime<Utc>>,
    pub cache_hit: bool,
}

/// Storage abstraction so the scheduler can run against an in-memory store
/// in tests and the worker; the real catalog sits behind the same trait.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Records matching any staleness predicate, sorted ascending by last
    /// evaluated timestamp (never-evaluated records first), limited to
    /// `limit`. Implementations can lean on [`is_due`] for the predicate.
    async fn due_for_rating(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProductRecord>, StoreError>;

    async fn fetch(&self, id: &ProductId) -> Result<Option<ProductRecord>, StoreError>;

    async fn apply_rating(&self, id: &ProductId, update: RatingUpdate) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The neutral default rating; records stuck at it are re-checked early.
pub const NEUTRAL_RATING: f64 = 3.0;

/// The three OR'd staleness predicates deciding batch eligibility:
/// a rating older than the stale window, an unrated or neutral-default
/// record past the shorter re-check window, or a rated record missing its
/// analysis text (backfill).
pub fn is_due(record: &ProductRecord, now: DateTime<Utc>, config: &SchedulerConfig) -> bool {
    let age_exceeds = |window: chrono::Duration| {
        record
            .last_evaluated
            .map(|at| now - at > window)
            .unwrap_or(true)
    };

    if age_exceeds(config.stale_after) {
        return true;
    }

    let unrated_or_neutral = record
        .health
        .as_ref()
        .map(|health| health.health_rating == NEUTRAL_RATING)
        .unwrap_or(true);
    if unrated_or_neutral && age_exceeds(config.neutral_recheck_after) {
        return true;
    }

    record
        .health
        .as_ref()
        .map(|health| health.health_analysis.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone};

    use super::*;

    fn record(
        rating: Option<f64>,
        analysis: Vec<String>,
        evaluated_hours_ago: Option<i64>,
        now: DateTime<Utc>,
    ) -> ProductRecord {
        ProductRecord {
            snapshot: ProductSnapshot {
                id: ProductId("p-1".to_string()),
                name: Some("Test".to_string()),
                category: None,
                brand: None,
                ingredients: None,
                nutriments: BTreeMap::new(),
                nutriscore_grade: None,
            },
            health: rating.map(|health_rating| HealthAssessment {
                health_rating,
                health_analysis: analysis.clone(),
                health_rating_label: "Moderately Healthy".to_string(),
                health_rating_color: "yellow".to_string(),
                confidence: 0.5,
                data_completeness: 50.0,
            }),
            last_evaluated: evaluated_hours_ago.map(|hours| now - Duration::hours(hours)),
            last_significant_update: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn stale_window_makes_a_record_due() {
        let config = SchedulerConfig::default();
        let note = vec!["note".to_string()];
        assert!(is_due(
            &record(Some(4.0), note.clone(), Some(25), now()),
            now(),
            &config
        ));
        assert!(!is_due(
            &record(Some(4.0), note, Some(23), now()),
            now(),
            &config
        ));
    }

    #[test]
    fn neutral_or_unrated_records_use_the_shorter_window() {
        let config = SchedulerConfig::default();
        let note = vec!["note".to_string()];
        assert!(is_due(
            &record(Some(NEUTRAL_RATING), note.clone(), Some(13), now()),
            now(),
            &config
        ));
        assert!(is_due(&record(None, note, Some(13), now()), now(), &config));
        assert!(is_due(
            &record(Some(NEUTRAL_RATING), vec!["note".to_string()], None, now()),
            now(),
            &config
        ));
    }

    #[test]
    fn rated_record_without_analysis_text_is_backfilled() {
        let config = SchedulerConfig::default();
        assert!(is_due(
            &record(Some(4.0), Vec::new(), Some(1), now()),
            now(),
            &config
        ));
    }
}
