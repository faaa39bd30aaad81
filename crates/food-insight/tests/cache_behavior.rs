//! Behavior of the generic TTL/LRU cache and the rating-specific wrapper,
//! driven by a manual clock so expiry never depends on real time.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use food_insight::cache::{AnalysisCache, RatingCache};
use food_insight::clock::ManualClock;
use food_insight::config::CacheConfig;
use food_insight::rating::{IngredientList, ProductId, ProductSnapshot};

fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
    ))
}

fn snapshot(id: &str, name: &str) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId(id.to_string()),
        name: Some(name.to_string()),
        category: Some("snacks".to_string()),
        brand: None,
        ingredients: Some(IngredientList::Text("oat, sugar".to_string())),
        nutriments: BTreeMap::from([("sugars_100g".to_string(), 12.0)]),
        nutriscore_grade: None,
    }
}

#[test]
fn entries_round_trip_until_their_ttl_elapses() {
    let clock = manual_clock();
    let cache: AnalysisCache<String> = AnalysisCache::new(100, clock.clone());

    cache.set("k".to_string(), "v".to_string(), Duration::hours(24));
    assert_eq!(cache.get("k"), Some("v".to_string()));

    clock.advance(Duration::hours(24));
    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.stats().expired, 1);
}

#[test]
fn full_cache_evicts_a_fifth_of_least_recently_accessed_entries() {
    let clock = manual_clock();
    let cache: AnalysisCache<u32> = AnalysisCache::new(10, clock.clone());

    for index in 0..10 {
        cache.set(format!("k{index}"), index, Duration::hours(24));
        clock.advance(Duration::seconds(1));
    }
    // Touch the oldest entry so it becomes the most recently accessed.
    assert!(cache.get("k0").is_some());
    clock.advance(Duration::seconds(1));

    cache.set("k10".to_string(), 10, Duration::hours(24));

    let stats = cache.stats();
    assert_eq!(stats.evictions, 2, "20% of capacity 10");
    assert_eq!(cache.len(), 9);
    assert!(cache.get("k0").is_some(), "most recent entry survives");
    assert!(cache.get("k1").is_none());
    assert!(cache.get("k2").is_none());
    assert!(cache.get("k10").is_some());
}

#[test]
fn eviction_drops_at_least_one_entry_for_tiny_capacities() {
    let clock = manual_clock();
    let cache: AnalysisCache<u32> = AnalysisCache::new(3, clock.clone());

    for index in 0..3 {
        cache.set(format!("k{index}"), index, Duration::hours(1));
        clock.advance(Duration::seconds(1));
    }
    cache.set("k3".to_string(), 3, Duration::hours(1));

    assert_eq!(cache.stats().evictions, 1);
    assert!(cache.get("k0").is_none());
}

#[test]
fn sweep_clears_only_expired_entries_and_reports_the_count() {
    let clock = manual_clock();
    let cache: AnalysisCache<u32> = AnalysisCache::new(100, clock.clone());

    cache.set("short".to_string(), 1, Duration::hours(1));
    cache.set("long".to_string(), 2, Duration::hours(3));
    clock.advance(Duration::hours(2));

    assert_eq!(cache.sweep_expired(), 1);
    assert!(cache.get("short").is_none());
    assert!(cache.get("long").is_some());
}

#[test]
fn fingerprint_is_stable_for_identical_content() {
    let a = snapshot("p-1", "Oat Bar");
    let b = snapshot("p-1", "Oat Bar");
    assert_eq!(RatingCache::fingerprint(&a), RatingCache::fingerprint(&b));
}

#[test]
fn fingerprint_changes_when_content_changes() {
    let a = snapshot("p-1", "Oat Bar");
    let mut b = snapshot("p-1", "Oat Bar");
    b.nutriments.insert("sugars_100g".to_string(), 30.0);
    assert_ne!(RatingCache::fingerprint(&a), RatingCache::fingerprint(&b));

    let mut c = snapshot("p-1", "Oat Bar");
    c.name = Some("Oat Bar Deluxe".to_string());
    assert_ne!(RatingCache::fingerprint(&a), RatingCache::fingerprint(&c));
}

#[test]
fn rating_wrapper_round_trips_by_content() {
    let clock = manual_clock();
    let cache = RatingCache::new(&CacheConfig::default(), clock.clone());
    let product = snapshot("p-9", "Trail Mix");

    assert!(cache.lookup(&product).is_none());

    let engine = food_insight::rating::RatingEngine::new(clock.clone());
    let result = engine.analyze(&product);
    cache.store(&product, result.clone());

    assert_eq!(cache.lookup(&product), Some(result));

    clock.advance(Duration::hours(25));
    assert!(cache.lookup(&product).is_none(), "24h TTL elapsed");
}
