use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::clock::ManualClock;
use crate::rating::domain::{IngredientList, ProductId, ProductSnapshot};
use crate::rating::RatingEngine;

pub(super) fn engine() -> RatingEngine {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    RatingEngine::new(Arc::new(clock))
}

pub(super) fn nutriments(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

pub(super) fn product(
    id: &str,
    name: Option<&str>,
    category: Option<&str>,
    ingredients: Option<&str>,
    nutriment_entries: &[(&str, f64)],
) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId(id.to_string()),
        name: name.map(ToString::to_string),
        category: category.map(ToString::to_string),
        brand: None,
        ingredients: ingredients.map(|text| IngredientList::Text(text.to_string())),
        nutriments: nutriments(nutriment_entries),
        nutriscore_grade: None,
    }
}
