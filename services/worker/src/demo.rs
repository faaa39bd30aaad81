use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;

use food_insight::cache::RatingCache;
use food_insight::clock::{Clock, SystemClock};
use food_insight::config::AppConfig;
use food_insight::rating::{IngredientList, ProductId, ProductSnapshot, RatingEngine};
use food_insight::scheduler::store::ProductRecord;
use food_insight::scheduler::BatchScheduler;

use crate::error::AppError;
use crate::infra::InMemoryProductStore;

#[derive(Args, Debug, Default)]
pub(crate) struct RateArgs {
    /// Rate a single seeded product by id instead of the whole catalog.
    #[arg(long)]
    pub(crate) id: Option<String>,
}

/// Seed a small catalog that exercises every rule family: sugary drink,
/// salty snack, cultured dairy, fortified cereal, and a whole-food soup.
pub(crate) fn seed_catalog(store: &InMemoryProductStore) {
    let now = Utc::now();
    let seeds = [
        (
            "demo-soda",
            "Fizzy Cola Soda",
            "beverages",
            "carbonated water, sugar, caramel color, phosphoric acid, natural flavors",
            &[
                ("sugars_100g", 10.6),
                ("carbohydrates_100g", 10.6),
                ("sodium_100g", 0.01),
                ("calories_100g", 42.0),
            ][..],
        ),
        (
            "demo-chips",
            "Crispy Potato Chips",
            "snacks",
            "potatoes, vegetable oil, salt, dextrose",
            &[
                ("fat_100g", 34.0),
                ("saturated_fat_100g", 3.1),
                ("sodium_100g", 0.5),
                ("carbohydrates_100g", 53.0),
                ("proteins_100g", 6.5),
                ("calories_100g", 536.0),
            ][..],
        ),
        (
            "demo-yogurt",
            "Plain Greek Yogurt",
            "dairy",
            "milk, live cultures",
            &[
                ("proteins_100g", 9.0),
                ("carbohydrates_100g", 3.9),
                ("fat_100g", 5.0),
                ("sugars_100g", 3.9),
                ("calories_100g", 97.0),
            ][..],
        ),
        (
            "demo-granola",
            "Honey Granola Cereal",
            "cereals",
            "whole grain oats, honey, almond, raisins, sunflower seed oil",
            &[
                ("proteins_100g", 10.0),
                ("carbohydrates_100g", 64.0),
                ("fat_100g", 12.0),
                ("sugars_100g", 21.0),
                ("fiber_100g", 7.0),
                ("calories_100g", 412.0),
            ][..],
        ),
        (
            "demo-soup",
            "Hearty Lentil Soup",
            "fresh vegetable soup",
            "water, lentil, carrot, spinach, olive oil, salt",
            &[
                ("proteins_100g", 4.5),
                ("carbohydrates_100g", 9.0),
                ("fat_100g", 1.5),
                ("fiber_100g", 3.0),
                ("sodium_100g", 0.35),
                ("calories_100g", 65.0),
            ][..],
        ),
    ];

    for (id, name, category, ingredients, nutriments) in seeds {
        store.insert(ProductRecord {
            snapshot: ProductSnapshot {
                id: ProductId(id.to_string()),
                name: Some(name.to_string()),
                category: Some(category.to_string()),
                brand: None,
                ingredients: Some(IngredientList::Text(ingredients.to_string())),
                nutriments: nutriments
                    .iter()
                    .map(|(key, value)| (key.to_string(), *value))
                    .collect::<BTreeMap<String, f64>>(),
                nutriscore_grade: None,
            },
            health: None,
            // Seeded as stale so the first batch run picks everything up.
            last_evaluated: Some(now - Duration::hours(48)),
            last_significant_update: None,
        });
    }
}

/// Rate seeded products directly through the engine and print the results.
pub(crate) fn run_rate(args: RateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = InMemoryProductStore::new(config.scheduler);
    seed_catalog(&store);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = RatingEngine::new(clock);

    let records = match args.id {
        Some(id) => {
            let wanted = ProductId(id.clone());
            vec![store.get(&wanted).ok_or(AppError::UnknownProduct(id))?]
        }
        None => store.all(),
    };

    for record in records {
        let result = engine.analyze(&record.snapshot);
        println!(
            "{}",
            serde_json::json!({
                "id": record.snapshot.id,
                "name": record.snapshot.name,
                "result": result,
            })
        );
    }
    Ok(())
}

/// Run a single batch pass over the seeded catalog and print the report.
pub(crate) async fn run_once() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(InMemoryProductStore::new(config.scheduler.clone()));
    seed_catalog(&store);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = Arc::new(RatingEngine::new(clock.clone()));
    let cache = Arc::new(RatingCache::new(&config.cache, clock.clone()));
    let scheduler = BatchScheduler::new(store, engine, cache, clock, config.scheduler);

    match scheduler.run_once().await? {
        Some(report) => {
            let rendered = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|_| "<unprintable report>".to_string());
            println!("{rendered}");
        }
        None => println!("a batch run is already in flight"),
    }
    Ok(())
}
