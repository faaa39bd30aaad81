use std::collections::BTreeMap;

const IDEAL_PROTEIN_RATIO: f64 = 0.25;
const IDEAL_CARB_RATIO: f64 = 0.50;
const IDEAL_FAT_RATIO: f64 = 0.25;

/// Neutral starting score derived from how far the macro calorie split sits
/// from the ideal protein/carb/fat ratios. Clamped to [1, 5].
pub(crate) fn baseline_score(nutriments: &BTreeMap<String, f64>) -> f64 {
    let grams = |key: &str| nutriments.get(key).copied().unwrap_or(0.0).max(0.0);

    let protein_cals = grams("proteins_100g") * 4.0;
    let carb_cals = grams("carbohydrates_100g") * 4.0;
    let fat_cals = grams("fat_100g") * 9.0;

    let total = protein_cals + carb_cals + fat_cals;
    let total = if total == 0.0 { 1.0 } else { total };

    let deviation = (protein_cals / total - IDEAL_PROTEIN_RATIO).abs()
        + (carb_cals / total - IDEAL_CARB_RATIO).abs()
        + (fat_cals / total - IDEAL_FAT_RATIO).abs();

    (3.0 - deviation * 2.0).clamp(1.0, 5.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nutriments(protein: f64, carbs: f64, fat: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("proteins_100g".to_string(), protein),
            ("carbohydrates_100g".to_string(), carbs),
            ("fat_100g".to_string(), fat),
        ])
    }

    #[test]
    fn ideal_split_scores_three() {
        // 25/50/25 calorie split: 25g protein, 50g carbs, 100/9 g fat per 400 kcal.
        let map = nutriments(25.0, 50.0, 100.0 / 9.0);
        let score = baseline_score(&map);
        assert!((score - 3.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn skewed_split_scores_below_three() {
        let map = nutriments(0.0, 0.0, 50.0);
        assert!(baseline_score(&map) < 3.0);
    }

    #[test]
    fn zero_calories_guard_yields_valid_score() {
        let map = BTreeMap::new();
        let score = baseline_score(&map);
        assert!((1.0..=5.0).contains(&score));
    }
}
