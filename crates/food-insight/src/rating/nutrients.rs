use std::collections::BTreeMap;

use super::category::EffectiveProfile;
use super::tables::{nutrient_display, NUTRIENT_GUIDELINES};

pub(crate) struct NutrientOutcome {
    pub score: f64,
    pub notes: Vec<String>,
}

/// Clamp raw nutriment values into plausible bounds per guideline key.
/// Non-finite values are dropped; keys without a guideline are ignored.
pub(crate) fn validate_nutriments(raw: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut validated = BTreeMap::new();
    for guideline in NUTRIENT_GUIDELINES {
        if let Some(value) = raw.get(guideline.key) {
            if value.is_finite() {
                validated.insert(
                    guideline.key.to_string(),
                    value.max(0.0).min(guideline.high * 5.0),
                );
            }
        }
    }
    validated
}

/// Serving size in grams, defaulting to 100 when absent or implausible.
pub(crate) fn serving_size(raw: &BTreeMap<String, f64>) -> f64 {
    raw.get("serving_size")
        .copied()
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(100.0)
}

/// Score the validated nutriment map against the guideline table, with
/// thresholds scaled by serving size and category multipliers. The running
/// score starts from the baseline macro score, not from zero.
pub(crate) fn analyze_nutrients(
    validated: &BTreeMap<String, f64>,
    profile: Option<&EffectiveProfile>,
    serving: f64,
    baseline: f64,
) -> NutrientOutcome {
    let mut score = baseline;
    let mut notes = Vec::new();

    for guideline in NUTRIENT_GUIDELINES {
        let multiplier = profile
            .map(|profile| profile.multiplier(guideline.key))
            .unwrap_or(1.0);
        let adj_low = guideline.low * serving * multiplier / 100.0;
        let adj_high = guideline.high * serving * multiplier / 100.0;
        let value = validated.get(guideline.key).copied().unwrap_or(0.0);

        let optimal_range = (adj_high - adj_low) / 2.0;
        let deviation = (value - optimal_range).abs();
        // A degenerate band means the ratio is treated as 1, i.e. no impact.
        let impact = if optimal_range == 0.0 {
            0.0
        } else {
            1.0 - (deviation / optimal_range).min(1.0)
        };

        let display = nutrient_display(guideline.key);
        if guideline.is_positive {
            if value >= adj_high {
                score += guideline.weight * impact;
                notes.push(format!("Excellent source of {display}"));
            } else if value >= adj_low {
                score += (guideline.weight / 2.0) * impact;
                notes.push(format!("Good source of {display}"));
            } else {
                score -= guideline.weight / 3.0;
                notes.push(format!("Could be improved: more {display}"));
            }
        } else if value >= adj_high {
            // Negative weight, so this is a net decrease.
            score += guideline.weight * impact;
            notes.push(format!("Consider reducing: high in {display}"));
        } else if value <= adj_low {
            // Double negative, a net increase for staying low.
            score -= guideline.weight * impact;
            notes.push(format!("Good: {display} kept low"));
        }
    }

    NutrientOutcome { score, notes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn validation_clamps_to_five_times_high() {
        let validated = validate_nutriments(&map(&[("sugars_100g", 900.0)]));
        assert_eq!(validated.get("sugars_100g").copied(), Some(22.5 * 5.0));
    }

    #[test]
    fn validation_drops_negative_values_to_zero() {
        let validated = validate_nutriments(&map(&[("proteins_100g", -4.0)]));
        assert_eq!(validated.get("proteins_100g").copied(), Some(0.0));
    }

    #[test]
    fn validation_drops_non_finite_values() {
        let validated = validate_nutriments(&map(&[("fat_100g", f64::NAN)]));
        assert!(validated.get("fat_100g").is_none());
    }

    #[test]
    fn serving_size_defaults_to_one_hundred() {
        assert_eq!(serving_size(&map(&[])), 100.0);
        assert_eq!(serving_size(&map(&[("serving_size", 30.0)])), 30.0);
        assert_eq!(serving_size(&map(&[("serving_size", -1.0)])), 100.0);
    }

    #[test]
    fn rich_protein_notes_excellent_source() {
        let validated = validate_nutriments(&map(&[("proteins_100g", 25.0)]));
        let outcome = analyze_nutrients(&validated, None, 100.0, 3.0);
        assert!(outcome
            .notes
            .iter()
            .any(|note| note == "Excellent source of protein"));
    }

    #[test]
    fn mid_band_protein_outscores_extreme_protein() {
        // The impact factor damps values far from the middle of the band, so
        // a mid-band amount contributes more than an extreme one.
        let mid = analyze_nutrients(
            &validate_nutriments(&map(&[("proteins_100g", 7.5)])),
            None,
            100.0,
            3.0,
        );
        let extreme = analyze_nutrients(
            &validate_nutriments(&map(&[("proteins_100g", 25.0)])),
            None,
            100.0,
            3.0,
        );
        assert!(mid.score > extreme.score);
    }

    #[test]
    fn high_sugar_lowers_score_with_note() {
        let validated = validate_nutriments(&map(&[("sugars_100g", 40.0)]));
        let outcome = analyze_nutrients(&validated, None, 100.0, 3.0);
        assert!(outcome
            .notes
            .iter()
            .any(|note| note == "Consider reducing: high in sugar"));
    }

    #[test]
    fn middle_band_of_negative_nutrient_is_silent() {
        // Between low (5) and high (22.5) for sugars: no score change, no note.
        let validated = validate_nutriments(&map(&[("sugars_100g", 10.0)]));
        let outcome = analyze_nutrients(&validated, None, 100.0, 3.0);
        assert!(!outcome.notes.iter().any(|note| note.contains("sugar")));
    }
}
