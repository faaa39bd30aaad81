use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::clock::Clock;

use super::baseline::baseline_score;
use super::category::detect_profile;
use super::domain::{
    AnalysisResult, EngineError, ProductSnapshot, RatingColor, RatingError, RatingLabel,
};
use super::ingredients::analyze_ingredients;
use super::nutrients::{analyze_nutrients, serving_size, validate_nutriments};

const NEUTRAL_SCORE: f64 = 3.0;
/// Phrases that contradict a near-perfect score during post-validation.
const NEGATIVE_PHRASES: &[&str] = &["high in sugar", "high in fat", "processed"];

/// Deterministic health-rating engine. The `analyze` entry point never
/// fails: every internal error is logged and converted into the safe
/// default result, so callers always receive a well-formed rating.
pub struct RatingEngine {
    clock: Arc<dyn Clock>,
}

impl RatingEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn analyze(&self, product: &ProductSnapshot) -> AnalysisResult {
        match self.run_pipeline(product) {
            Ok(result) => result,
            Err(error) => {
                warn!(
                    product = %product.summary(),
                    kind = error.kind(),
                    at = %self.clock.now(),
                    "health rating fell back to default: {error}"
                );
                self.fallback(product, error)
            }
        }
    }

    fn run_pipeline(&self, product: &ProductSnapshot) -> Result<AnalysisResult, EngineError> {
        let has_nutriments = product.has_nutriments();
        let has_ingredients = product.has_ingredients();

        if !has_nutriments && !has_ingredients {
            return Err(EngineError::MissingData {
                detail: "no nutriment values and no ingredient list".to_string(),
            });
        }
        let partial_data = has_nutriments != has_ingredients;

        let profile = detect_profile(product.name.as_deref(), product.category.as_deref());
        let validated = validate_nutriments(&product.nutriments);
        let serving = serving_size(&product.nutriments);
        let baseline = baseline_score(&product.nutriments);

        // Sequential blend: each stage folds into the previous blended
        // value, not back into the starting baseline.
        let mut final_score = baseline;
        let mut analysis = Vec::new();

        if has_nutriments {
            let outcome = analyze_nutrients(&validated, profile.as_ref(), serving, baseline);
            final_score = final_score * 0.4 + outcome.score * 0.6;
            analysis.extend(outcome.notes);
        }

        if has_ingredients {
            let entries = product
                .ingredients
                .as_ref()
                .map(|list| list.entries())
                .unwrap_or_default();
            let outcome = analyze_ingredients(&entries);
            final_score = final_score * 0.6 + outcome.score * 0.4;
            analysis.extend(outcome.notes);
        }

        final_score *= profile
            .as_ref()
            .map(|profile| profile.score_adjustment)
            .unwrap_or(1.0);

        if !final_score.is_finite() {
            return Err(EngineError::Calculation {
                detail: "blended score is not a finite number".to_string(),
            });
        }

        let score = round_tenths(final_score).clamp(1.0, 5.0);

        let mut confidence: f64 = 0.0;
        if has_nutriments {
            confidence += 0.4;
        }
        if has_ingredients {
            confidence += 0.3;
        }
        if product.nutriscore_grade.is_some() {
            confidence += 0.2;
        }
        if product.category.is_some() {
            confidence += 0.1;
        }
        let confidence = confidence.min(1.0);

        let result = AnalysisResult {
            score,
            analysis,
            rating: RatingLabel::for_score(score),
            color: RatingColor::for_score(score),
            confidence,
            data_completeness: data_completeness(product),
            error: None,
            partial_data,
        };

        validate_result(&result, &product.nutriments)?;
        Ok(result)
    }

    fn fallback(&self, product: &ProductSnapshot, error: EngineError) -> AnalysisResult {
        let rating = match error {
            EngineError::MissingData { .. } => RatingLabel::InsufficientData,
            _ => RatingLabel::AnalysisFailed,
        };
        AnalysisResult {
            score: NEUTRAL_SCORE,
            analysis: vec![format!("Error: {error}")],
            rating,
            color: RatingColor::Gray,
            confidence: 0.0,
            data_completeness: data_completeness(product),
            error: Some(RatingError {
                kind: error.kind().to_string(),
                message: error.to_string(),
                product: product.summary(),
                at: self.clock.now(),
            }),
            partial_data: product.has_nutriments() != product.has_ingredients(),
        }
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn data_completeness(product: &ProductSnapshot) -> f64 {
    let present = [
        product.name.is_some(),
        product.category.is_some(),
        product.has_nutriments(),
        product.has_ingredients(),
    ]
    .iter()
    .filter(|flag| **flag)
    .count();
    present as f64 / 4.0 * 100.0
}

/// Internal consistency checks over the assembled result. A failure
/// discards the whole result, never a partial salvage.
fn validate_result(
    result: &AnalysisResult,
    nutriments: &BTreeMap<String, f64>,
) -> Result<(), EngineError> {
    if !(1.0..=5.0).contains(&result.score) {
        return Err(EngineError::Validation {
            detail: format!("score {} outside the 1-5 range", result.score),
        });
    }

    // Crude plausibility check over the raw input values, before any
    // clamping: per-100g figures above 100 are suspect for everything
    // except calorie counts. Unit-blind on purpose; it is known to
    // false-positive on milligram-scale nutrients.
    for (key, value) in nutriments {
        if !key.contains("calories") && *value > 100.0 {
            return Err(EngineError::Validation {
                detail: format!("implausible value {value} for {key}"),
            });
        }
    }

    if result.score > 4.5 {
        let joined = result.analysis.join(" ").to_lowercase();
        if let Some(phrase) = NEGATIVE_PHRASES
            .iter()
            .find(|phrase| joined.contains(**phrase))
        {
            return Err(EngineError::Validation {
                detail: format!("analysis mentions \"{phrase}\" while score is {}", result.score),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(score: f64, analysis: Vec<String>) -> AnalysisResult {
        AnalysisResult {
            score,
            analysis,
            rating: RatingLabel::for_score(score),
            color: RatingColor::for_score(score),
            confidence: 0.5,
            data_completeness: 50.0,
            error: None,
            partial_data: false,
        }
    }

    #[test]
    fn rejects_out_of_range_score() {
        let result = result_with(5.3, Vec::new());
        let err = validate_result(&result, &BTreeMap::new()).expect_err("rejected");
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn rejects_negative_phrase_on_near_perfect_score() {
        let result = result_with(4.6, vec!["1. syrup: high in sugar content".to_string()]);
        let err = validate_result(&result, &BTreeMap::new()).expect_err("rejected");
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn allows_negative_phrase_below_the_threshold() {
        let result = result_with(4.4, vec!["1. syrup: high in sugar content".to_string()]);
        assert!(validate_result(&result, &BTreeMap::new()).is_ok());
    }
}
