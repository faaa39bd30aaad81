use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ingredient declarations arrive either as the raw label text or already
/// split by an upstream importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientList {
    Text(String),
    Items(Vec<String>),
}

impl IngredientList {
    /// Normalized entries: split on commas for label text, trimmed, empty
    /// entries dropped.
    pub fn entries(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            IngredientList::Text(text) => text.split(',').collect(),
            IngredientList::Items(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Read-only product content the engine rates. Owned by the persistence
/// collaborator; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub ingredients: Option<IngredientList>,
    /// Per-100g nutriment values keyed by field name (e.g. `sugars_100g`).
    /// A BTreeMap keeps fingerprints and analysis order deterministic.
    #[serde(default)]
    pub nutriments: BTreeMap<String, f64>,
    pub nutriscore_grade: Option<String>,
}

impl ProductSnapshot {
    pub fn has_nutriments(&self) -> bool {
        !self.nutriments.is_empty()
    }

    pub fn has_ingredients(&self) -> bool {
        self.ingredients
            .as_ref()
            .map(|list| !list.is_empty())
            .unwrap_or(false)
    }

    /// Short identifying summary used as log context.
    pub fn summary(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} [{}]", self.id),
            None => format!("<unnamed> [{}]", self.id),
        }
    }
}

/// Verdict band attached to a final score, monotonic in the score, plus the
/// two fallback labels used when a rating could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingLabel {
    ExcellentChoice,
    HealthyChoice,
    ModeratelyHealthy,
    LessHealthy,
    NotRecommended,
    InsufficientData,
    AnalysisFailed,
}

impl RatingLabel {
    pub fn for_score(score: f64) -> Self {
        if score >= 4.5 {
            Self::ExcellentChoice
        } else if score >= 4.0 {
            Self::HealthyChoice
        } else if score >= 3.0 {
            Self::ModeratelyHealthy
        } else if score >= 2.0 {
            Self::LessHealthy
        } else {
            Self::NotRecommended
        }
    }

    pub const fn text(self) -> &'static str {
        match self {
            Self::ExcellentChoice => "Excellent Choice",
            Self::HealthyChoice => "Healthy Choice",
            Self::ModeratelyHealthy => "Moderately Healthy",
            Self::LessHealthy => "Less Healthy",
            Self::NotRecommended => "Not Recommended",
            Self::InsufficientData => "Insufficient Data",
            Self::AnalysisFailed => "Analysis Failed",
        }
    }
}

/// Traffic-light color band for a final score; gray marks fallback results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingColor {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl RatingColor {
    pub fn for_score(score: f64) -> Self {
        if score >= 4.0 {
            Self::Green
        } else if score >= 3.0 {
            Self::Yellow
        } else if score >= 2.0 {
            Self::Orange
        } else {
            Self::Red
        }
    }

    pub const fn text(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }
}

/// Internal failure taxonomy threaded through the pipeline stages. The
/// public entry point converts every variant into a safe default result,
/// so callers never see this as an error value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("missing data: {detail}")]
    MissingData { detail: String },
    #[error("calculation failed: {detail}")]
    Calculation { detail: String },
    #[error("validation failed: {detail}")]
    Validation { detail: String },
}

impl EngineError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingData { .. } => "missing_data",
            Self::Calculation { .. } => "calculation_error",
            Self::Validation { .. } => "validation_error",
        }
    }
}

/// Context captured when a rating falls back to the safe default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingError {
    pub kind: String,
    pub message: String,
    pub product: String,
    pub at: DateTime<Utc>,
}

/// Final engine output. Created fresh on every invocation and never
/// mutated after return; `error` marks the rating as a fallback rather
/// than a computed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Always within [1, 5], rounded to one decimal.
    pub score: f64,
    /// Ordered, human-readable findings: nutrient notes first, then
    /// per-ingredient lines.
    pub analysis: Vec<String>,
    pub rating: RatingLabel,
    pub color: RatingColor,
    /// How much input was available to rate on, in [0, 1].
    pub confidence: f64,
    /// Share of the core fields present, in [0, 100].
    pub data_completeness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RatingError>,
    /// Set when only one of nutriments/ingredients was available.
    pub partial_data: bool,
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}
