use std::collections::BTreeMap;

use super::tables::{CategoryProfile, CATEGORY_PROFILES};

/// Effective category profile after detection: either a single table entry
/// or the combination of every profile the product text matched. A combined
/// profile is never less strict than any one of its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveProfile {
    pub category: String,
    pub nutritional_focus: Vec<String>,
    pub score_adjustment: f64,
    pub nutrient_multipliers: BTreeMap<String, f64>,
}

impl EffectiveProfile {
    fn from_profile(profile: &CategoryProfile) -> Self {
        Self {
            category: profile.category.to_string(),
            nutritional_focus: profile
                .nutritional_focus
                .iter()
                .map(ToString::to_string)
                .collect(),
            score_adjustment: profile.score_adjustment,
            nutrient_multipliers: profile
                .nutrient_multipliers
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
        }
    }

    pub fn multiplier(&self, key: &str) -> f64 {
        self.nutrient_multipliers.get(key).copied().unwrap_or(1.0)
    }
}

/// Match the product's name and category text against the keyword profiles.
/// Zero matches yields `None`, so no category adjustment applies downstream.
pub(crate) fn detect_profile(name: Option<&str>, category: Option<&str>) -> Option<EffectiveProfile> {
    let haystack = format!(
        "{} {}",
        name.unwrap_or_default(),
        category.unwrap_or_default()
    )
    .to_lowercase();

    let matched: Vec<&CategoryProfile> = CATEGORY_PROFILES
        .iter()
        .filter(|profile| {
            profile
                .keywords
                .iter()
                .any(|keyword| haystack.contains(keyword))
        })
        .collect();

    match matched.as_slice() {
        [] => None,
        [only] => Some(EffectiveProfile::from_profile(only)),
        several => Some(combine_profiles(several)),
    }
}

fn combine_profiles(profiles: &[&CategoryProfile]) -> EffectiveProfile {
    let category = profiles
        .iter()
        .map(|profile| profile.category)
        .collect::<Vec<_>>()
        .join("/");

    let mut nutritional_focus: Vec<String> = Vec::new();
    for profile in profiles {
        for focus in profile.nutritional_focus {
            if !nutritional_focus.iter().any(|seen| seen == focus) {
                nutritional_focus.push((*focus).to_string());
            }
        }
    }

    let score_adjustment = profiles
        .iter()
        .map(|profile| profile.score_adjustment)
        .sum::<f64>()
        / profiles.len() as f64;

    // When profiles disagree on a multiplier, keep the more extreme value in
    // its own direction: >1 only gives way to a larger >1, <1 only to a
    // smaller <1.
    let mut nutrient_multipliers: BTreeMap<String, f64> = BTreeMap::new();
    for profile in profiles {
        for (key, candidate) in profile.nutrient_multipliers {
            nutrient_multipliers
                .entry((*key).to_string())
                .and_modify(|current| *current = more_extreme(*current, *candidate))
                .or_insert(*candidate);
        }
    }

    EffectiveProfile {
        category,
        nutritional_focus,
        score_adjustment,
        nutrient_multipliers,
    }
}

fn more_extreme(current: f64, candidate: f64) -> f64 {
    if current > 1.0 && candidate > current {
        candidate
    } else if current < 1.0 && candidate < current {
        candidate
    } else {
        current
    }
}
