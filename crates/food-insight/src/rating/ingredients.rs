use super::tables::{IngredientRule, INGREDIENT_ALIASES, INGREDIENT_RULES, PROCESSING_NOTES};

pub(crate) struct IngredientOutcome {
    pub score: f64,
    pub notes: Vec<String>,
}

/// Score a normalized ingredient list against the lexicon. Earlier-listed
/// ingredients weigh more (by labeling convention they are the most
/// abundant); one ingredient may match several rule buckets, and every
/// matching weight accumulates.
pub(crate) fn analyze_ingredients(entries: &[String]) -> IngredientOutcome {
    let total = entries.len();
    let mut score = 3.0;
    let mut notes = Vec::new();

    for (index, ingredient) in entries.iter().enumerate() {
        let lowered = ingredient.to_lowercase();
        let position_weight = 1.0 - index as f64 / total as f64;

        for rule in INGREDIENT_RULES {
            if rule_matches(rule, &lowered) {
                score += rule.weight * position_weight;
                let suffix = processing_suffix(&lowered);
                notes.push(format!(
                    "{}. {}: {}{}",
                    index + 1,
                    ingredient,
                    rule.reason,
                    suffix
                ));
            }
        }
    }

    IngredientOutcome { score, notes }
}

/// Direct match on any rule term, or an indirect match through the alias
/// table: a main term contained in the rule term whose alias is contained
/// in the ingredient.
fn rule_matches(rule: &IngredientRule, lowered: &str) -> bool {
    if rule.match_terms.iter().any(|term| lowered.contains(term)) {
        return true;
    }
    INGREDIENT_ALIASES.iter().any(|(main, aliases)| {
        rule.match_terms.iter().any(|term| term.contains(main))
            && aliases.iter().any(|alias| lowered.contains(alias))
    })
}

fn processing_suffix(lowered: &str) -> String {
    PROCESSING_NOTES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, note)| format!(" ({note})"))
        .unwrap_or_default()
}
