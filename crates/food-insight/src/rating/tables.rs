//! Static guideline, lexicon, and category tables.
//!
//! Pure data, no logic: the analyzers iterate these slices in declaration
//! order, which keeps every rating deterministic. Thresholds and weights
//! are hand-tuned, not nutrition-science-accurate.

/// Per-nutrient scoring band. `weight` is positive for more-is-better
/// nutrients and negative for less-is-better ones. `bioavailability` is
/// carried as descriptive data for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientGuideline {
    pub key: &'static str,
    pub low: f64,
    pub high: f64,
    pub weight: f64,
    pub is_positive: bool,
    pub bioavailability: f64,
}

pub const NUTRIENT_GUIDELINES: &[NutrientGuideline] = &[
    NutrientGuideline {
        key: "proteins_100g",
        low: 5.0,
        high: 20.0,
        weight: 1.0,
        is_positive: true,
        bioavailability: 0.9,
    },
    NutrientGuideline {
        key: "fiber_100g",
        low: 2.0,
        high: 8.0,
        weight: 0.8,
        is_positive: true,
        bioavailability: 0.85,
    },
    NutrientGuideline {
        key: "sugars_100g",
        low: 5.0,
        high: 22.5,
        weight: -1.0,
        is_positive: false,
        bioavailability: 1.0,
    },
    NutrientGuideline {
        key: "fat_100g",
        low: 3.0,
        high: 17.5,
        weight: -0.6,
        is_positive: false,
        bioavailability: 0.95,
    },
    NutrientGuideline {
        key: "saturated_fat_100g",
        low: 1.5,
        high: 5.0,
        weight: -0.8,
        is_positive: false,
        bioavailability: 1.0,
    },
    NutrientGuideline {
        key: "sodium_100g",
        low: 0.12,
        high: 0.6,
        weight: -0.9,
        is_positive: false,
        bioavailability: 1.0,
    },
    NutrientGuideline {
        key: "calories_100g",
        low: 150.0,
        high: 400.0,
        weight: -0.4,
        is_positive: false,
        bioavailability: 1.0,
    },
];

/// Display names for analysis text. Falls back to the raw key.
pub fn nutrient_display(key: &str) -> &str {
    match key {
        "proteins_100g" => "protein",
        "fiber_100g" => "fiber",
        "sugars_100g" => "sugar",
        "fat_100g" => "fat",
        "saturated_fat_100g" => "saturated fat",
        "sodium_100g" => "sodium",
        "calories_100g" => "calories",
        other => other,
    }
}

/// Lexicon bucket matched by case-insensitive substring containment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngredientRule {
    pub category: &'static str,
    pub match_terms: &'static [&'static str],
    pub weight: f64,
    pub reason: &'static str,
}

pub const INGREDIENT_RULES: &[IngredientRule] = &[
    IngredientRule {
        category: "healthy_nutrients",
        match_terms: &[
            "whole grain",
            "oat",
            "quinoa",
            "lentil",
            "chickpea",
            "almond",
            "walnut",
            "spinach",
            "kale",
            "broccoli",
            "salmon",
            "olive oil",
            "avocado",
            "flaxseed",
            "chia",
        ],
        weight: 0.5,
        reason: "Nutrient-dense whole food",
    },
    IngredientRule {
        category: "fermented_foods",
        match_terms: &["yogurt", "kefir", "sauerkraut", "kimchi", "miso", "tempeh", "live cultures"],
        weight: 0.3,
        reason: "Contains beneficial cultures",
    },
    IngredientRule {
        category: "added_sugars",
        match_terms: &[
            "sugar",
            "corn syrup",
            "fructose",
            "dextrose",
            "maltose",
            "cane juice",
            "honey",
            "agave",
        ],
        weight: -0.5,
        reason: "Added sugar, high in sugar content",
    },
    IngredientRule {
        category: "artificial_colors",
        match_terms: &[
            "red 40",
            "yellow 5",
            "yellow 6",
            "blue 1",
            "tartrazine",
            "artificial color",
            "color added",
        ],
        weight: -0.4,
        reason: "Artificial coloring agent",
    },
    IngredientRule {
        category: "artificial_sweeteners",
        match_terms: &["aspartame", "sucralose", "saccharin", "acesulfame"],
        weight: -0.3,
        reason: "Artificial sweetener",
    },
    IngredientRule {
        category: "preservatives",
        match_terms: &[
            "benzoate", "sorbate", "nitrite", "nitrate", "sulfite", "bha", "bht", "edta",
        ],
        weight: -0.3,
        reason: "Chemical preservative",
    },
    IngredientRule {
        category: "refined_grains",
        match_terms: &["white flour", "enriched flour", "white rice", "refined wheat"],
        weight: -0.2,
        reason: "Refined grain, low in fiber",
    },
    IngredientRule {
        category: "hydrogenated_oils",
        match_terms: &["hydrogenated", "shortening", "margarine"],
        weight: -0.6,
        reason: "May contain trans fats",
    },
    IngredientRule {
        category: "excess_sodium",
        match_terms: &["salt", "monosodium glutamate", "msg", "brine", "sodium phosphate"],
        weight: -0.3,
        reason: "Adds sodium",
    },
];

/// Alias table: when a main term appears inside a rule's match term, any of
/// its aliases appearing inside the ingredient also counts as a match.
pub const INGREDIENT_ALIASES: &[(&str, &[&str])] = &[
    ("sugar", &["sucrose", "glucose syrup", "evaporated cane"]),
    ("color", &["colour", "e102", "e110", "e129", "e133"]),
    ("whole grain", &["wholemeal", "whole wheat"]),
    ("salt", &["sea salt", "rock salt"]),
];

/// Processing-method keywords and their impact phrase. Checked in order;
/// first match wins and contributes text only, never weight.
pub const PROCESSING_NOTES: &[(&str, &str)] = &[
    ("raw", "minimally processed"),
    ("organic", "organically produced"),
    ("fermented", "fermentation preserves nutrients"),
    ("roasted", "dry-roasted"),
    ("fried", "fried, adds fat"),
    ("refined", "refined, nutrients stripped"),
    ("enriched", "nutrients added back after refining"),
    ("processed", "heavily processed"),
];

/// Category keyword profile; several may match one product and are then
/// combined into a single effective profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProfile {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub nutritional_focus: &'static [&'static str],
    pub score_adjustment: f64,
    pub nutrient_multipliers: &'static [(&'static str, f64)],
}

pub const CATEGORY_PROFILES: &[CategoryProfile] = &[
    CategoryProfile {
        category: "beverages",
        keywords: &["juice", "soda", "drink", "beverage", "tea", "coffee", "smoothie"],
        nutritional_focus: &["sugars", "calories"],
        score_adjustment: 0.95,
        nutrient_multipliers: &[("sugars_100g", 1.3), ("calories_100g", 1.2)],
    },
    CategoryProfile {
        category: "snacks",
        keywords: &[
            "chips", "crisps", "cracker", "snack", "cookie", "biscuit", "candy", "chocolate",
        ],
        nutritional_focus: &["sodium", "fat", "sugars"],
        score_adjustment: 0.9,
        nutrient_multipliers: &[
            ("sodium_100g", 1.3),
            ("fat_100g", 1.2),
            ("sugars_100g", 1.2),
        ],
    },
    CategoryProfile {
        category: "dairy",
        keywords: &["milk", "cheese", "yogurt", "dairy", "cream"],
        nutritional_focus: &["protein", "saturated fat"],
        score_adjustment: 1.0,
        nutrient_multipliers: &[("proteins_100g", 1.2), ("saturated_fat_100g", 1.1)],
    },
    CategoryProfile {
        category: "cereals",
        keywords: &["cereal", "granola", "muesli", "porridge", "oatmeal"],
        nutritional_focus: &["fiber", "sugars"],
        score_adjustment: 1.05,
        nutrient_multipliers: &[("fiber_100g", 1.3), ("sugars_100g", 1.2)],
    },
    CategoryProfile {
        category: "produce",
        keywords: &["fruit", "vegetable", "salad", "fresh", "greens"],
        nutritional_focus: &["fiber", "vitamins"],
        score_adjustment: 1.1,
        nutrient_multipliers: &[("fiber_100g", 1.2), ("sugars_100g", 0.8)],
    },
    CategoryProfile {
        category: "meat_seafood",
        keywords: &["meat", "chicken", "beef", "pork", "fish", "seafood", "tuna"],
        nutritional_focus: &["protein", "sodium"],
        score_adjustment: 1.0,
        nutrient_multipliers: &[("proteins_100g", 1.3), ("sodium_100g", 1.2)],
    },
];
