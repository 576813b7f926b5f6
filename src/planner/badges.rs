use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::constraints::ResolvedConstraints;

/// Closed badge vocabulary shown to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicalBadge {
    GlutenFree,
    DairyFree,
    LowGlycemic,
    ShellfishFree,
    PeanutFree,
    NutFree,
    SoyFree,
    Type1Safe,
    Type2Safe,
}

impl MedicalBadge {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GlutenFree => "gluten_free",
            Self::DairyFree => "dairy_free",
            Self::LowGlycemic => "low_glycemic",
            Self::ShellfishFree => "shellfish_free",
            Self::PeanutFree => "peanut_free",
            Self::NutFree => "nut_free",
            Self::SoyFree => "soy_free",
            Self::Type1Safe => "type1_safe",
            Self::Type2Safe => "type2_safe",
        }
    }
}

// Curated lists. A keyword hit anywhere in an ingredient name withholds the badge.
const GLUTEN_KEYWORDS: &[&str] = &[
    "wheat", "flour", "bread", "pasta", "barley", "rye", "couscous", "semolina", "spelt",
    "bulgur", "seitan", "farro", "malt", "cracker", "noodle", "panko", "orzo", "udon", "beer",
    "soy sauce", "gluten",
];
const DAIRY_KEYWORDS: &[&str] = &[
    "milk", "cheese", "butter", "cream", "yogurt", "yoghurt", "whey", "casein", "ghee", "kefir",
    "paneer", "ricotta", "mozzarella", "parmesan", "lactose", "custard",
];
const SHELLFISH_KEYWORDS: &[&str] = &[
    "shellfish", "shrimp", "prawn", "crab", "lobster", "crayfish", "crawfish", "scallop", "clam",
    "mussel", "oyster", "langoustine",
];
const PEANUT_KEYWORDS: &[&str] = &["peanut", "groundnut", "arachis", "monkey nut"];
const NUT_KEYWORDS: &[&str] = &[
    "almond", "walnut", "cashew", "pecan", "pistachio", "hazelnut", "macadamia", "brazil nut",
    "pine nut", "nuts", "nut butter", "praline", "marzipan", "nutella",
];
const SOY_KEYWORDS: &[&str] = &[
    "soy", "soya", "tofu", "tempeh", "edamame", "miso", "tamari", "natto", "shoyu",
];

const ALLERGEN_FAMILIES: &[(MedicalBadge, &[&str])] = &[
    (MedicalBadge::GlutenFree, GLUTEN_KEYWORDS),
    (MedicalBadge::DairyFree, DAIRY_KEYWORDS),
    (MedicalBadge::ShellfishFree, SHELLFISH_KEYWORDS),
    (MedicalBadge::PeanutFree, PEANUT_KEYWORDS),
    (MedicalBadge::NutFree, NUT_KEYWORDS),
    (MedicalBadge::SoyFree, SOY_KEYWORDS),
];

const TYPE1_CONDITIONS: &[&str] = &["type1_diabetes", "type_1_diabetes", "diabetes_type1", "t1d"];
const TYPE2_CONDITIONS: &[&str] = &["type2_diabetes", "type_2_diabetes", "diabetes_type2", "t2d"];

/// Badges for one meal, from its flat ingredient names and the active constraints.
///
/// Allergen-absence badges are granted only when no keyword of the family
/// occurs in any lowercased ingredient name. Condition badges mirror the
/// constraints the meal was generated against.
pub fn compute_badges<S: AsRef<str>>(
    constraints: &ResolvedConstraints,
    ingredient_names: &[S],
) -> Vec<MedicalBadge> {
    let names: Vec<String> = ingredient_names
        .iter()
        .map(|n| n.as_ref().to_lowercase())
        .collect();

    let mut badges = BTreeSet::new();
    for (badge, keywords) in ALLERGEN_FAMILIES.iter() {
        let hit = names
            .iter()
            .any(|name| keywords.iter().any(|kw| name.contains(kw)));
        if !hit {
            badges.insert(*badge);
        }
    }

    if constraints.low_glycemic {
        badges.insert(MedicalBadge::LowGlycemic);
    }
    if TYPE1_CONDITIONS.iter().any(|c| constraints.has_condition(c)) {
        badges.insert(MedicalBadge::Type1Safe);
    }
    if TYPE2_CONDITIONS.iter().any(|c| constraints.has_condition(c)) {
        badges.insert(MedicalBadge::Type2Safe);
    }

    badges.into_iter().collect()
}
