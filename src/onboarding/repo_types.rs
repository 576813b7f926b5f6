use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw `user_onboarding` row.
#[derive(Debug, FromRow)]
pub struct OnboardingRow {
    pub user_id: Uuid,
    pub calories_target: Option<i32>,
    pub protein_target_g: Option<i32>,
    pub carbs_target_g: Option<i32>,
    pub fat_target_g: Option<i32>,
    pub preferred_diets: Vec<String>,
    pub disallowed_ingredients: Vec<String>,
    pub allergies: Vec<String>,
    pub health_conditions: Vec<String>,
    pub low_glycemic: bool,
    pub body_type: Option<String>,
    pub sweetener_preference: Option<String>,
}

/// Durable per-user nutrition and health record. Read-only for meal planning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingProfile {
    pub user_id: Uuid,
    pub calories_target: Option<i32>,
    pub protein_target_g: Option<i32>,
    pub carbs_target_g: Option<i32>,
    pub fat_target_g: Option<i32>,
    #[serde(default)]
    pub preferred_diets: Vec<String>,
    #[serde(default)]
    pub disallowed_ingredients: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub health_conditions: Vec<String>,
    #[serde(default)]
    pub low_glycemic: bool,
    pub body_type: Option<String>,
    pub sweetener_preference: Option<String>,
}

impl From<OnboardingRow> for OnboardingProfile {
    fn from(r: OnboardingRow) -> Self {
        Self {
            user_id: r.user_id,
            calories_target: r.calories_target,
            protein_target_g: r.protein_target_g,
            carbs_target_g: r.carbs_target_g,
            fat_target_g: r.fat_target_g,
            preferred_diets: r.preferred_diets,
            disallowed_ingredients: r.disallowed_ingredients,
            allergies: r.allergies,
            health_conditions: r.health_conditions,
            low_glycemic: r.low_glycemic,
            body_type: r.body_type,
            sweetener_preference: r.sweetener_preference,
        }
    }
}
