use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{OnboardingProfile, OnboardingRow};

/// Source of onboarding profiles. `Ok(None)` means the user never onboarded.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    async fn get_user_onboarding_profile(
        &self,
        user_id: Uuid,
    ) -> anyhow::Result<Option<OnboardingProfile>>;
}

#[derive(Clone)]
pub struct PgOnboardingStore {
    db: PgPool,
}

impl PgOnboardingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OnboardingStore for PgOnboardingStore {
    async fn get_user_onboarding_profile(
        &self,
        user_id: Uuid,
    ) -> anyhow::Result<Option<OnboardingProfile>> {
        let row = sqlx::query_as::<_, OnboardingRow>(
            r#"
            SELECT user_id, calories_target, protein_target_g, carbs_target_g, fat_target_g,
                   preferred_diets, disallowed_ingredients, allergies, health_conditions,
                   low_glycemic, body_type, sweetener_preference
            FROM user_onboarding
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("load onboarding profile for {}", user_id))?;
        Ok(row.map(OnboardingProfile::from))
    }
}
