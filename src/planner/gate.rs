use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::badges::{compute_badges, MedicalBadge};
use super::constraints::{resolve_constraints, GeneratorOverrides, ResolvedConstraints};
use super::errors::GenerationError;
use super::meal::Meal;
use super::strings::normalize_name;
use crate::onboarding::OnboardingStore;

/// Anything that turns resolved constraints into candidate meals.
#[async_trait]
pub trait MealGenerator: Send + Sync {
    async fn generate(&self, constraints: &ResolvedConstraints) -> anyhow::Result<Vec<Meal>>;
}

/// Registers a plain async closure as a generator.
#[cfg(test)]
pub struct FnGenerator<F>(pub F);

#[cfg(test)]
#[async_trait]
impl<F, Fut> MealGenerator for FnGenerator<F>
where
    F: Fn(ResolvedConstraints) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = anyhow::Result<Vec<Meal>>> + Send + 'static,
{
    async fn generate(&self, constraints: &ResolvedConstraints) -> anyhow::Result<Vec<Meal>> {
        (self.0)(constraints.clone()).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GatedMeals {
    pub constraints: ResolvedConstraints,
    pub meals: Vec<Meal>,
}

/// The only sanctioned way to run a generator.
///
/// Resolves constraints, runs `generator`, stamps badges on every meal and
/// rejects the whole batch if any ingredient matches an excluded name.
#[instrument(skip(store, overrides, generator))]
pub async fn generate_with_constraints<G>(
    store: &dyn OnboardingStore,
    user_id: Uuid,
    overrides: Option<&GeneratorOverrides>,
    generator: &G,
) -> Result<GatedMeals, GenerationError>
where
    G: MealGenerator + ?Sized,
{
    let constraints = resolve_constraints(store, user_id, overrides).await?;

    let mut meals = generator
        .generate(&constraints)
        .await
        .map_err(|source| GenerationError::GeneratorFailure { user_id, source })?;

    for meal in &mut meals {
        meal.badges = compute_badges(&constraints, &meal.ingredient_names());
        debug!(
            meal = %meal.title,
            badges = ?meal.badges.iter().map(MedicalBadge::as_str).collect::<Vec<_>>(),
            "badges computed"
        );
    }

    check_compliance(&constraints, &meals)?;

    info!(user_id = %user_id, meals = meals.len(), diet = %constraints.diet, "meals generated");
    Ok(GatedMeals { constraints, meals })
}

/// Fails on the first ingredient, across all meals, that matches an exclude term.
pub fn check_compliance(
    constraints: &ResolvedConstraints,
    meals: &[Meal],
) -> Result<(), GenerationError> {
    for meal in meals {
        for ingredient in &meal.ingredients {
            if let Some(excluded) = find_excluded(&ingredient.name, &constraints.exclude) {
                error!(
                    user_id = %constraints.user_id,
                    ingredient = %ingredient.name,
                    excluded = %excluded,
                    meal = %meal.title,
                    "compliance breach"
                );
                return Err(GenerationError::ComplianceBreach {
                    user_id: constraints.user_id,
                    ingredient: ingredient.name.clone(),
                    excluded: excluded.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Returns the exclude term `ingredient` violates, if any.
pub fn find_excluded<'a>(ingredient: &str, exclude: &'a [String]) -> Option<&'a str> {
    let name = normalize_name(ingredient);
    if name.is_empty() {
        return None;
    }
    let words = split_words(&name);
    exclude
        .iter()
        .map(String::as_str)
        .find(|term| *term == name || contains_term(&words, term))
}

fn split_words(s: &str) -> Vec<&str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

// Whole-word run match; the last words match when either is a plural of the other.
fn contains_term(words: &[&str], term: &str) -> bool {
    let needle = split_words(term);
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    let last = needle.len() - 1;
    words.windows(needle.len()).any(|window| {
        window.iter().zip(&needle).enumerate().all(|(i, (w, n))| {
            w == n || (i == last && (is_plural_of(w, n) || is_plural_of(n, w)))
        })
    })
}

fn is_plural_of(plural: &str, singular: &str) -> bool {
    plural.strip_suffix('s') == Some(singular) || plural.strip_suffix("es") == Some(singular)
}
